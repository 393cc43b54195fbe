//! Card and comment models.

use serde::{Deserialize, Serialize};

use crate::Id;

/// A card within a list.
///
/// `position` is dense and zero-based among the cards of the same list.
/// Labels are a typed list; the relational backend serializes them to JSON
/// text at the row boundary, never exposing raw text to business logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    /// Unique card id.
    pub id: Id,
    /// Card title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owning list's id.
    pub list_id: Id,
    /// Zero-based position within the list.
    pub position: i64,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Label identifiers.
    #[serde(default)]
    pub labels: Vec<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// Data for creating a new card. The position is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewCard {
    /// Card title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owning list's id.
    pub list_id: Id,
    /// Optional due date.
    pub due_date: Option<String>,
    /// Label identifiers.
    pub labels: Vec<String>,
}

/// Full-update data for a card (PUT semantics). Position and list are
/// changed only through move operations.
#[derive(Debug, Clone)]
pub struct CardUpdate {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
    /// New due date.
    pub due_date: Option<String>,
    /// New label identifiers.
    pub labels: Vec<String>,
}

/// A comment on a card. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique comment id.
    pub id: Id,
    /// The commented card's id.
    pub card_id: Id,
    /// Author's user id.
    pub user_id: Id,
    /// Author's username at comment time.
    pub username: String,
    /// Comment text.
    pub content: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
}
