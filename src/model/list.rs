//! List model.

use serde::{Deserialize, Serialize};

use crate::Id;

/// A list of cards within a board.
///
/// `position` is dense and zero-based among the lists of the same board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    /// Unique list id.
    pub id: Id,
    /// List title.
    pub title: String,
    /// Owning board's id.
    pub board_id: Id,
    /// Zero-based position within the board.
    pub position: i64,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// Data for creating a new list. The position is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewList {
    /// List title.
    pub title: String,
    /// Owning board's id.
    pub board_id: Id,
}
