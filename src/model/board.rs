//! Board and membership models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Id;

/// Default board background color.
pub const DEFAULT_BACKGROUND: &str = "#0079bf";

/// Role granted to a non-owner board member.
///
/// The owner is not representable as a member; ownership is a separate
/// relationship that membership operations never touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Can manage lists, cards, and members.
    Admin,
    /// Can edit lists and cards.
    #[default]
    Member,
    /// Read-only access.
    Viewer,
}

impl MemberRole {
    /// Convert role to its database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
            MemberRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(MemberRole::Admin),
            "member" => Ok(MemberRole::Member),
            "viewer" => Ok(MemberRole::Viewer),
            _ => Err(format!("unknown member role: {s}")),
        }
    }
}

/// Board entity. Owned by exactly one user; contains ordered lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Unique board id.
    pub id: Id,
    /// Board title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Owning user's id.
    pub owner_id: Id,
    /// Background color.
    pub background: String,
    /// Starred flag.
    pub is_starred: bool,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// Data for creating a new board.
#[derive(Debug, Clone)]
pub struct NewBoard {
    /// Board title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Owning user's id.
    pub owner_id: Id,
    /// Background color; `DEFAULT_BACKGROUND` when absent.
    pub background: Option<String>,
}

/// Full-update data for a board (PUT semantics).
#[derive(Debug, Clone)]
pub struct BoardUpdate {
    /// New title.
    pub title: String,
    /// New description.
    pub description: Option<String>,
    /// New background color.
    pub background: String,
    /// New starred flag.
    pub is_starred: bool,
}

/// A board membership with the member's resolved identity.
#[derive(Debug, Clone, Serialize)]
pub struct BoardMember {
    /// Member's user id.
    pub user_id: Id,
    /// Member's username.
    pub username: String,
    /// Member's email.
    pub email: String,
    /// Granted role.
    pub role: MemberRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_round_trip() {
        for role in [MemberRole::Admin, MemberRole::Member, MemberRole::Viewer] {
            assert_eq!(role.as_str().parse::<MemberRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_member_role_rejects_unknown() {
        assert!("owner".parse::<MemberRole>().is_err());
    }

    #[test]
    fn test_member_role_default() {
        assert_eq!(MemberRole::default(), MemberRole::Member);
    }
}
