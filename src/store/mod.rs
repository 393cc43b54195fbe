//! Entity store contracts and backend selection.
//!
//! Business logic talks to these traits only; the relational and document
//! backends each provide a complete set of implementations. `update` returns
//! `None` and `delete` returns `false` when the target row/document does not
//! exist (a change count of zero), so callers can distinguish "not found"
//! from success without branching on the backend.

mod select;

pub use select::{document_stores, relational_stores, select_stores, BackendSelection};

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::{
    Board, BoardMember, BoardUpdate, Card, CardUpdate, Comment, List, MemberRole, NewBoard,
    NewCard, NewList, NewUser, User,
};
use crate::{Id, IdKind, Result};

/// User CRUD and uniqueness probes.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user. The password in `new` is already hashed.
    async fn create(&self, new: &NewUser) -> Result<User>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &Id) -> Result<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Find a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Replace a user's password hash. Returns false if the user is absent.
    async fn update_password(&self, id: &Id, password_hash: &str) -> Result<bool>;
}

/// Board CRUD, membership, and permission probes.
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Create a board owned by `new.owner_id`.
    async fn create(&self, new: &NewBoard) -> Result<Board>;

    /// Find a board by id.
    async fn find_by_id(&self, id: &Id) -> Result<Option<Board>>;

    /// Boards the user owns or is a member of, starred first, newest first.
    async fn find_by_user(&self, user_id: &Id) -> Result<Vec<Board>>;

    /// Full-update a board. `None` when the board is absent.
    async fn update(&self, id: &Id, update: &BoardUpdate) -> Result<Option<Board>>;

    /// Delete a board, cascading to its lists, cards, comments, and
    /// memberships. Returns false when the board is absent.
    async fn delete(&self, id: &Id) -> Result<bool>;

    /// Set the starred flag. Returns false when the board is absent.
    async fn set_starred(&self, id: &Id, starred: bool) -> Result<bool>;

    /// All members of the board with their resolved identities.
    async fn members(&self, board_id: &Id) -> Result<Vec<BoardMember>>;

    /// Whether a membership row exists for (board, user).
    async fn is_member(&self, board_id: &Id, user_id: &Id) -> Result<bool>;

    /// Add a member. Duplicate (board, user) pairs yield a Conflict error.
    async fn add_member(&self, board_id: &Id, user_id: &Id, role: MemberRole) -> Result<()>;

    /// Change a member's role. Returns false when no membership row exists.
    /// The owner relationship is untouched by this operation.
    async fn update_member_role(
        &self,
        board_id: &Id,
        user_id: &Id,
        role: MemberRole,
    ) -> Result<bool>;

    /// Remove a member. Returns false when no membership row exists.
    /// The owner cannot be removed this way.
    async fn remove_member(&self, board_id: &Id, user_id: &Id) -> Result<bool>;
}

/// List CRUD and reordering.
///
/// `create` assigns the next dense position atomically with the insert;
/// `delete` re-packs surviving siblings in the same transaction; `move_list`
/// applies the full reindex update set transactionally.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Create a list at the end of its board.
    async fn create(&self, new: &NewList) -> Result<List>;

    /// Find a list by id.
    async fn find_by_id(&self, id: &Id) -> Result<Option<List>>;

    /// Lists of a board, position ascending.
    async fn find_by_board(&self, board_id: &Id) -> Result<Vec<List>>;

    /// Rename a list. `None` when the list is absent.
    async fn rename(&self, id: &Id, title: &str) -> Result<Option<List>>;

    /// Delete a list (cascading to its cards) and re-pack siblings.
    /// Returns false when the list is absent.
    async fn delete(&self, id: &Id) -> Result<bool>;

    /// Move a list to a new position within its board. `None` when absent.
    async fn move_list(&self, id: &Id, new_position: i64) -> Result<Option<List>>;
}

/// Card CRUD, reordering, cross-list moves, and comments.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Create a card at the end of its list.
    async fn create(&self, new: &NewCard) -> Result<Card>;

    /// Find a card by id.
    async fn find_by_id(&self, id: &Id) -> Result<Option<Card>>;

    /// Cards of a list, position ascending.
    async fn find_by_list(&self, list_id: &Id) -> Result<Vec<Card>>;

    /// Full-update a card. `None` when the card is absent.
    async fn update(&self, id: &Id, update: &CardUpdate) -> Result<Option<Card>>;

    /// Delete a card and re-pack siblings. Returns false when absent.
    async fn delete(&self, id: &Id) -> Result<bool>;

    /// Move a card within its list. `None` when the card is absent.
    async fn move_in_list(&self, id: &Id, new_position: i64) -> Result<Option<Card>>;

    /// Move a card to another list at the given position. `None` when the
    /// card is absent; NotFound error when the target list is absent.
    async fn move_to_list(&self, id: &Id, list_id: &Id, position: i64) -> Result<Option<Card>>;

    /// Add a comment authored by `user_id`. NotFound when the card is absent.
    async fn add_comment(&self, card_id: &Id, user_id: &Id, content: &str) -> Result<Comment>;

    /// Comments on a card, oldest first, with author usernames.
    async fn comments(&self, card_id: &Id) -> Result<Vec<Comment>>;
}

/// The active backend's stores plus its canonical identifier form.
#[derive(Clone)]
pub struct Stores {
    /// User store.
    pub users: Arc<dyn UserStore>,
    /// Board store.
    pub boards: Arc<dyn BoardStore>,
    /// List store.
    pub lists: Arc<dyn ListStore>,
    /// Card store.
    pub cards: Arc<dyn CardStore>,
    /// Canonical id form of this backend.
    pub id_kind: IdKind,
}
