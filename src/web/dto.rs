//! Data Transfer Objects for the Web API.

use serde::{Deserialize, Serialize};

use crate::model::{Board, BoardMember, Card, Comment, List, User};
use crate::Id;

// ============================================================================
// Requests
// ============================================================================

/// User registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plain-text password.
    pub password: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

/// Board creation request.
#[derive(Debug, Deserialize)]
pub struct CreateBoardRequest {
    /// Board title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional background color.
    #[serde(default)]
    pub background: Option<String>,
}

/// Board full-update request.
#[derive(Debug, Deserialize)]
pub struct UpdateBoardRequest {
    /// New title.
    pub title: String,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New background color.
    #[serde(default)]
    pub background: Option<String>,
    /// New starred flag.
    #[serde(default)]
    pub is_starred: bool,
}

/// Star toggle request.
#[derive(Debug, Deserialize)]
pub struct StarRequest {
    /// Desired starred state.
    pub is_starred: bool,
}

/// Add-member request.
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Id,
    /// Role to grant; defaults to member.
    #[serde(default)]
    pub role: Option<String>,
}

/// Member role change request.
#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    /// New role.
    pub role: String,
}

/// List creation request.
#[derive(Debug, Deserialize)]
pub struct CreateListRequest {
    /// List title.
    pub title: String,
}

/// List rename request.
#[derive(Debug, Deserialize)]
pub struct UpdateListRequest {
    /// New title.
    pub title: String,
}

/// Position-only move request.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Target position.
    pub position: i64,
}

/// Cross-list card move request.
#[derive(Debug, Deserialize)]
pub struct MoveToListRequest {
    /// Target list.
    pub list_id: Id,
    /// Target position within that list.
    pub position: i64,
}

/// Card creation request.
#[derive(Debug, Deserialize)]
pub struct CreateCardRequest {
    /// Card title.
    pub title: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// Label identifiers.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Card full-update request.
#[derive(Debug, Deserialize)]
pub struct UpdateCardRequest {
    /// New title.
    pub title: String,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New due date.
    #[serde(default)]
    pub due_date: Option<String>,
    /// New label identifiers.
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Comment creation request.
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    /// Comment text.
    pub content: String,
}

// ============================================================================
// Responses
// ============================================================================

/// User information in responses. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User id.
    pub id: Id,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Last update timestamp.
    pub updated_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration/login response: the token plus the user it identifies.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Status message.
    pub message: String,
    /// The authenticated user.
    pub user: UserInfo,
    /// Signed JWT, also set as an HTTP-only cookie.
    pub token: String,
}

/// Bare status message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Status message.
    pub message: String,
}

/// Current-user response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// The authenticated user.
    pub user: UserInfo,
}

/// Board collection response.
#[derive(Debug, Serialize)]
pub struct BoardsResponse {
    /// Boards, starred first, newest first.
    pub boards: Vec<Board>,
}

/// Single-board mutation response.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    /// Status message.
    pub message: String,
    /// The affected board.
    pub board: Board,
}

/// A list with its cards, as embedded in board and list payloads.
#[derive(Debug, Serialize)]
pub struct ListWithCards {
    /// The list itself.
    #[serde(flatten)]
    pub list: List,
    /// Its cards, position ascending.
    pub cards: Vec<Card>,
}

/// Aggregate board payload: the board with its lists-with-cards and members.
#[derive(Debug, Serialize)]
pub struct BoardDetail {
    /// The board itself.
    #[serde(flatten)]
    pub board: Board,
    /// Lists, position ascending, each with its cards.
    pub lists: Vec<ListWithCards>,
    /// Board members with resolved identities.
    pub members: Vec<BoardMember>,
}

/// Aggregate board response.
#[derive(Debug, Serialize)]
pub struct BoardDetailResponse {
    /// The board with embedded lists and members.
    pub board: BoardDetail,
}

/// Member addition response.
#[derive(Debug, Serialize)]
pub struct MemberResponse {
    /// Status message.
    pub message: String,
    /// The added member.
    pub member: BoardMember,
}

/// Lists-of-board response.
#[derive(Debug, Serialize)]
pub struct ListsResponse {
    /// Lists, position ascending, each with its cards.
    pub lists: Vec<ListWithCards>,
}

/// Single-list mutation response.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    /// Status message.
    pub message: String,
    /// The affected list.
    pub list: List,
}

/// A card with its comments.
#[derive(Debug, Serialize)]
pub struct CardWithComments {
    /// The card itself.
    #[serde(flatten)]
    pub card: Card,
    /// Comments, oldest first.
    pub comments: Vec<Comment>,
}

/// Single-card fetch response.
#[derive(Debug, Serialize)]
pub struct CardDetailResponse {
    /// The card with its comments.
    pub card: CardWithComments,
}

/// Single-card mutation response.
#[derive(Debug, Serialize)]
pub struct CardResponse {
    /// Status message.
    pub message: String,
    /// The affected card.
    pub card: Card,
}

/// Comment addition response.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Status message.
    pub message: String,
    /// The created comment.
    pub comment: Comment,
}
