//! Card and comment handlers.
//!
//! Every card route resolves the parent chain (card -> list -> board) and
//! checks board access before acting.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::access::check_access;
use crate::model::{Card, CardUpdate, NewCard};
use crate::web::dto::{
    AddCommentRequest, CardDetailResponse, CardResponse, CardWithComments, CommentResponse,
    CreateCardRequest, MessageResponse, MoveRequest, MoveToListRequest, UpdateCardRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, CurrentUser};

use super::{body_id, path_id, SharedState};

async fn accessible_card(
    state: &SharedState,
    current: &CurrentUser,
    raw_id: &str,
) -> Result<Card, ApiError> {
    let card_id = path_id(state, raw_id)?;
    let card = state
        .stores
        .cards
        .find_by_id(&card_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;
    let list = state
        .stores
        .lists
        .find_by_id(&card.list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;
    check_access(state.stores.boards.as_ref(), &list.board_id, &current.id).await?;
    Ok(card)
}

/// GET /api/cards/:id - The card with its comments.
pub async fn get_card(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<CardDetailResponse>, ApiError> {
    let card = accessible_card(&state, &current, &id).await?;
    let comments = state.stores.cards.comments(&card.id).await?;
    Ok(Json(CardDetailResponse {
        card: CardWithComments { card, comments },
    }))
}

/// POST /api/cards/list/:list_id - Create a card at the end of a list.
pub async fn create_card(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(list_id): Path<String>,
    Json(req): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("Card title is required"));
    }

    let list_id = path_id(&state, &list_id)?;
    let list = state
        .stores
        .lists
        .find_by_id(&list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;
    check_access(state.stores.boards.as_ref(), &list.board_id, &current.id).await?;

    let card = state
        .stores
        .cards
        .create(&NewCard {
            title: req.title,
            description: req.description,
            list_id,
            due_date: req.due_date,
            labels: req.labels,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CardResponse {
            message: "Card created successfully".to_string(),
            card,
        }),
    ))
}

/// PUT /api/cards/:id - Full-update a card.
pub async fn update_card(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCardRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("Card title is required"));
    }

    let card = accessible_card(&state, &current, &id).await?;
    let update = CardUpdate {
        title: req.title,
        description: req.description,
        due_date: req.due_date,
        labels: req.labels,
    };
    let card = state
        .stores
        .cards
        .update(&card.id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    Ok(Json(CardResponse {
        message: "Card updated successfully".to_string(),
        card,
    }))
}

/// DELETE /api/cards/:id - Delete a card and re-pack its siblings.
pub async fn delete_card(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let card = accessible_card(&state, &current, &id).await?;
    if !state.stores.cards.delete(&card.id).await? {
        return Err(ApiError::not_found("Card not found"));
    }
    Ok(Json(MessageResponse {
        message: "Card deleted successfully".to_string(),
    }))
}

/// PATCH /api/cards/:id/move - Move a card within its list.
pub async fn move_card(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    if req.position < 0 {
        return Err(ApiError::bad_request("Valid position is required"));
    }

    let card = accessible_card(&state, &current, &id).await?;
    let card = state
        .stores
        .cards
        .move_in_list(&card.id, req.position)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    Ok(Json(CardResponse {
        message: "Card moved successfully".to_string(),
        card,
    }))
}

/// PATCH /api/cards/:id/move-to-list - Move a card to another list.
pub async fn move_card_to_list(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<MoveToListRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    if req.position < 0 {
        return Err(ApiError::bad_request("Valid position is required"));
    }

    let card = accessible_card(&state, &current, &id).await?;

    // The target list's board must be accessible too; moves between boards
    // the user belongs to are allowed.
    let target_list_id = body_id(&state, &req.list_id)?;
    let target_list = state
        .stores
        .lists
        .find_by_id(&target_list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;
    check_access(
        state.stores.boards.as_ref(),
        &target_list.board_id,
        &current.id,
    )
    .await?;

    let card = state
        .stores
        .cards
        .move_to_list(&card.id, &target_list_id, req.position)
        .await?
        .ok_or_else(|| ApiError::not_found("Card not found"))?;

    Ok(Json(CardResponse {
        message: "Card moved to another list successfully".to_string(),
        card,
    }))
}

/// POST /api/cards/:id/comments - Comment on a card.
pub async fn add_comment(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    if req.content.is_empty() {
        return Err(ApiError::bad_request("Comment content is required"));
    }

    let card = accessible_card(&state, &current, &id).await?;
    let comment = state
        .stores
        .cards
        .add_comment(&card.id, &current.id, &req.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            message: "Comment added successfully".to_string(),
            comment,
        }),
    ))
}
