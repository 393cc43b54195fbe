//! List handlers.
//!
//! List routes addressed by list id resolve the parent board through the
//! list before the access check; board-scoped routes check the board
//! directly.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::access::check_access;
use crate::model::{List, NewList};
use crate::web::dto::{
    CreateListRequest, ListResponse, ListWithCards, ListsResponse, MessageResponse, MoveRequest,
    UpdateListRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::{AuthUser, CurrentUser};

use super::{path_id, SharedState};

async fn accessible_list(
    state: &SharedState,
    current: &CurrentUser,
    raw_id: &str,
) -> Result<List, ApiError> {
    let list_id = path_id(state, raw_id)?;
    let list = state
        .stores
        .lists
        .find_by_id(&list_id)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;
    check_access(state.stores.boards.as_ref(), &list.board_id, &current.id).await?;
    Ok(list)
}

/// GET /api/lists/board/:board_id - Lists of a board, each with its cards.
pub async fn get_board_lists(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(board_id): Path<String>,
) -> Result<Json<ListsResponse>, ApiError> {
    let board_id = path_id(&state, &board_id)?;
    check_access(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let mut lists = Vec::new();
    for list in state.stores.lists.find_by_board(&board_id).await? {
        let cards = state.stores.cards.find_by_list(&list.id).await?;
        lists.push(ListWithCards { list, cards });
    }
    Ok(Json(ListsResponse { lists }))
}

/// POST /api/lists/board/:board_id - Create a list at the end of a board.
pub async fn create_list(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(board_id): Path<String>,
    Json(req): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ListResponse>), ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("List title is required"));
    }

    let board_id = path_id(&state, &board_id)?;
    check_access(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let list = state
        .stores
        .lists
        .create(&NewList {
            title: req.title,
            board_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ListResponse {
            message: "List created successfully".to_string(),
            list,
        }),
    ))
}

/// PUT /api/lists/:id - Rename a list.
pub async fn update_list(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateListRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("List title is required"));
    }

    let list = accessible_list(&state, &current, &id).await?;
    let list = state
        .stores
        .lists
        .rename(&list.id, &req.title)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    Ok(Json(ListResponse {
        message: "List updated successfully".to_string(),
        list,
    }))
}

/// DELETE /api/lists/:id - Delete a list and re-pack its siblings.
pub async fn delete_list(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let list = accessible_list(&state, &current, &id).await?;
    if !state.stores.lists.delete(&list.id).await? {
        return Err(ApiError::not_found("List not found"));
    }
    Ok(Json(MessageResponse {
        message: "List deleted successfully".to_string(),
    }))
}

/// PATCH /api/lists/:id/move - Move a list within its board.
pub async fn move_list(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<ListResponse>, ApiError> {
    if req.position < 0 {
        return Err(ApiError::bad_request("Valid position is required"));
    }

    let list = accessible_list(&state, &current, &id).await?;
    let list = state
        .stores
        .lists
        .move_list(&list.id, req.position)
        .await?
        .ok_or_else(|| ApiError::not_found("List not found"))?;

    Ok(Json(ListResponse {
        message: "List moved successfully".to_string(),
        list,
    }))
}
