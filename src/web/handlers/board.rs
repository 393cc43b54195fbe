//! Board and membership handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::access::{check_access, check_ownership};
use crate::model::{BoardMember, BoardUpdate, MemberRole, NewBoard};
use crate::web::dto::{
    AddMemberRequest, BoardDetail, BoardDetailResponse, BoardResponse, BoardsResponse,
    CreateBoardRequest, ListWithCards, MemberResponse, MessageResponse, StarRequest,
    UpdateBoardRequest, UpdateMemberRoleRequest,
};
use crate::web::error::ApiError;
use crate::web::middleware::AuthUser;

use super::{body_id, path_id, SharedState};

/// GET /api/boards - All boards the user owns or belongs to.
pub async fn get_boards(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
) -> Result<Json<BoardsResponse>, ApiError> {
    let boards = state.stores.boards.find_by_user(&current.id).await?;
    Ok(Json(BoardsResponse { boards }))
}

/// POST /api/boards - Create a board owned by the caller.
pub async fn create_board(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Json(req): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("Board title is required"));
    }

    let board = state
        .stores
        .boards
        .create(&NewBoard {
            title: req.title,
            description: req.description,
            owner_id: current.id,
            background: req.background,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            message: "Board created successfully".to_string(),
            board,
        }),
    ))
}

/// GET /api/boards/:id - The board with its lists, cards, and members.
pub async fn get_board(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<BoardDetailResponse>, ApiError> {
    let board_id = path_id(&state, &id)?;
    let board = check_access(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let mut lists = Vec::new();
    for list in state.stores.lists.find_by_board(&board_id).await? {
        let cards = state.stores.cards.find_by_list(&list.id).await?;
        lists.push(ListWithCards { list, cards });
    }
    let members = state.stores.boards.members(&board_id).await?;

    Ok(Json(BoardDetailResponse {
        board: BoardDetail {
            board,
            lists,
            members,
        },
    }))
}

/// PUT /api/boards/:id - Full-update a board.
pub async fn update_board(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateBoardRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    if req.title.is_empty() {
        return Err(ApiError::bad_request("Board title is required"));
    }

    let board_id = path_id(&state, &id)?;
    let existing = check_access(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let update = BoardUpdate {
        title: req.title,
        description: req.description,
        background: req.background.unwrap_or(existing.background),
        is_starred: req.is_starred,
    };
    let board = state
        .stores
        .boards
        .update(&board_id, &update)
        .await?
        .ok_or_else(|| ApiError::not_found("Board not found"))?;

    Ok(Json(BoardResponse {
        message: "Board updated successfully".to_string(),
        board,
    }))
}

/// DELETE /api/boards/:id - Delete a board (owner only).
pub async fn delete_board(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let board_id = path_id(&state, &id)?;
    check_ownership(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    if !state.stores.boards.delete(&board_id).await? {
        return Err(ApiError::not_found("Board not found"));
    }
    Ok(Json(MessageResponse {
        message: "Board deleted successfully".to_string(),
    }))
}

/// PATCH /api/boards/:id/star - Set the starred flag.
pub async fn star_board(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<StarRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let board_id = path_id(&state, &id)?;
    check_access(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    if !state.stores.boards.set_starred(&board_id, req.is_starred).await? {
        return Err(ApiError::not_found("Board not found"));
    }
    Ok(Json(MessageResponse {
        message: format!(
            "Board {} successfully",
            if req.is_starred { "starred" } else { "unstarred" }
        ),
    }))
}

/// POST /api/boards/:id/members - Add a member (owner only).
pub async fn add_member(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let board_id = path_id(&state, &id)?;
    let board = check_ownership(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let user_id = body_id(&state, &req.user_id)?;
    let user = state
        .stores
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    // The owner is never representable as a member.
    if user_id == board.owner_id {
        return Err(ApiError::bad_request(
            "The board owner cannot be added as a member",
        ));
    }

    let role: MemberRole = match &req.role {
        Some(raw) => raw.parse().map_err(|_| {
            ApiError::bad_request("Valid role is required (admin, member, or viewer)")
        })?,
        None => MemberRole::default(),
    };

    state
        .stores
        .boards
        .add_member(&board_id, &user_id, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MemberResponse {
            message: "Member added successfully".to_string(),
            member: BoardMember {
                user_id,
                username: user.username,
                email: user.email,
                role,
            },
        }),
    ))
}

/// PUT /api/boards/:board_id/members/:user_id - Change a member's role.
pub async fn update_member_role(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path((board_id, user_id)): Path<(String, String)>,
    Json(req): Json<UpdateMemberRoleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let board_id = path_id(&state, &board_id)?;
    check_ownership(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let role: MemberRole = req.role.parse().map_err(|_| {
        ApiError::bad_request("Valid role is required (admin, member, or viewer)")
    })?;
    let user_id = path_id(&state, &user_id)?;

    if !state
        .stores
        .boards
        .update_member_role(&board_id, &user_id, role)
        .await?
    {
        return Err(ApiError::not_found("Member not found on this board"));
    }
    Ok(Json(MessageResponse {
        message: "Member role updated successfully".to_string(),
    }))
}

/// DELETE /api/boards/:board_id/members/:user_id - Remove a member.
pub async fn remove_member(
    State(state): State<SharedState>,
    AuthUser(current): AuthUser,
    Path((board_id, user_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let board_id = path_id(&state, &board_id)?;
    check_ownership(state.stores.boards.as_ref(), &board_id, &current.id).await?;

    let user_id = path_id(&state, &user_id)?;
    if !state
        .stores
        .boards
        .remove_member(&board_id, &user_id)
        .await?
    {
        return Err(ApiError::not_found("Member not found on this board"));
    }
    Ok(Json(MessageResponse {
        message: "Member removed successfully".to_string(),
    }))
}
