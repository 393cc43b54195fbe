//! Board access control.
//!
//! Two levels: access (owner or member) gates reads and content edits,
//! ownership gates board deletion and membership management. Both return the
//! board so callers avoid a second lookup.

use crate::model::Board;
use crate::store::BoardStore;
use crate::{Id, MmlloError, Result};

/// Require that the user owns the board or is a member of it.
///
/// NotFound when the board is absent, AccessDenied otherwise.
pub async fn check_access(
    boards: &dyn BoardStore,
    board_id: &Id,
    user_id: &Id,
) -> Result<Board> {
    let board = boards
        .find_by_id(board_id)
        .await?
        .ok_or_else(|| MmlloError::NotFound("board".to_string()))?;

    if &board.owner_id == user_id || boards.is_member(board_id, user_id).await? {
        Ok(board)
    } else {
        Err(MmlloError::AccessDenied(
            "not a member of this board".to_string(),
        ))
    }
}

/// Require that the user owns the board.
pub async fn check_ownership(
    boards: &dyn BoardStore,
    board_id: &Id,
    user_id: &Id,
) -> Result<Board> {
    let board = boards
        .find_by_id(board_id)
        .await?
        .ok_or_else(|| MmlloError::NotFound("board".to_string()))?;

    if &board.owner_id == user_id {
        Ok(board)
    } else {
        Err(MmlloError::AccessDenied(
            "only the board owner may do this".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::model::{MemberRole, NewBoard, NewUser};
    use crate::store::{relational_stores, Stores};

    async fn setup() -> (Stores, Id, Id, Id) {
        let db = Database::open_in_memory().await.unwrap();
        let stores = relational_stores(&db);
        // The Database is dropped here but the pool inside the stores keeps
        // the in-memory database alive.
        let owner = stores
            .users
            .create(&NewUser {
                username: "owner".to_string(),
                email: "owner@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .unwrap();
        let member = stores
            .users
            .create(&NewUser {
                username: "member".to_string(),
                email: "member@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .unwrap();
        let stranger = stores
            .users
            .create(&NewUser {
                username: "stranger".to_string(),
                email: "stranger@example.com".to_string(),
                password: "hash".to_string(),
            })
            .await
            .unwrap();
        let board = stores
            .boards
            .create(&NewBoard {
                title: "Board".to_string(),
                description: None,
                owner_id: owner.id.clone(),
                background: None,
            })
            .await
            .unwrap();
        stores
            .boards
            .add_member(&board.id, &member.id, MemberRole::Member)
            .await
            .unwrap();
        (stores, board.id, owner.id, member.id.clone())
    }

    #[tokio::test]
    async fn test_owner_and_member_have_access() {
        let (stores, board_id, owner_id, member_id) = setup().await;
        assert!(check_access(stores.boards.as_ref(), &board_id, &owner_id)
            .await
            .is_ok());
        assert!(check_access(stores.boards.as_ref(), &board_id, &member_id)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_stranger_is_denied() {
        let (stores, board_id, _, _) = setup().await;
        let stranger = stores
            .users
            .find_by_username("stranger")
            .await
            .unwrap()
            .unwrap();
        let err = check_access(stores.boards.as_ref(), &board_id, &stranger.id)
            .await
            .unwrap_err();
        assert!(matches!(err, MmlloError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_member_is_not_owner() {
        let (stores, board_id, owner_id, member_id) = setup().await;
        assert!(
            check_ownership(stores.boards.as_ref(), &board_id, &owner_id)
                .await
                .is_ok()
        );
        let err = check_ownership(stores.boards.as_ref(), &board_id, &member_id)
            .await
            .unwrap_err();
        assert!(matches!(err, MmlloError::AccessDenied(_)));
    }

    #[tokio::test]
    async fn test_missing_board_is_not_found() {
        let (stores, _, owner_id, _) = setup().await;
        let err = check_access(stores.boards.as_ref(), &Id::Int(9999), &owner_id)
            .await
            .unwrap_err();
        assert!(matches!(err, MmlloError::NotFound(_)));
    }
}
