//! Relational board store.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{int_id, Database};
use crate::model::{Board, BoardMember, BoardUpdate, MemberRole, NewBoard, DEFAULT_BACKGROUND};
use crate::store::BoardStore;
use crate::{Id, MmlloError, Result};

/// Board store backed by the relational database.
pub struct RelationalBoardStore {
    pool: SqlitePool,
}

impl RelationalBoardStore {
    /// Create a store over the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct BoardRow {
    id: i64,
    title: String,
    description: Option<String>,
    owner_id: i64,
    background: String,
    is_starred: bool,
    created_at: String,
    updated_at: String,
}

impl From<BoardRow> for Board {
    fn from(row: BoardRow) -> Self {
        Board {
            id: Id::Int(row.id),
            title: row.title,
            description: row.description,
            owner_id: Id::Int(row.owner_id),
            background: row.background,
            is_starred: row.is_starred,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    user_id: i64,
    username: String,
    email: String,
    role: String,
}

impl TryFrom<MemberRow> for BoardMember {
    type Error = MmlloError;

    fn try_from(row: MemberRow) -> Result<Self> {
        let role = MemberRole::from_str(&row.role)
            .map_err(|e| MmlloError::Database(e))?;
        Ok(BoardMember {
            user_id: Id::Int(row.user_id),
            username: row.username,
            email: row.email,
            role,
        })
    }
}

const BOARD_COLUMNS: &str =
    "id, title, description, owner_id, background, is_starred, created_at, updated_at";

#[async_trait]
impl BoardStore for RelationalBoardStore {
    async fn create(&self, new: &NewBoard) -> Result<Board> {
        let owner_id = int_id(&new.owner_id)?;
        let background = new.background.as_deref().unwrap_or(DEFAULT_BACKGROUND);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO boards (title, description, owner_id, background)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(owner_id)
        .bind(background)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(&Id::Int(id))
            .await?
            .ok_or_else(|| MmlloError::NotFound("board".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Board>> {
        let id = int_id(id)?;
        let row: Option<BoardRow> =
            sqlx::query_as(&format!("SELECT {BOARD_COLUMNS} FROM boards WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Board::from))
    }

    async fn find_by_user(&self, user_id: &Id) -> Result<Vec<Board>> {
        let user_id = int_id(user_id)?;
        let rows: Vec<BoardRow> = sqlx::query_as(&format!(
            "SELECT {BOARD_COLUMNS} FROM boards b
             WHERE b.owner_id = ?
                OR EXISTS (SELECT 1 FROM board_members bm
                           WHERE bm.board_id = b.id AND bm.user_id = ?)
             ORDER BY b.is_starred DESC, b.created_at DESC, b.id DESC"
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Board::from).collect())
    }

    async fn update(&self, id: &Id, update: &BoardUpdate) -> Result<Option<Board>> {
        let board_id = int_id(id)?;
        let result = sqlx::query(
            "UPDATE boards SET title = ?, description = ?, background = ?, is_starred = ?,
                    updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.background)
        .bind(update.is_starred)
        .bind(board_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let id = int_id(id)?;
        // Lists, cards, comments, and memberships go with the board via
        // ON DELETE CASCADE foreign keys.
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_starred(&self, id: &Id, starred: bool) -> Result<bool> {
        let id = int_id(id)?;
        let result = sqlx::query(
            "UPDATE boards SET is_starred = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(starred)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn members(&self, board_id: &Id) -> Result<Vec<BoardMember>> {
        let board_id = int_id(board_id)?;
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT u.id AS user_id, u.username, u.email, bm.role
             FROM users u
             JOIN board_members bm ON u.id = bm.user_id
             WHERE bm.board_id = ?
             ORDER BY bm.created_at ASC, bm.id ASC",
        )
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BoardMember::try_from).collect()
    }

    async fn is_member(&self, board_id: &Id, user_id: &Id) -> Result<bool> {
        let board_id = int_id(board_id)?;
        let user_id = int_id(user_id)?;
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM board_members WHERE board_id = ? AND user_id = ?)",
        )
        .bind(board_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn add_member(&self, board_id: &Id, user_id: &Id, role: MemberRole) -> Result<()> {
        let board_id = int_id(board_id)?;
        let user_id = int_id(user_id)?;
        sqlx::query("INSERT INTO board_members (board_id, user_id, role) VALUES (?, ?, ?)")
            .bind(board_id)
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    MmlloError::Conflict("user is already a member of this board".to_string())
                }
                _ => MmlloError::Database(e.to_string()),
            })?;
        Ok(())
    }

    async fn update_member_role(
        &self,
        board_id: &Id,
        user_id: &Id,
        role: MemberRole,
    ) -> Result<bool> {
        let board_id = int_id(board_id)?;
        let user_id = int_id(user_id)?;
        let result =
            sqlx::query("UPDATE board_members SET role = ? WHERE board_id = ? AND user_id = ?")
                .bind(role.as_str())
                .bind(board_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, board_id: &Id, user_id: &Id) -> Result<bool> {
        let board_id = int_id(board_id)?;
        let user_id = int_id(user_id)?;
        let result = sqlx::query("DELETE FROM board_members WHERE board_id = ? AND user_id = ?")
            .bind(board_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
