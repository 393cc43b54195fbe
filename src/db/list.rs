//! Relational list store.
//!
//! Position-mutating operations (create, delete, move) run inside a single
//! transaction so sibling positions can never be observed or persisted in a
//! partially renumbered state.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{int_id, Database};
use crate::model::{List, NewList};
use crate::position;
use crate::store::ListStore;
use crate::{Id, MmlloError, Result};

/// List store backed by the relational database.
pub struct RelationalListStore {
    pool: SqlitePool,
}

impl RelationalListStore {
    /// Create a store over the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListRow {
    id: i64,
    title: String,
    board_id: i64,
    position: i64,
    created_at: String,
    updated_at: String,
}

impl From<ListRow> for List {
    fn from(row: ListRow) -> Self {
        List {
            id: Id::Int(row.id),
            title: row.title,
            board_id: Id::Int(row.board_id),
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const LIST_COLUMNS: &str = "id, title, board_id, position, created_at, updated_at";

/// Sibling (id, position) pairs for a board, position ascending.
async fn sibling_positions(
    tx: &mut Transaction<'_, Sqlite>,
    board_id: i64,
) -> Result<Vec<(Id, i64)>> {
    let rows: Vec<(i64, i64)> =
        sqlx::query_as("SELECT id, position FROM lists WHERE board_id = ? ORDER BY position ASC")
            .bind(board_id)
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(id, pos)| (Id::Int(id), pos)).collect())
}

async fn apply_updates(
    tx: &mut Transaction<'_, Sqlite>,
    updates: &[position::PositionUpdate],
) -> Result<()> {
    for update in updates {
        sqlx::query("UPDATE lists SET position = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(update.position)
            .bind(int_id(&update.id)?)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl ListStore for RelationalListStore {
    async fn create(&self, new: &NewList) -> Result<List> {
        let board_id = int_id(&new.board_id)?;

        let mut tx = self.pool.begin().await?;
        let siblings = sibling_positions(&mut tx, board_id).await?;
        let position = position::next_position(&siblings);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO lists (title, board_id, position) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&new.title)
        .bind(board_id)
        .bind(position)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        self.find_by_id(&Id::Int(id))
            .await?
            .ok_or_else(|| MmlloError::NotFound("list".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<List>> {
        let id = int_id(id)?;
        let row: Option<ListRow> =
            sqlx::query_as(&format!("SELECT {LIST_COLUMNS} FROM lists WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(List::from))
    }

    async fn find_by_board(&self, board_id: &Id) -> Result<Vec<List>> {
        let board_id = int_id(board_id)?;
        let rows: Vec<ListRow> = sqlx::query_as(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE board_id = ? ORDER BY position ASC"
        ))
        .bind(board_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(List::from).collect())
    }

    async fn rename(&self, id: &Id, title: &str) -> Result<Option<List>> {
        let list_id = int_id(id)?;
        let result = sqlx::query(
            "UPDATE lists SET title = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(title)
        .bind(list_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let list_id = int_id(id)?;

        let mut tx = self.pool.begin().await?;
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT board_id, position FROM lists WHERE id = ?")
                .bind(list_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((board_id, removed_position)) = row else {
            return Ok(false);
        };

        // Cards of the list go via ON DELETE CASCADE.
        sqlx::query("DELETE FROM lists WHERE id = ?")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        let survivors = sibling_positions(&mut tx, board_id).await?;
        let updates = position::repack_after_delete(&survivors, removed_position);
        apply_updates(&mut tx, &updates).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn move_list(&self, id: &Id, new_position: i64) -> Result<Option<List>> {
        let list_id = int_id(id)?;

        let mut tx = self.pool.begin().await?;
        let row: Option<(i64,)> = sqlx::query_as("SELECT board_id FROM lists WHERE id = ?")
            .bind(list_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((board_id,)) = row else {
            return Ok(None);
        };

        let siblings = sibling_positions(&mut tx, board_id).await?;
        let updates = position::move_within_parent(&siblings, id, new_position)
            .ok_or_else(|| MmlloError::Database("list missing from its sibling set".to_string()))?;
        apply_updates(&mut tx, &updates).await?;
        tx.commit().await?;

        self.find_by_id(id).await
    }
}
