//! Relational card store.
//!
//! Card positions are maintained the same way as list positions: every
//! position-mutating operation computes its reindex update set and applies
//! it inside one transaction. Cross-list moves close the source gap, open
//! the target slot, and relocate the mover in a single transaction as well.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

use super::{int_id, Database};
use crate::model::{Card, CardUpdate, Comment, NewCard};
use crate::position;
use crate::store::CardStore;
use crate::{Id, MmlloError, Result};

/// Card store backed by the relational database.
pub struct RelationalCardStore {
    pool: SqlitePool,
}

impl RelationalCardStore {
    /// Create a store over the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CardRow {
    id: i64,
    title: String,
    description: Option<String>,
    list_id: i64,
    position: i64,
    due_date: Option<String>,
    labels: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CardRow> for Card {
    type Error = MmlloError;

    fn try_from(row: CardRow) -> Result<Self> {
        // Labels are stored as JSON text; decode at the row boundary so
        // nothing downstream sees the raw representation.
        let labels = match row.labels.as_deref() {
            Some(text) if !text.is_empty() => serde_json::from_str(text)
                .map_err(|e| MmlloError::Database(format!("invalid labels column: {e}")))?,
            _ => Vec::new(),
        };
        Ok(Card {
            id: Id::Int(row.id),
            title: row.title,
            description: row.description,
            list_id: Id::Int(row.list_id),
            position: row.position,
            due_date: row.due_date,
            labels,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: i64,
    card_id: i64,
    user_id: i64,
    username: String,
    content: String,
    created_at: String,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: Id::Int(row.id),
            card_id: Id::Int(row.card_id),
            user_id: Id::Int(row.user_id),
            username: row.username,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

const CARD_COLUMNS: &str =
    "id, title, description, list_id, position, due_date, labels, created_at, updated_at";

fn encode_labels(labels: &[String]) -> Result<String> {
    serde_json::to_string(labels)
        .map_err(|e| MmlloError::Database(format!("failed to encode labels: {e}")))
}

/// Sibling (id, position) pairs for a list, position ascending.
async fn sibling_positions(
    tx: &mut Transaction<'_, Sqlite>,
    list_id: i64,
) -> Result<Vec<(Id, i64)>> {
    let rows: Vec<(i64, i64)> =
        sqlx::query_as("SELECT id, position FROM cards WHERE list_id = ? ORDER BY position ASC")
            .bind(list_id)
            .fetch_all(&mut **tx)
            .await?;
    Ok(rows.into_iter().map(|(id, pos)| (Id::Int(id), pos)).collect())
}

async fn apply_updates(
    tx: &mut Transaction<'_, Sqlite>,
    updates: &[position::PositionUpdate],
) -> Result<()> {
    for update in updates {
        sqlx::query("UPDATE cards SET position = ?, updated_at = datetime('now') WHERE id = ?")
            .bind(update.position)
            .bind(int_id(&update.id)?)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl CardStore for RelationalCardStore {
    async fn create(&self, new: &NewCard) -> Result<Card> {
        let list_id = int_id(&new.list_id)?;
        let labels = encode_labels(&new.labels)?;

        let mut tx = self.pool.begin().await?;
        let siblings = sibling_positions(&mut tx, list_id).await?;
        let position = position::next_position(&siblings);
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO cards (title, description, list_id, position, due_date, labels)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(list_id)
        .bind(position)
        .bind(&new.due_date)
        .bind(&labels)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        self.find_by_id(&Id::Int(id))
            .await?
            .ok_or_else(|| MmlloError::NotFound("card".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Card>> {
        let id = int_id(id)?;
        let row: Option<CardRow> =
            sqlx::query_as(&format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(Card::try_from).transpose()
    }

    async fn find_by_list(&self, list_id: &Id) -> Result<Vec<Card>> {
        let list_id = int_id(list_id)?;
        let rows: Vec<CardRow> = sqlx::query_as(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE list_id = ? ORDER BY position ASC"
        ))
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Card::try_from).collect()
    }

    async fn update(&self, id: &Id, update: &CardUpdate) -> Result<Option<Card>> {
        let card_id = int_id(id)?;
        let labels = encode_labels(&update.labels)?;
        let result = sqlx::query(
            "UPDATE cards SET title = ?, description = ?, due_date = ?, labels = ?,
                    updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.due_date)
        .bind(&labels)
        .bind(card_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let card_id = int_id(id)?;

        let mut tx = self.pool.begin().await?;
        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT list_id, position FROM cards WHERE id = ?")
                .bind(card_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((list_id, removed_position)) = row else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(card_id)
            .execute(&mut *tx)
            .await?;

        let survivors = sibling_positions(&mut tx, list_id).await?;
        let updates = position::repack_after_delete(&survivors, removed_position);
        apply_updates(&mut tx, &updates).await?;
        tx.commit().await?;
        Ok(true)
    }

    async fn move_in_list(&self, id: &Id, new_position: i64) -> Result<Option<Card>> {
        let card_id = int_id(id)?;

        let mut tx = self.pool.begin().await?;
        let row: Option<(i64,)> = sqlx::query_as("SELECT list_id FROM cards WHERE id = ?")
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((list_id,)) = row else {
            return Ok(None);
        };

        let siblings = sibling_positions(&mut tx, list_id).await?;
        let updates = position::move_within_parent(&siblings, id, new_position)
            .ok_or_else(|| MmlloError::Database("card missing from its sibling set".to_string()))?;
        apply_updates(&mut tx, &updates).await?;
        tx.commit().await?;

        self.find_by_id(id).await
    }

    async fn move_to_list(&self, id: &Id, list_id: &Id, position: i64) -> Result<Option<Card>> {
        let card_id = int_id(id)?;
        let target_list_id = int_id(list_id)?;

        let mut tx = self.pool.begin().await?;
        let row: Option<(i64,)> = sqlx::query_as("SELECT list_id FROM cards WHERE id = ?")
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some((source_list_id,)) = row else {
            return Ok(None);
        };

        if source_list_id == target_list_id {
            drop(tx);
            return self.move_in_list(id, position).await;
        }

        let target_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM lists WHERE id = ?)")
                .bind(target_list_id)
                .fetch_one(&mut *tx)
                .await?;
        if !target_exists {
            return Err(MmlloError::NotFound("list".to_string()));
        }

        let source = sibling_positions(&mut tx, source_list_id).await?;
        let target = sibling_positions(&mut tx, target_list_id).await?;
        let mv = position::move_across_parents(id, &source, &target, position)
            .ok_or_else(|| MmlloError::Database("card missing from its sibling set".to_string()))?;

        apply_updates(&mut tx, &mv.source_updates).await?;
        apply_updates(&mut tx, &mv.target_updates).await?;
        sqlx::query(
            "UPDATE cards SET list_id = ?, position = ?, updated_at = datetime('now')
             WHERE id = ?",
        )
        .bind(target_list_id)
        .bind(mv.moving_position)
        .bind(card_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        self.find_by_id(id).await
    }

    async fn add_comment(&self, card_id: &Id, user_id: &Id, content: &str) -> Result<Comment> {
        let card = int_id(card_id)?;
        let user = int_id(user_id)?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cards WHERE id = ?)")
            .bind(card)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(MmlloError::NotFound("card".to_string()));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (content, card_id, user_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(content)
        .bind(card)
        .bind(user)
        .fetch_one(&self.pool)
        .await?;

        let row: CommentRow = sqlx::query_as(
            "SELECT c.id, c.card_id, c.user_id, u.username, c.content, c.created_at
             FROM comments c
             JOIN users u ON c.user_id = u.id
             WHERE c.id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Comment::from(row))
    }

    async fn comments(&self, card_id: &Id) -> Result<Vec<Comment>> {
        let card_id = int_id(card_id)?;
        let rows: Vec<CommentRow> = sqlx::query_as(
            "SELECT c.id, c.card_id, c.user_id, u.username, c.content, c.created_at
             FROM comments c
             JOIN users u ON c.user_id = u.id
             WHERE c.card_id = ?
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(card_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
