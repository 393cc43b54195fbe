//! Document storage backend.
//!
//! A self-contained JSON-document engine over its own SQLite file: one table
//! per collection, each row holding a document keyed by an opaque string id.
//! Boards embed their members array and cards embed their comments array, so
//! the logical layout is four collections (users, boards, lists, cards)
//! rather than the relational backend's six tables.
//!
//! Documents carry two engine-internal fields: `_id` (the primary key,
//! duplicated into the document) and `_rev` (a write counter). [`normalize`]
//! renames `_id` to the canonical `id` field and strips `_rev` before a
//! document reaches business logic, so downstream code never sees the
//! engine's native shape.
//!
//! Read-then-write operations (sibling reindexing, embedded-array edits,
//! uniqueness probes) run through [`DocTxn`], which scopes the reads and
//! the batch that depends on them to one SQLite transaction.

mod board;
mod card;
mod list;
mod user;

pub use board::DocumentBoardStore;
pub use card::DocumentCardStore;
pub use list::DocumentListStore;
pub use user::DocumentUserStore;

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{MmlloError, Result};

/// Collections the engine manages.
const COLLECTIONS: &[&str] = &["users", "boards", "lists", "cards"];

/// A single write in a document batch.
///
/// A batch is applied inside one transaction: either every write lands or
/// none does. This is the document-side equivalent of the relational
/// backend's reindexing transactions.
#[derive(Debug)]
pub enum DocWrite {
    /// Merge the given top-level fields into an existing document.
    Patch {
        /// Target collection.
        collection: &'static str,
        /// Document id.
        id: String,
        /// Field name / new value pairs.
        fields: Vec<(&'static str, Value)>,
    },
    /// Delete a document.
    Delete {
        /// Target collection.
        collection: &'static str,
        /// Document id.
        id: String,
    },
}

/// Document database over a dedicated SQLite file.
#[derive(Clone)]
pub struct DocDatabase {
    pool: SqlitePool,
}

impl DocDatabase {
    /// Open (creating if necessary) the document store at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening document store at {:?}", path);

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5));
        Self::connect(options).await
    }

    /// Open an in-memory document store for testing.
    pub async fn open_in_memory() -> Result<Self> {
        debug!("Opening in-memory document store");
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| MmlloError::DatabaseConnection(e.to_string()))?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self> {
        // Single connection: batches and positioned inserts serialize.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| MmlloError::DatabaseConnection(e.to_string()))?;

        for collection in COLLECTIONS {
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {collection} (
                    id    TEXT PRIMARY KEY,
                    body  TEXT NOT NULL
                )"
            ))
            .execute(&pool)
            .await?;
        }

        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Start a transaction.
    ///
    /// Every read-then-write store operation runs inside one of these; the
    /// single write connection queues concurrent transactions, so sibling
    /// reads always observe the committed state their batch rewrites.
    pub async fn begin(&self) -> Result<DocTxn> {
        Ok(DocTxn {
            tx: self.pool.begin().await?,
        })
    }

    /// Insert a document, assigning it a fresh opaque id. Returns the id.
    pub async fn insert(&self, collection: &'static str, doc: Value) -> Result<String> {
        let mut txn = self.begin().await?;
        let id = txn.insert(collection, doc).await?;
        txn.commit().await?;
        Ok(id)
    }

    /// Insert a document whose `position` field is the parent's next dense
    /// slot, computed and written in one transaction.
    pub async fn insert_positioned(
        &self,
        collection: &'static str,
        parent_field: &'static str,
        parent_id: &str,
        mut doc: Value,
    ) -> Result<String> {
        let mut txn = self.begin().await?;
        let siblings = sibling_positions(
            &txn.find_by_field(collection, parent_field, parent_id, false)
                .await?,
        )?;
        let position = crate::position::next_position(&siblings);

        if let Some(map) = doc.as_object_mut() {
            map.insert("position".to_string(), Value::from(position));
        }
        let id = txn.insert(collection, doc).await?;
        txn.commit().await?;
        Ok(id)
    }

    /// Fetch a document by id (raw engine shape; callers normalize).
    pub async fn get(&self, collection: &'static str, id: &str) -> Result<Option<Value>> {
        let body: Option<String> =
            sqlx::query_scalar(&format!("SELECT body FROM {collection} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        body.map(|b| parse_body(&b)).transpose()
    }

    /// Fetch documents whose top-level `field` equals the given string,
    /// ordered by their `position` field when requested.
    pub async fn find_by_field(
        &self,
        collection: &'static str,
        field: &'static str,
        value: &str,
        order_by_position: bool,
    ) -> Result<Vec<Value>> {
        let order = if order_by_position {
            " ORDER BY json_extract(body, '$.position') ASC"
        } else {
            ""
        };
        let bodies: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT body FROM {collection} WHERE json_extract(body, '$.{field}') = ?{order}"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        bodies.iter().map(|b| parse_body(b)).collect()
    }

    /// Delete a document. Returns false when it was absent.
    pub async fn delete(&self, collection: &'static str, id: &str) -> Result<bool> {
        let result = sqlx::query(&format!("DELETE FROM {collection} WHERE id = ?"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply a batch of writes in a single transaction (all-or-none).
    pub async fn apply_batch(&self, writes: &[DocWrite]) -> Result<()> {
        let mut txn = self.begin().await?;
        txn.apply(writes).await?;
        txn.commit().await
    }
}

/// An open transaction over the document engine.
///
/// Reads and writes made through it join the same SQLite transaction: a
/// sibling read and the reindexing batch it feeds cannot interleave with a
/// concurrent writer on the same parent. Dropping an uncommitted
/// transaction rolls it back.
pub struct DocTxn {
    tx: Transaction<'static, Sqlite>,
}

impl DocTxn {
    /// Insert a document, assigning it a fresh opaque id. Returns the id.
    pub async fn insert(&mut self, collection: &'static str, mut doc: Value) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        set_internal_fields(&mut doc, &id, 1)?;
        sqlx::query(&format!("INSERT INTO {collection} (id, body) VALUES (?, ?)"))
            .bind(&id)
            .bind(doc.to_string())
            .execute(&mut *self.tx)
            .await?;
        Ok(id)
    }

    /// Fetch a document by id (raw engine shape; callers normalize).
    pub async fn get(&mut self, collection: &'static str, id: &str) -> Result<Option<Value>> {
        let body: Option<String> =
            sqlx::query_scalar(&format!("SELECT body FROM {collection} WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;
        body.map(|b| parse_body(&b)).transpose()
    }

    /// Fetch documents whose top-level `field` equals the given string,
    /// ordered by their `position` field when requested.
    pub async fn find_by_field(
        &mut self,
        collection: &'static str,
        field: &'static str,
        value: &str,
        order_by_position: bool,
    ) -> Result<Vec<Value>> {
        let order = if order_by_position {
            " ORDER BY json_extract(body, '$.position') ASC"
        } else {
            ""
        };
        let bodies: Vec<String> = sqlx::query_scalar(&format!(
            "SELECT body FROM {collection} WHERE json_extract(body, '$.{field}') = ?{order}"
        ))
        .bind(value)
        .fetch_all(&mut *self.tx)
        .await?;
        bodies.iter().map(|b| parse_body(b)).collect()
    }

    /// Apply a batch of writes within this transaction.
    pub async fn apply(&mut self, writes: &[DocWrite]) -> Result<()> {
        for write in writes {
            match write {
                DocWrite::Patch {
                    collection,
                    id,
                    fields,
                } => {
                    for (field, value) in fields {
                        sqlx::query(&format!(
                            "UPDATE {collection}
                             SET body = json_set(body, '$.{field}', json(?))
                             WHERE id = ?"
                        ))
                        .bind(value.to_string())
                        .bind(id)
                        .execute(&mut *self.tx)
                        .await?;
                    }
                    // Bump the write counter once per patched document.
                    sqlx::query(&format!(
                        "UPDATE {collection}
                         SET body = json_set(body, '$._rev',
                                             json_extract(body, '$._rev') + 1)
                         WHERE id = ?"
                    ))
                    .bind(id)
                    .execute(&mut *self.tx)
                    .await?;
                }
                DocWrite::Delete { collection, id } => {
                    sqlx::query(&format!("DELETE FROM {collection} WHERE id = ?"))
                        .bind(id)
                        .execute(&mut *self.tx)
                        .await?;
                }
            }
        }
        Ok(())
    }

    /// Commit the transaction, making its writes visible.
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl std::fmt::Debug for DocDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocDatabase").finish()
    }
}

fn parse_body(body: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|e| MmlloError::Database(format!("corrupt document: {e}")))
}

fn set_internal_fields(doc: &mut Value, id: &str, rev: i64) -> Result<()> {
    let map = doc
        .as_object_mut()
        .ok_or_else(|| MmlloError::Database("document body must be an object".to_string()))?;
    map.insert("_id".to_string(), Value::from(id));
    map.insert("_rev".to_string(), Value::from(rev));
    Ok(())
}

/// Normalize a stored document for business logic: the engine's `_id` key
/// becomes the canonical `id` field and internal metadata is stripped.
pub fn normalize(mut doc: Value) -> Value {
    if let Some(map) = doc.as_object_mut() {
        if let Some(id) = map.remove("_id") {
            map.insert("id".to_string(), id);
        }
        map.remove("_rev");
    }
    doc
}

/// Normalize and decode a stored document into a model type.
pub(crate) fn to_model<T: DeserializeOwned>(doc: Value) -> Result<T> {
    serde_json::from_value(normalize(doc))
        .map_err(|e| MmlloError::Database(format!("malformed document: {e}")))
}

/// Current timestamp in the document backend's string rendering.
pub(crate) fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Sibling (id, position) pairs from a set of raw documents.
pub(crate) fn sibling_positions(docs: &[Value]) -> Result<Vec<(crate::Id, i64)>> {
    docs.iter()
        .map(|doc| {
            let id = doc
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| MmlloError::Database("document missing _id".to_string()))?;
            let position = doc
                .get("position")
                .and_then(Value::as_i64)
                .ok_or_else(|| MmlloError::Database("document missing position".to_string()))?;
            Ok((crate::Id::Text(id.to_string()), position))
        })
        .collect()
}

/// Coerce a canonical id to the document backend's string form.
pub(crate) fn text_id(id: &crate::Id) -> Result<&str> {
    id.as_text()
        .ok_or_else(|| MmlloError::Validation(format!("expected document id, got {id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_get_normalize() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let id = db
            .insert("users", json!({"username": "ada", "email": "ada@example.com"}))
            .await
            .unwrap();

        let raw = db.get("users", &id).await.unwrap().unwrap();
        assert_eq!(raw["_id"], json!(id));
        assert_eq!(raw["_rev"], json!(1));

        let doc = normalize(raw);
        assert_eq!(doc["id"], json!(id));
        assert!(doc.get("_id").is_none());
        assert!(doc.get("_rev").is_none());
        assert_eq!(doc["username"], json!("ada"));
    }

    #[tokio::test]
    async fn test_find_by_field_orders_by_position() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        for (title, pos) in [("b", 1), ("a", 0), ("c", 2)] {
            db.insert("lists", json!({"title": title, "board_id": "brd", "position": pos}))
                .await
                .unwrap();
        }
        let docs = db
            .find_by_field("lists", "board_id", "brd", true)
            .await
            .unwrap();
        let titles: Vec<&str> = docs.iter().map(|d| d["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_insert_positioned_assigns_dense_positions() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        for title in ["one", "two", "three"] {
            db.insert_positioned("lists", "board_id", "brd", json!({"title": title, "board_id": "brd"}))
                .await
                .unwrap();
        }
        let docs = db
            .find_by_field("lists", "board_id", "brd", true)
            .await
            .unwrap();
        let positions: Vec<i64> = docs
            .iter()
            .map(|d| d["position"].as_i64().unwrap())
            .collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_patch_bumps_rev_and_preserves_fields() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let id = db
            .insert("cards", json!({"title": "t", "position": 0, "comments": [{"content": "hi"}]}))
            .await
            .unwrap();

        db.apply_batch(&[DocWrite::Patch {
            collection: "cards",
            id: id.clone(),
            fields: vec![("position", json!(4))],
        }])
        .await
        .unwrap();

        let doc = db.get("cards", &id).await.unwrap().unwrap();
        assert_eq!(doc["position"], json!(4));
        assert_eq!(doc["_rev"], json!(2));
        // Untouched fields survive a patch.
        assert_eq!(doc["comments"][0]["content"], json!("hi"));
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_rolls_back() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let id = {
            let mut txn = db.begin().await.unwrap();
            txn.insert("boards", json!({"title": "b"})).await.unwrap()
        };
        assert!(db.get("boards", &id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transaction_reads_see_own_writes() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let mut txn = db.begin().await.unwrap();
        let id = txn
            .insert("lists", json!({"board_id": "brd", "position": 0}))
            .await
            .unwrap();
        let docs = txn
            .find_by_field("lists", "board_id", "brd", false)
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        txn.commit().await.unwrap();
        assert!(db.get("lists", &id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_reports_change_count() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let id = db.insert("boards", json!({"title": "b"})).await.unwrap();
        assert!(db.delete("boards", &id).await.unwrap());
        assert!(!db.delete("boards", &id).await.unwrap());
    }

    #[tokio::test]
    async fn test_batch_delete_and_patch_together() {
        let db = DocDatabase::open_in_memory().await.unwrap();
        let keep = db
            .insert("cards", json!({"title": "keep", "position": 1}))
            .await
            .unwrap();
        let gone = db
            .insert("cards", json!({"title": "gone", "position": 0}))
            .await
            .unwrap();

        db.apply_batch(&[
            DocWrite::Delete {
                collection: "cards",
                id: gone.clone(),
            },
            DocWrite::Patch {
                collection: "cards",
                id: keep.clone(),
                fields: vec![("position", json!(0))],
            },
        ])
        .await
        .unwrap();

        assert!(db.get("cards", &gone).await.unwrap().is_none());
        let doc = db.get("cards", &keep).await.unwrap().unwrap();
        assert_eq!(doc["position"], json!(0));
    }
}
