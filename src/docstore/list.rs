//! Document-backed list store.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::model::{List, NewList};
use crate::position::{self, PositionUpdate};
use crate::store::ListStore;
use crate::{Id, MmlloError, Result};

use super::{now, sibling_positions, text_id, to_model, DocDatabase, DocWrite};

/// List store over the document engine's `lists` collection.
#[derive(Debug, Clone)]
pub struct DocumentListStore {
    db: DocDatabase,
}

impl DocumentListStore {
    pub fn new(db: DocDatabase) -> Self {
        Self { db }
    }
}

/// Render position updates as patch writes against a collection.
pub(crate) fn position_writes(
    collection: &'static str,
    updates: &[PositionUpdate],
    ts: &str,
) -> Result<Vec<DocWrite>> {
    updates
        .iter()
        .map(|update| {
            Ok(DocWrite::Patch {
                collection,
                id: text_id(&update.id)?.to_string(),
                fields: vec![
                    ("position", json!(update.position)),
                    ("updated_at", json!(ts)),
                ],
            })
        })
        .collect()
}

#[async_trait]
impl ListStore for DocumentListStore {
    async fn create(&self, new: &NewList) -> Result<List> {
        let ts = now();
        let id = self
            .db
            .insert_positioned(
                "lists",
                "board_id",
                text_id(&new.board_id)?,
                json!({
                    "title": new.title,
                    "board_id": text_id(&new.board_id)?,
                    "created_at": ts,
                    "updated_at": ts,
                }),
            )
            .await?;

        self.find_by_id(&Id::Text(id))
            .await?
            .ok_or_else(|| MmlloError::Database("created list not readable".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<List>> {
        let doc = self.db.get("lists", text_id(id)?).await?;
        doc.map(to_model).transpose()
    }

    async fn find_by_board(&self, board_id: &Id) -> Result<Vec<List>> {
        let docs = self
            .db
            .find_by_field("lists", "board_id", text_id(board_id)?, true)
            .await?;
        docs.into_iter().map(to_model).collect()
    }

    async fn rename(&self, id: &Id, title: &str) -> Result<Option<List>> {
        let doc_id = text_id(id)?;
        if self.db.get("lists", doc_id).await?.is_none() {
            return Ok(None);
        }
        self.db
            .apply_batch(&[DocWrite::Patch {
                collection: "lists",
                id: doc_id.to_string(),
                fields: vec![("title", json!(title)), ("updated_at", json!(now()))],
            }])
            .await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let doc_id = text_id(id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("lists", doc_id).await? else {
            return Ok(false);
        };
        let board_id = doc
            .get("board_id")
            .and_then(Value::as_str)
            .ok_or_else(|| MmlloError::Database("list document missing board_id".to_string()))?
            .to_string();
        let removed_position = doc
            .get("position")
            .and_then(Value::as_i64)
            .ok_or_else(|| MmlloError::Database("list document missing position".to_string()))?;

        let mut writes = vec![DocWrite::Delete {
            collection: "lists",
            id: doc_id.to_string(),
        }];
        for card in txn.find_by_field("cards", "list_id", doc_id, false).await? {
            let card_id = card
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| MmlloError::Database("card document missing _id".to_string()))?;
            writes.push(DocWrite::Delete {
                collection: "cards",
                id: card_id.to_string(),
            });
        }

        let siblings = txn
            .find_by_field("lists", "board_id", &board_id, false)
            .await?;
        let mut pairs = sibling_positions(&siblings)?;
        pairs.retain(|(sid, _)| sid != id);
        let updates = position::repack_after_delete(&pairs, removed_position);
        writes.extend(position_writes("lists", &updates, &now())?);

        txn.apply(&writes).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn move_list(&self, id: &Id, new_position: i64) -> Result<Option<List>> {
        let doc_id = text_id(id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("lists", doc_id).await? else {
            return Ok(None);
        };
        let board_id = doc
            .get("board_id")
            .and_then(Value::as_str)
            .ok_or_else(|| MmlloError::Database("list document missing board_id".to_string()))?
            .to_string();

        let siblings = txn
            .find_by_field("lists", "board_id", &board_id, false)
            .await?;
        let pairs = sibling_positions(&siblings)?;
        let updates = position::move_within_parent(&pairs, id, new_position)
            .ok_or_else(|| MmlloError::Database("list missing from its sibling set".to_string()))?;

        let writes = position_writes("lists", &updates, &now())?;
        txn.apply(&writes).await?;
        txn.commit().await?;
        self.find_by_id(id).await
    }
}
