//! Document-backed card store.
//!
//! Cards embed their comments array, so comment operations are patches on
//! the card document rather than writes to a separate collection.

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::model::{Card, CardUpdate, Comment, NewCard};
use crate::position;
use crate::store::CardStore;
use crate::{Id, MmlloError, Result};

use super::list::position_writes;
use super::{now, sibling_positions, text_id, to_model, DocDatabase, DocTxn, DocWrite};

/// Card store over the document engine's `cards` collection.
#[derive(Debug, Clone)]
pub struct DocumentCardStore {
    db: DocDatabase,
}

impl DocumentCardStore {
    pub fn new(db: DocDatabase) -> Self {
        Self { db }
    }

    async fn raw(&self, id: &Id) -> Result<Option<Value>> {
        self.db.get("cards", text_id(id)?).await
    }
}

/// Sibling (id, position) pairs of a list, read inside the transaction that
/// will rewrite them.
async fn list_pairs(txn: &mut DocTxn, list_id: &str) -> Result<Vec<(Id, i64)>> {
    let docs = txn.find_by_field("cards", "list_id", list_id, false).await?;
    sibling_positions(&docs)
}

fn doc_list_id(doc: &Value) -> Result<&str> {
    doc.get("list_id")
        .and_then(Value::as_str)
        .ok_or_else(|| MmlloError::Database("card document missing list_id".to_string()))
}

fn doc_position(doc: &Value) -> Result<i64> {
    doc.get("position")
        .and_then(Value::as_i64)
        .ok_or_else(|| MmlloError::Database("card document missing position".to_string()))
}

fn embedded_comment(card_id: &Id, entry: &Value) -> Result<Comment> {
    let field = |name: &str| {
        entry
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MmlloError::Database(format!("comment entry missing {name}")))
    };
    Ok(Comment {
        id: Id::Text(field("id")?),
        card_id: card_id.clone(),
        user_id: Id::Text(field("user_id")?),
        username: field("username")?,
        content: field("content")?,
        created_at: field("created_at")?,
    })
}

#[async_trait]
impl CardStore for DocumentCardStore {
    async fn create(&self, new: &NewCard) -> Result<Card> {
        let ts = now();
        let id = self
            .db
            .insert_positioned(
                "cards",
                "list_id",
                text_id(&new.list_id)?,
                json!({
                    "title": new.title,
                    "description": new.description,
                    "list_id": text_id(&new.list_id)?,
                    "due_date": new.due_date,
                    "labels": new.labels,
                    "comments": [],
                    "created_at": ts,
                    "updated_at": ts,
                }),
            )
            .await?;

        self.find_by_id(&Id::Text(id))
            .await?
            .ok_or_else(|| MmlloError::Database("created card not readable".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Card>> {
        self.raw(id).await?.map(to_model).transpose()
    }

    async fn find_by_list(&self, list_id: &Id) -> Result<Vec<Card>> {
        let docs = self
            .db
            .find_by_field("cards", "list_id", text_id(list_id)?, true)
            .await?;
        docs.into_iter().map(to_model).collect()
    }

    async fn update(&self, id: &Id, update: &CardUpdate) -> Result<Option<Card>> {
        let doc_id = text_id(id)?;
        if self.db.get("cards", doc_id).await?.is_none() {
            return Ok(None);
        }
        self.db
            .apply_batch(&[DocWrite::Patch {
                collection: "cards",
                id: doc_id.to_string(),
                fields: vec![
                    ("title", json!(update.title)),
                    ("description", json!(update.description)),
                    ("due_date", json!(update.due_date)),
                    ("labels", json!(update.labels)),
                    ("updated_at", json!(now())),
                ],
            }])
            .await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let doc_id = text_id(id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("cards", doc_id).await? else {
            return Ok(false);
        };
        let list_id = doc_list_id(&doc)?;
        let removed_position = doc_position(&doc)?;

        let mut pairs = list_pairs(&mut txn, list_id).await?;
        pairs.retain(|(sid, _)| sid != id);
        let updates = position::repack_after_delete(&pairs, removed_position);

        let mut writes = vec![DocWrite::Delete {
            collection: "cards",
            id: doc_id.to_string(),
        }];
        writes.extend(position_writes("cards", &updates, &now())?);
        txn.apply(&writes).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn move_in_list(&self, id: &Id, new_position: i64) -> Result<Option<Card>> {
        let doc_id = text_id(id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("cards", doc_id).await? else {
            return Ok(None);
        };
        let pairs = list_pairs(&mut txn, doc_list_id(&doc)?).await?;
        let updates = position::move_within_parent(&pairs, id, new_position)
            .ok_or_else(|| MmlloError::Database("card missing from its sibling set".to_string()))?;

        let writes = position_writes("cards", &updates, &now())?;
        txn.apply(&writes).await?;
        txn.commit().await?;
        self.find_by_id(id).await
    }

    async fn move_to_list(&self, id: &Id, list_id: &Id, position_req: i64) -> Result<Option<Card>> {
        let doc_id = text_id(id)?;
        let target_list = text_id(list_id)?;

        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("cards", doc_id).await? else {
            return Ok(None);
        };
        let source_list = doc_list_id(&doc)?.to_string();

        if source_list == target_list {
            drop(txn);
            return self.move_in_list(id, position_req).await;
        }
        if txn.get("lists", target_list).await?.is_none() {
            return Err(MmlloError::NotFound("list".to_string()));
        }

        let source = list_pairs(&mut txn, &source_list).await?;
        let target = list_pairs(&mut txn, target_list).await?;
        let cross = position::move_across_parents(id, &source, &target, position_req)
            .ok_or_else(|| MmlloError::Database("card missing from its sibling set".to_string()))?;

        let ts = now();
        let mut writes = position_writes("cards", &cross.source_updates, &ts)?;
        writes.extend(position_writes("cards", &cross.target_updates, &ts)?);
        writes.push(DocWrite::Patch {
            collection: "cards",
            id: doc_id.to_string(),
            fields: vec![
                ("list_id", json!(target_list)),
                ("position", json!(cross.moving_position)),
                ("updated_at", json!(ts)),
            ],
        });
        txn.apply(&writes).await?;
        txn.commit().await?;
        self.find_by_id(id).await
    }

    async fn add_comment(&self, card_id: &Id, user_id: &Id, content: &str) -> Result<Comment> {
        let doc_id = text_id(card_id)?;
        let mut txn = self.db.begin().await?;
        let doc = txn
            .get("cards", doc_id)
            .await?
            .ok_or_else(|| MmlloError::NotFound("card".to_string()))?;

        let user = txn
            .get("users", text_id(user_id)?)
            .await?
            .ok_or_else(|| MmlloError::NotFound("user".to_string()))?;
        let username = user
            .get("username")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let entry = json!({
            "id": Uuid::new_v4().to_string(),
            "user_id": text_id(user_id)?,
            "username": username,
            "content": content,
            "created_at": now(),
        });
        let mut comments = doc
            .get("comments")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        comments.push(entry.clone());

        txn.apply(&[DocWrite::Patch {
            collection: "cards",
            id: doc_id.to_string(),
            fields: vec![("comments", Value::Array(comments))],
        }])
        .await?;
        txn.commit().await?;

        embedded_comment(card_id, &entry)
    }

    async fn comments(&self, card_id: &Id) -> Result<Vec<Comment>> {
        let Some(doc) = self.raw(card_id).await? else {
            return Ok(Vec::new());
        };
        doc.get("comments")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(|entry| embedded_comment(card_id, entry))
            .collect()
    }
}
