//! Document-backed board store.
//!
//! Boards embed their membership array. Cascading deletes are expressed as
//! one batch covering the board, its lists, and those lists' cards.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::model::{
    Board, BoardMember, BoardUpdate, MemberRole, NewBoard, DEFAULT_BACKGROUND,
};
use crate::store::BoardStore;
use crate::{Id, MmlloError, Result};

use super::{now, text_id, to_model, DocDatabase, DocWrite};

/// Board store over the document engine's `boards` collection.
#[derive(Debug, Clone)]
pub struct DocumentBoardStore {
    db: DocDatabase,
}

impl DocumentBoardStore {
    pub fn new(db: DocDatabase) -> Self {
        Self { db }
    }

    async fn raw(&self, id: &Id) -> Result<Option<Value>> {
        self.db.get("boards", text_id(id)?).await
    }

    fn member_entries(doc: &Value) -> Vec<Value> {
        doc.get("members")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl BoardStore for DocumentBoardStore {
    async fn create(&self, new: &NewBoard) -> Result<Board> {
        let ts = now();
        let id = self
            .db
            .insert(
                "boards",
                json!({
                    "title": new.title,
                    "description": new.description,
                    "owner_id": text_id(&new.owner_id)?,
                    "background": new.background.as_deref().unwrap_or(DEFAULT_BACKGROUND),
                    "is_starred": false,
                    "members": [],
                    "created_at": ts,
                    "updated_at": ts,
                }),
            )
            .await?;

        self.find_by_id(&Id::Text(id))
            .await?
            .ok_or_else(|| MmlloError::Database("created board not readable".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<Board>> {
        self.raw(id).await?.map(to_model).transpose()
    }

    async fn find_by_user(&self, user_id: &Id) -> Result<Vec<Board>> {
        let user = text_id(user_id)?;
        let bodies: Vec<String> = sqlx::query_scalar(
            "SELECT body FROM boards
             WHERE json_extract(body, '$.owner_id') = ?1
                OR EXISTS (
                    SELECT 1 FROM json_each(body, '$.members')
                    WHERE json_extract(json_each.value, '$.user_id') = ?1
                )",
        )
        .bind(user)
        .fetch_all(self.db.pool())
        .await?;

        let mut boards = bodies
            .iter()
            .map(|b| {
                serde_json::from_str(b)
                    .map_err(|e| MmlloError::Database(format!("corrupt document: {e}")))
                    .and_then(to_model::<Board>)
            })
            .collect::<Result<Vec<_>>>()?;

        // Starred first, then newest first. RFC 3339 strings sort
        // chronologically, the id breaks creation-time ties.
        boards.sort_by(|a, b| {
            b.is_starred
                .cmp(&a.is_starred)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.to_string().cmp(&a.id.to_string()))
        });
        Ok(boards)
    }

    async fn update(&self, id: &Id, update: &BoardUpdate) -> Result<Option<Board>> {
        let doc_id = text_id(id)?;
        if self.db.get("boards", doc_id).await?.is_none() {
            return Ok(None);
        }
        self.db
            .apply_batch(&[DocWrite::Patch {
                collection: "boards",
                id: doc_id.to_string(),
                fields: vec![
                    ("title", json!(update.title)),
                    ("description", json!(update.description)),
                    ("background", json!(update.background)),
                    ("is_starred", json!(update.is_starred)),
                    ("updated_at", json!(now())),
                ],
            }])
            .await?;
        self.find_by_id(id).await
    }

    async fn delete(&self, id: &Id) -> Result<bool> {
        let doc_id = text_id(id)?;
        let mut txn = self.db.begin().await?;
        if txn.get("boards", doc_id).await?.is_none() {
            return Ok(false);
        }

        let mut writes = vec![DocWrite::Delete {
            collection: "boards",
            id: doc_id.to_string(),
        }];
        let lists = txn.find_by_field("lists", "board_id", doc_id, false).await?;
        for list in &lists {
            let list_id = list
                .get("_id")
                .and_then(Value::as_str)
                .ok_or_else(|| MmlloError::Database("list document missing _id".to_string()))?;
            for card in txn.find_by_field("cards", "list_id", list_id, false).await? {
                let card_id = card.get("_id").and_then(Value::as_str).ok_or_else(|| {
                    MmlloError::Database("card document missing _id".to_string())
                })?;
                writes.push(DocWrite::Delete {
                    collection: "cards",
                    id: card_id.to_string(),
                });
            }
            writes.push(DocWrite::Delete {
                collection: "lists",
                id: list_id.to_string(),
            });
        }

        txn.apply(&writes).await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn set_starred(&self, id: &Id, starred: bool) -> Result<bool> {
        let doc_id = text_id(id)?;
        if self.db.get("boards", doc_id).await?.is_none() {
            return Ok(false);
        }
        self.db
            .apply_batch(&[DocWrite::Patch {
                collection: "boards",
                id: doc_id.to_string(),
                fields: vec![
                    ("is_starred", json!(starred)),
                    ("updated_at", json!(now())),
                ],
            }])
            .await?;
        Ok(true)
    }

    async fn members(&self, board_id: &Id) -> Result<Vec<BoardMember>> {
        let Some(doc) = self.raw(board_id).await? else {
            return Ok(Vec::new());
        };

        let mut members = Vec::new();
        for entry in Self::member_entries(&doc) {
            let user_id = entry
                .get("user_id")
                .and_then(Value::as_str)
                .ok_or_else(|| MmlloError::Database("member entry missing user_id".to_string()))?
                .to_string();
            let role: MemberRole = entry
                .get("role")
                .and_then(Value::as_str)
                .unwrap_or("member")
                .parse()
                .map_err(MmlloError::Database)?;

            // Members whose user document has vanished are skipped rather
            // than failing the whole listing.
            if let Some(user) = self.db.get("users", &user_id).await? {
                members.push(BoardMember {
                    user_id: Id::Text(user_id),
                    username: user
                        .get("username")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    email: user
                        .get("email")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    role,
                });
            }
        }
        Ok(members)
    }

    async fn is_member(&self, board_id: &Id, user_id: &Id) -> Result<bool> {
        let Some(doc) = self.raw(board_id).await? else {
            return Ok(false);
        };
        let user = text_id(user_id)?;
        Ok(Self::member_entries(&doc)
            .iter()
            .any(|m| m.get("user_id").and_then(Value::as_str) == Some(user)))
    }

    async fn add_member(&self, board_id: &Id, user_id: &Id, role: MemberRole) -> Result<()> {
        let doc_id = text_id(board_id)?;
        let mut txn = self.db.begin().await?;
        let doc = txn
            .get("boards", doc_id)
            .await?
            .ok_or_else(|| MmlloError::NotFound("board".to_string()))?;

        let user = text_id(user_id)?;
        let mut members = Self::member_entries(&doc);
        if members
            .iter()
            .any(|m| m.get("user_id").and_then(Value::as_str) == Some(user))
        {
            return Err(MmlloError::Conflict(
                "user is already a member of this board".to_string(),
            ));
        }
        members.push(json!({
            "user_id": user,
            "role": role.as_str(),
            "added_at": now(),
        }));

        txn.apply(&[DocWrite::Patch {
            collection: "boards",
            id: doc_id.to_string(),
            fields: vec![("members", Value::Array(members))],
        }])
        .await?;
        txn.commit().await
    }

    async fn update_member_role(
        &self,
        board_id: &Id,
        user_id: &Id,
        role: MemberRole,
    ) -> Result<bool> {
        let doc_id = text_id(board_id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("boards", doc_id).await? else {
            return Ok(false);
        };

        let user = text_id(user_id)?;
        let mut members = Self::member_entries(&doc);
        let Some(entry) = members
            .iter_mut()
            .find(|m| m.get("user_id").and_then(Value::as_str) == Some(user))
        else {
            return Ok(false);
        };
        if let Some(map) = entry.as_object_mut() {
            map.insert("role".to_string(), json!(role.as_str()));
        }

        txn.apply(&[DocWrite::Patch {
            collection: "boards",
            id: doc_id.to_string(),
            fields: vec![("members", Value::Array(members))],
        }])
        .await?;
        txn.commit().await?;
        Ok(true)
    }

    async fn remove_member(&self, board_id: &Id, user_id: &Id) -> Result<bool> {
        let doc_id = text_id(board_id)?;
        let mut txn = self.db.begin().await?;
        let Some(doc) = txn.get("boards", doc_id).await? else {
            return Ok(false);
        };

        let user = text_id(user_id)?;
        let mut members = Self::member_entries(&doc);
        let before = members.len();
        members.retain(|m| m.get("user_id").and_then(Value::as_str) != Some(user));
        if members.len() == before {
            return Ok(false);
        }

        txn.apply(&[DocWrite::Patch {
            collection: "boards",
            id: doc_id.to_string(),
            fields: vec![("members", Value::Array(members))],
        }])
        .await?;
        txn.commit().await?;
        Ok(true)
    }
}
