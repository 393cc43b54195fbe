//! Document-backed user store.

use async_trait::async_trait;
use serde_json::json;

use crate::model::{NewUser, User};
use crate::store::UserStore;
use crate::{Id, MmlloError, Result};

use super::{now, text_id, to_model, DocDatabase, DocWrite};

/// User store over the document engine's `users` collection.
#[derive(Debug, Clone)]
pub struct DocumentUserStore {
    db: DocDatabase,
}

impl DocumentUserStore {
    pub fn new(db: DocDatabase) -> Self {
        Self { db }
    }

    async fn find_one(&self, field: &'static str, value: &str) -> Result<Option<User>> {
        let docs = self.db.find_by_field("users", field, value, false).await?;
        docs.into_iter().next().map(to_model).transpose()
    }
}

#[async_trait]
impl UserStore for DocumentUserStore {
    async fn create(&self, new: &NewUser) -> Result<User> {
        // Uniqueness is enforced here rather than by the engine; the probe
        // and the insert share a transaction so concurrent registrations
        // cannot both pass the check.
        let mut txn = self.db.begin().await?;
        if !txn
            .find_by_field("users", "username", &new.username, false)
            .await?
            .is_empty()
        {
            return Err(MmlloError::Conflict(
                "username already registered".to_string(),
            ));
        }
        if !txn
            .find_by_field("users", "email", &new.email, false)
            .await?
            .is_empty()
        {
            return Err(MmlloError::Conflict("email already registered".to_string()));
        }

        let ts = now();
        let id = txn
            .insert(
                "users",
                json!({
                    "username": new.username,
                    "email": new.email,
                    "password": new.password,
                    "created_at": ts,
                    "updated_at": ts,
                }),
            )
            .await?;
        txn.commit().await?;

        self.find_by_id(&Id::Text(id))
            .await?
            .ok_or_else(|| MmlloError::Database("created user not readable".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<User>> {
        let doc = self.db.get("users", text_id(id)?).await?;
        doc.map(to_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.find_one("email", email).await
    }

    async fn update_password(&self, id: &Id, password_hash: &str) -> Result<bool> {
        let doc_id = text_id(id)?;
        if self.db.get("users", doc_id).await?.is_none() {
            return Ok(false);
        }
        self.db
            .apply_batch(&[DocWrite::Patch {
                collection: "users",
                id: doc_id.to_string(),
                fields: vec![
                    ("password", json!(password_hash)),
                    ("updated_at", json!(now())),
                ],
            }])
            .await?;
        Ok(true)
    }
}
