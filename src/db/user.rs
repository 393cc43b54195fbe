//! Relational user store.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{int_id, Database};
use crate::model::{NewUser, User};
use crate::store::UserStore;
use crate::{Id, MmlloError, Result};

/// User store backed by the relational database.
pub struct RelationalUserStore {
    pool: SqlitePool,
}

impl RelationalUserStore {
    /// Create a store over the given database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    password: String,
    created_at: String,
    updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: Id::Int(row.id),
            username: row.username,
            email: row.email,
            password: row.password,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const USER_COLUMNS: &str = "id, username, email, password, created_at, updated_at";

#[async_trait]
impl UserStore for RelationalUserStore {
    async fn create(&self, new: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, email, password) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                MmlloError::Conflict("username or email already registered".to_string())
            }
            _ => MmlloError::Database(e.to_string()),
        })?;

        self.find_by_id(&Id::Int(id))
            .await?
            .ok_or_else(|| MmlloError::NotFound("user".to_string()))
    }

    async fn find_by_id(&self, id: &Id) -> Result<Option<User>> {
        let id = int_id(id)?;
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn update_password(&self, id: &Id, password_hash: &str) -> Result<bool> {
        let id = int_id(id)?;
        let result = sqlx::query(
            "UPDATE users SET password = ?, updated_at = datetime('now') WHERE id = ?",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
