//! mmllo - a Kanban-style task board server.
//!
//! Users own boards; boards hold ordered lists of ordered cards. Positions
//! are dense zero-based integers maintained by a pure reindexing algorithm,
//! and persistence runs against either a relational SQLite backend or a
//! document backend selected at startup.

pub mod access;
pub mod auth;
pub mod config;
pub mod db;
pub mod docstore;
pub mod error;
pub mod id;
pub mod logging;
pub mod model;
pub mod position;
pub mod store;
pub mod web;

pub use auth::{hash_password, issue_token, validate_password, verify_password, verify_token};
pub use config::Config;
pub use db::Database;
pub use error::{MmlloError, Result};
pub use id::{Id, IdKind};
pub use store::{select_stores, BackendSelection, Stores};
pub use web::create_router;
