//! API handlers.

pub mod auth;
pub mod board;
pub mod card;
pub mod list;

pub use auth::*;
pub use board::*;
pub use card::*;
pub use list::*;

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::store::Stores;
use crate::web::error::ApiError;
use crate::Id;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Active backend's stores.
    pub stores: Stores,
    /// Auth settings (JWT secret, validity, hash cost).
    pub auth: AuthConfig,
}

impl AppState {
    /// Create a new application state.
    pub fn new(stores: Stores, auth: AuthConfig) -> Self {
        Self { stores, auth }
    }
}

/// Shared application state handle.
pub type SharedState = Arc<AppState>;

/// Parse a path parameter into the active backend's canonical id form.
pub(crate) fn path_id(state: &AppState, raw: &str) -> Result<Id, ApiError> {
    Id::parse(raw, state.stores.id_kind).map_err(ApiError::from)
}

/// Re-canonicalize an id supplied in a request body.
///
/// JSON gives no hint which backend the client targets; a numeric id arrives
/// as `Id::Int` and a string id as `Id::Text` regardless of the active
/// backend, so the value is rendered and re-parsed against the active kind.
pub(crate) fn body_id(state: &AppState, id: &Id) -> Result<Id, ApiError> {
    Id::parse(&id.to_string(), state.stores.id_kind).map_err(ApiError::from)
}
