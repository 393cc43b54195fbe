//! Web API module.
//!
//! REST surface over the entity stores: JWT-authenticated JSON endpoints for
//! users, boards, lists, cards, and comments.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use error::ApiError;
pub use router::create_router;
