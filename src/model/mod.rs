//! Domain models for mmllo.
//!
//! Entities are backend-agnostic: identifiers are [`crate::Id`] values in the
//! canonical form of the active backend, and timestamps are the string
//! renderings the backends produce.

mod board;
mod card;
mod list;
mod user;

pub use board::{Board, BoardMember, BoardUpdate, MemberRole, NewBoard, DEFAULT_BACKGROUND};
pub use card::{Card, CardUpdate, Comment, NewCard};
pub use list::{List, NewList};
pub use user::{NewUser, User};
