//! Entity identifier adapter.
//!
//! The relational backend keys rows with auto-increment integers; the
//! document backend keys documents with opaque strings. `Id` gives the rest
//! of the code a single comparable identifier type, with raw values coerced
//! to the canonical form of the active backend before any comparison.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::{MmlloError, Result};

/// Canonical identifier form of the active backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Numeric auto-increment ids (relational backend).
    Int,
    /// Opaque string ids (document backend).
    Text,
}

/// Backend-agnostic entity identifier, comparable by value.
///
/// An `Id` is always in the canonical form of the backend it came from;
/// `Id::parse` coerces externally supplied values (path parameters, token
/// claims, request bodies) into that form so a comparison never mixes an
/// integer with its string rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    /// Numeric id.
    Int(i64),
    /// Opaque string id.
    Text(String),
}

impl Id {
    /// Parse a raw identifier into the canonical form for `kind`.
    pub fn parse(raw: &str, kind: IdKind) -> Result<Self> {
        match kind {
            IdKind::Int => raw
                .parse::<i64>()
                .map(Id::Int)
                .map_err(|_| MmlloError::Validation(format!("invalid id: {raw}"))),
            IdKind::Text => {
                if raw.is_empty() {
                    return Err(MmlloError::Validation("empty id".to_string()));
                }
                Ok(Id::Text(raw.to_string()))
            }
        }
    }

    /// The canonical form this id is in.
    pub fn kind(&self) -> IdKind {
        match self {
            Id::Int(_) => IdKind::Int,
            Id::Text(_) => IdKind::Text,
        }
    }

    /// Numeric value, if this is a relational id.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Id::Int(n) => Some(*n),
            Id::Text(_) => None,
        }
    }

    /// String value, if this is a document id.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Id::Int(_) => None,
            Id::Text(s) => Some(s),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(n) => write!(f, "{n}"),
            Id::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Int(n)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

// Ids serialize as a JSON number or string depending on which backend they
// came from, matching the wire shape each backend exposed in the first place.
impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Id::Int(n) => serializer.serialize_i64(*n),
            Id::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = Id;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or string id")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Id, E> {
                Ok(Id::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Id, E> {
                Ok(Id::Int(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Id, E> {
                Ok(Id::Text(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}
