//! Backend selection.
//!
//! The relational store always opens; the document store is optional. When a
//! document path is configured it is attempted at startup and preferred over
//! the relational store, but a failed open only logs a warning and the server
//! comes up on the relational backend instead.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::db::{
    Database, RelationalBoardStore, RelationalCardStore, RelationalListStore, RelationalUserStore,
};
use crate::docstore::{
    DocDatabase, DocumentBoardStore, DocumentCardStore, DocumentListStore, DocumentUserStore,
};
use crate::IdKind;

use super::Stores;

/// Which backend ended up active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// No backend resolved yet.
    Unconfigured,
    /// Relational store only, either by configuration or by fallback.
    RelationalOnly,
    /// Document store opened and is preferred.
    DocumentPreferred,
}

/// Resolve the active backend from configuration.
///
/// `db` is the already-opened relational database; it backs the stores
/// whenever the document backend is absent or fails to open.
pub async fn select_stores(config: &DatabaseConfig, db: &Database) -> (Stores, BackendSelection) {
    if let Some(path) = &config.document_path {
        match DocDatabase::open(path).await {
            Ok(doc) => {
                info!("Document store active at {path}");
                return (document_stores(doc), BackendSelection::DocumentPreferred);
            }
            Err(e) => {
                warn!("Document store at {path} unavailable ({e}); using relational store");
            }
        }
    }

    (relational_stores(db), BackendSelection::RelationalOnly)
}

/// Stores over the relational backend.
pub fn relational_stores(db: &Database) -> Stores {
    Stores {
        users: Arc::new(RelationalUserStore::new(db)),
        boards: Arc::new(RelationalBoardStore::new(db)),
        lists: Arc::new(RelationalListStore::new(db)),
        cards: Arc::new(RelationalCardStore::new(db)),
        id_kind: IdKind::Int,
    }
}

/// Stores over the document backend.
pub fn document_stores(doc: DocDatabase) -> Stores {
    Stores {
        users: Arc::new(DocumentUserStore::new(doc.clone())),
        boards: Arc::new(DocumentBoardStore::new(doc.clone())),
        lists: Arc::new(DocumentListStore::new(doc.clone())),
        cards: Arc::new(DocumentCardStore::new(doc)),
        id_kind: IdKind::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_document_path_selects_relational() {
        let db = Database::open_in_memory().await.unwrap();
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            document_path: None,
        };
        let (stores, selection) = select_stores(&config, &db).await;
        assert_eq!(selection, BackendSelection::RelationalOnly);
        assert_eq!(stores.id_kind, IdKind::Int);
    }

    #[tokio::test]
    async fn test_document_path_selects_document() {
        let db = Database::open_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.sqlite");
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            document_path: Some(path.to_string_lossy().into_owned()),
        };
        let (stores, selection) = select_stores(&config, &db).await;
        assert_eq!(selection, BackendSelection::DocumentPreferred);
        assert_eq!(stores.id_kind, IdKind::Text);
    }

    #[tokio::test]
    async fn test_unopenable_document_path_falls_back() {
        let db = Database::open_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        // A directory is not a valid database file.
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            document_path: Some(dir.path().to_string_lossy().into_owned()),
        };
        let (stores, selection) = select_stores(&config, &db).await;
        assert_eq!(selection, BackendSelection::RelationalOnly);
        assert_eq!(stores.id_kind, IdKind::Int);
    }
}
