//! In-memory document library with JSON snapshot persistence
//!
//! Stands in for the VTT content library. References follow the
//! `Compendium.<collection>.<Item|Actor>.<id>` shape so they look like the
//! ones the real library issues.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chronicle_domain::{DocumentId, DocumentRef, DocumentSpec, FolderId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{DocumentLibraryPort, IndexEntry, LibraryError};

/// Snapshot format version written to disk.
pub const SNAPSHOT_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub reference: DocumentRef,
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderId>,
    pub document: DocumentSpec,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFolder {
    pub id: FolderId,
    pub collection: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FolderId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub version: String,
    pub exported_at: String,
    pub engine_version: String,
}

/// Complete library contents as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrarySnapshot {
    pub metadata: SnapshotMetadata,
    pub folders: Vec<StoredFolder>,
    pub documents: Vec<StoredDocument>,
}

#[derive(Debug, Default)]
struct LibraryState {
    documents: Vec<StoredDocument>,
    folders: Vec<StoredFolder>,
}

/// In-memory library implementation
#[derive(Clone, Default)]
pub struct MemoryLibrary {
    state: Arc<RwLock<LibraryState>>,
}

impl MemoryLibrary {
    /// Empty library; collections come into being on first write.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document stored under `reference`.
    pub async fn get(&self, reference: &DocumentRef) -> Option<DocumentSpec> {
        let state = self.state.read().await;
        state
            .documents
            .iter()
            .find(|d| &d.reference == reference)
            .map(|d| d.document.clone())
    }

    /// Every document in a collection, in creation order.
    pub async fn documents_in(&self, collection: &str) -> Vec<(DocumentRef, DocumentSpec)> {
        let state = self.state.read().await;
        state
            .documents
            .iter()
            .filter(|d| d.collection == collection)
            .map(|d| (d.reference.clone(), d.document.clone()))
            .collect()
    }

    /// Folder a document is filed under, by folder name.
    pub async fn folder_name_of(&self, reference: &DocumentRef) -> Option<String> {
        let state = self.state.read().await;
        let folder = state
            .documents
            .iter()
            .find(|d| &d.reference == reference)?
            .folder?;
        state
            .folders
            .iter()
            .find(|f| f.id == folder)
            .map(|f| f.name.clone())
    }

    pub async fn folder_count(&self, collection: &str) -> usize {
        let state = self.state.read().await;
        state
            .folders
            .iter()
            .filter(|f| f.collection == collection)
            .count()
    }

    pub async fn snapshot(&self) -> LibrarySnapshot {
        let state = self.state.read().await;
        LibrarySnapshot {
            metadata: SnapshotMetadata {
                version: SNAPSHOT_VERSION.to_string(),
                exported_at: Utc::now().to_rfc3339(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
            },
            folders: state.folders.clone(),
            documents: state.documents.clone(),
        }
    }

    /// Write the library to `path` as pretty JSON.
    pub async fn save_snapshot(&self, path: &Path) -> Result<(), LibraryError> {
        let snapshot = self.snapshot().await;
        let json = serde_json::to_string_pretty(&snapshot).map_err(LibraryError::serialization)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| LibraryError::storage("save_snapshot", e))?;
        tracing::info!(
            path = %path.display(),
            documents = snapshot.documents.len(),
            "Library snapshot saved"
        );
        Ok(())
    }

    /// Load a library from `path`; a missing file yields an empty library.
    pub async fn load_snapshot(path: &Path) -> Result<Self, LibraryError> {
        let library = Self::new();
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No library snapshot found, starting empty");
                return Ok(library);
            }
            Err(e) => return Err(LibraryError::storage("load_snapshot", e)),
        };
        let snapshot: LibrarySnapshot =
            serde_json::from_str(&raw).map_err(LibraryError::serialization)?;
        {
            let mut state = library.state.write().await;
            state.folders = snapshot.folders;
            state.documents = snapshot.documents;
        }
        Ok(library)
    }
}

#[async_trait]
impl DocumentLibraryPort for MemoryLibrary {
    async fn create_document(
        &self,
        collection: &str,
        document: DocumentSpec,
        folder: Option<FolderId>,
    ) -> Result<DocumentRef, LibraryError> {
        let reference = DocumentRef::new(format!(
            "Compendium.{}.{}.{}",
            collection,
            document.doc_type.document_class(),
            DocumentId::new().short_key()
        ));
        let now = Utc::now();

        let mut state = self.state.write().await;
        state.documents.push(StoredDocument {
            reference: reference.clone(),
            collection: collection.to_string(),
            folder,
            document,
            created_at: now,
            updated_at: now,
        });
        Ok(reference)
    }

    async fn update_document(
        &self,
        reference: &DocumentRef,
        document: DocumentSpec,
    ) -> Result<DocumentRef, LibraryError> {
        let mut state = self.state.write().await;
        let stored = state
            .documents
            .iter_mut()
            .find(|d| &d.reference == reference)
            .ok_or_else(|| LibraryError::not_found(reference))?;
        stored.document = document;
        stored.updated_at = Utc::now();
        Ok(reference.clone())
    }

    async fn list_index(&self, collection: &str) -> Result<Vec<IndexEntry>, LibraryError> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .iter()
            .filter(|d| d.collection == collection)
            .map(|d| IndexEntry::new(d.document.name.clone(), d.reference.clone()))
            .collect())
    }

    async fn ensure_folder(
        &self,
        collection: &str,
        name: &str,
        parent: Option<FolderId>,
    ) -> Result<FolderId, LibraryError> {
        let name = name.trim();
        let mut state = self.state.write().await;
        if let Some(existing) = state.folders.iter().find(|f| {
            f.collection == collection
                && f.parent == parent
                && f.name.to_lowercase() == name.to_lowercase()
        }) {
            return Ok(existing.id);
        }

        let id = FolderId::new();
        state.folders.push(StoredFolder {
            id,
            collection: collection.to_string(),
            name: name.to_string(),
            parent,
        });
        tracing::debug!(collection, folder = name, "Created library folder");
        Ok(id)
    }
}
