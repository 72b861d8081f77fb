//! Document library port.

use async_trait::async_trait;
use chronicle_domain::{DocumentRef, DocumentSpec, FolderId};

use super::error::LibraryError;

/// Name and reference of a stored document, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: String,
    pub reference: DocumentRef,
}

impl IndexEntry {
    pub fn new(name: impl Into<String>, reference: DocumentRef) -> Self {
        Self {
            name: name.into(),
            reference,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentLibraryPort: Send + Sync {
    /// Store a new document and return its stable reference.
    async fn create_document(
        &self,
        collection: &str,
        document: DocumentSpec,
        folder: Option<FolderId>,
    ) -> Result<DocumentRef, LibraryError>;

    /// Replace an existing document's body; the reference is unchanged.
    async fn update_document(
        &self,
        reference: &DocumentRef,
        document: DocumentSpec,
    ) -> Result<DocumentRef, LibraryError>;

    async fn list_index(&self, collection: &str) -> Result<Vec<IndexEntry>, LibraryError>;

    /// Find a folder by name (case-insensitive) under `parent`, creating it if absent.
    async fn ensure_folder(
        &self,
        collection: &str,
        name: &str,
        parent: Option<FolderId>,
    ) -> Result<FolderId, LibraryError>;
}
