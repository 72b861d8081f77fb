//! Writes compiled documents to the library.
//!
//! Each domain keeps its own write policy: species upsert by name, subclass
//! features reuse what already exists, everything else creates fresh.

use std::sync::Arc;

use chronicle_domain::{DocumentRef, DocumentSpec, DomainKind, FolderId};

use super::error::ImportError;
use crate::infrastructure::ports::{DocumentLibraryPort, IndexEntry};

/// How a document meets an existing one with the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePolicy {
    /// Always a new document.
    Create,
    /// Replace the body of the exact-name match, else create.
    Upsert,
    /// Leave the exact-name match untouched and use its reference, else create.
    ReuseExisting,
}

impl WritePolicy {
    pub fn auxiliary(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Species => Self::Upsert,
            DomainKind::Subclass => Self::ReuseExisting,
            _ => Self::Create,
        }
    }

    pub fn primary(kind: DomainKind) -> Self {
        match kind {
            DomainKind::Species => Self::Upsert,
            _ => Self::Create,
        }
    }
}

/// Where a single write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub reference: DocumentRef,
    /// Folder a newly created document was filed in; `None` at the root or when nothing was created.
    pub folder: Option<String>,
}

pub struct DocumentWriter {
    library: Arc<dyn DocumentLibraryPort>,
}

impl DocumentWriter {
    pub fn new(library: Arc<dyn DocumentLibraryPort>) -> Self {
        Self { library }
    }

    /// Write `documents` in order and return the name and reference of each.
    pub async fn write_all(
        &self,
        collection: &str,
        documents: Vec<DocumentSpec>,
        policy: WritePolicy,
    ) -> Result<Vec<IndexEntry>, ImportError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let index = self.index_for(collection, policy).await?;

        let mut written = Vec::with_capacity(documents.len());
        for document in documents {
            let name = document.name.clone();
            let result = self.write_one(collection, document, policy, &index).await?;
            written.push(IndexEntry::new(name, result.reference));
        }
        Ok(written)
    }

    /// Write a single document under `policy`.
    pub async fn write(
        &self,
        collection: &str,
        document: DocumentSpec,
        policy: WritePolicy,
    ) -> Result<Written, ImportError> {
        let index = self.index_for(collection, policy).await?;
        self.write_one(collection, document, policy, &index).await
    }

    async fn index_for(
        &self,
        collection: &str,
        policy: WritePolicy,
    ) -> Result<Vec<IndexEntry>, ImportError> {
        Ok(match policy {
            WritePolicy::Create => Vec::new(),
            WritePolicy::Upsert | WritePolicy::ReuseExisting => {
                self.library.list_index(collection).await?
            }
        })
    }

    async fn write_one(
        &self,
        collection: &str,
        document: DocumentSpec,
        policy: WritePolicy,
        index: &[IndexEntry],
    ) -> Result<Written, ImportError> {
        let existing = index
            .iter()
            .find(|e| e.name == document.name)
            .map(|e| e.reference.clone());

        match (policy, existing) {
            (WritePolicy::Upsert, Some(reference)) => {
                tracing::debug!(name = %document.name, reference = %reference, "Updating existing document");
                let reference = self.library.update_document(&reference, document).await?;
                Ok(Written {
                    reference,
                    folder: None,
                })
            }
            (WritePolicy::ReuseExisting, Some(reference)) => {
                tracing::debug!(name = %document.name, reference = %reference, "Reusing existing document");
                Ok(Written {
                    reference,
                    folder: None,
                })
            }
            _ => {
                let folder = self.folder_for(collection, &document).await;
                let folder_name = folder.as_ref().and(document.folder.clone());
                let name = document.name.clone();
                let reference = self
                    .library
                    .create_document(collection, document, folder)
                    .await?;
                tracing::debug!(name = %name, reference = %reference, "Created document");
                Ok(Written {
                    reference,
                    folder: folder_name,
                })
            }
        }
    }

    /// Folder named by the document; the root when unnamed or on failure.
    async fn folder_for(&self, collection: &str, document: &DocumentSpec) -> Option<FolderId> {
        let name = document.folder.as_deref()?;
        match self.library.ensure_folder(collection, name, None).await {
            Ok(folder) => Some(folder),
            Err(e) => {
                tracing::warn!(
                    collection,
                    folder = name,
                    error = %e,
                    "Could not prepare folder, filing at the root"
                );
                None
            }
        }
    }
}
