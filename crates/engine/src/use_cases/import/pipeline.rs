//! Import orchestration: source text in, linked library documents out.

use std::sync::Arc;

use chronicle_domain::{DomainKind, ValidatedRecord};
use url::Url;

use super::error::ImportError;
use super::json_fields::parse_model_json;
use super::linker::{LinkIndex, Linker};
use super::persist::{DocumentWriter, WritePolicy};
use super::strategies::{self, CompileContext};
use super::text::clean_source_text;
use crate::infrastructure::config::ImportConfig;
use crate::infrastructure::ports::{
    ContentFetchPort, DocumentLibraryPort, IndexEntry, LlmError, LlmPort, LlmRequest,
};

/// Where the source text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    Text(String),
    Url(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRequest {
    pub kind: DomainKind,
    pub source: ImportSource,
}

impl ImportRequest {
    pub fn text(kind: DomainKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            source: ImportSource::Text(text.into()),
        }
    }

    pub fn url(kind: DomainKind, url: Url) -> Self {
        Self {
            kind,
            source: ImportSource::Url(url),
        }
    }
}

/// Transient progress reported while an import runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Fetching,
    Prompting,
    Parsing,
    Creating,
    Linking,
}

impl ImportStage {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Fetching => "Fetching source page...",
            Self::Prompting => "Asking the model...",
            Self::Parsing => "Reading the model response...",
            Self::Creating => "Creating documents...",
            Self::Linking => "Linking documents...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    pub kind: DomainKind,
    /// Primary document name; `None` for feature batches.
    pub name: Option<String>,
    pub primary: Option<IndexEntry>,
    pub auxiliaries: Vec<IndexEntry>,
    /// Folder the primary was filed under.
    pub folder: Option<String>,
    pub unresolved_references: Vec<String>,
    pub warnings: Vec<String>,
}

impl ImportOutcome {
    /// One-line summary for the person running the import.
    pub fn status_message(&self) -> String {
        let name = self.name.as_deref().unwrap_or_default();
        let mut message = match self.kind {
            DomainKind::Feature => {
                format!("Successfully created {} features.", self.auxiliaries.len())
            }
            DomainKind::Class => format!(
                "Created Class: {name} with {} features!",
                self.auxiliaries.len()
            ),
            DomainKind::Subclass => match &self.folder {
                Some(folder) => format!("Created Subclass: {name} in folder {folder}"),
                None => format!("Created Subclass: {name}"),
            },
            kind => format!("Created {}: {name}", kind.label()),
        };
        if !self.unresolved_references.is_empty() {
            message.push_str(&format!(
                " ({} could not be linked: {})",
                self.unresolved_references.len(),
                self.unresolved_references.join(", ")
            ));
        }
        message
    }
}

pub struct ImportPipeline {
    llm: Arc<dyn LlmPort>,
    library: Arc<dyn DocumentLibraryPort>,
    fetcher: Arc<dyn ContentFetchPort>,
    config: ImportConfig,
}

impl ImportPipeline {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        library: Arc<dyn DocumentLibraryPort>,
        fetcher: Arc<dyn ContentFetchPort>,
        config: ImportConfig,
    ) -> Self {
        Self {
            llm,
            library,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Whether the model server is reachable.
    pub async fn test_connection(&self) -> Result<bool, LlmError> {
        self.llm.check_health().await
    }

    pub async fn run(&self, request: ImportRequest) -> Result<ImportOutcome, ImportError> {
        self.run_with_progress(request, &|_| {}).await
    }

    pub async fn run_with_progress(
        &self,
        request: ImportRequest,
        progress: &(dyn Fn(ImportStage) + Send + Sync),
    ) -> Result<ImportOutcome, ImportError> {
        let kind = request.kind;
        let raw = match request.source {
            ImportSource::Text(text) => text,
            ImportSource::Url(url) => {
                progress(ImportStage::Fetching);
                tracing::info!(%url, "Fetching import source");
                self.fetcher.fetch_text(&url).await?
            }
        };
        let source = clean_source_text(raw.trim());
        if source.is_empty() {
            return Err(ImportError::EmptySource);
        }

        progress(ImportStage::Prompting);
        tracing::info!(%kind, chars = source.len(), model = %self.config.llm.model, "Starting import");
        let prompt = strategies::build_prompt(kind, &source);
        let response = self.llm.generate(LlmRequest::json(prompt)).await?;

        progress(ImportStage::Parsing);
        let data = parse_model_json(&response.content).map_err(|e| {
            tracing::warn!(%kind, error = %e, "Model response is not JSON");
            ImportError::MalformedResponse(e.to_string())
        })?;
        let record = strategies::validate(kind, &data)?;
        let compiled =
            strategies::compile(&record, &CompileContext::new(self.config.ruleset));

        progress(ImportStage::Creating);
        let collections = &self.config.collections;
        let auxiliary_collection = collections.auxiliary_for(kind);
        let writer = DocumentWriter::new(self.library.clone());

        // Read before this run writes anything, so only older documents count as existing
        let existing = match kind {
            DomainKind::Subclass => self.library.list_index(auxiliary_collection).await?,
            _ => Vec::new(),
        };
        let auxiliaries = writer
            .write_all(
                auxiliary_collection,
                compiled.auxiliaries,
                WritePolicy::auxiliary(kind),
            )
            .await?;

        let mut outcome = ImportOutcome {
            kind,
            name: record.name().map(str::to_string),
            primary: None,
            auxiliaries,
            folder: None,
            unresolved_references: Vec::new(),
            warnings: compiled.warnings,
        };

        if let Some(mut primary) = compiled.primary {
            progress(ImportStage::Linking);
            let mut index = LinkIndex::created(outcome.auxiliaries.clone());
            if kind == DomainKind::Subclass {
                index = index.with_existing(existing);
            }
            let report = Linker::default().link(&mut primary, &index);
            outcome.unresolved_references = report.unresolved;

            let name = primary.name.clone();
            let written = writer
                .write(
                    collections.primary_for(kind),
                    primary,
                    WritePolicy::primary(kind),
                )
                .await?;
            outcome.folder = written.folder;
            outcome.primary = Some(IndexEntry::new(name, written.reference));
        }

        log_outcome(&record, &outcome);
        Ok(outcome)
    }
}

fn log_outcome(record: &ValidatedRecord, outcome: &ImportOutcome) {
    tracing::info!(
        kind = %record.kind(),
        name = outcome.name.as_deref().unwrap_or("-"),
        auxiliaries = outcome.auxiliaries.len(),
        unresolved = outcome.unresolved_references.len(),
        warnings = outcome.warnings.len(),
        "Import finished"
    );
}
