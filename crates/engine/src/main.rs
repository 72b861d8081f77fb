//! Chronicle Keeper Engine - one-shot import runner.
//!
//! Reads `IMPORT_KIND` and `IMPORT_SOURCE` (a file path or an http(s) URL;
//! stdin when unset), runs one import, and writes the library to
//! `LIBRARY_SNAPSHOT` when that is set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use chronicle_domain::DomainKind;
use chronicle_engine::infrastructure::config::ImportConfig;
use chronicle_engine::infrastructure::memory_library::MemoryLibrary;
use chronicle_engine::use_cases::import::{ImportRequest, ImportStage};
use chronicle_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chronicle_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ImportConfig::from_env();
    let kind: DomainKind = std::env::var("IMPORT_KIND")
        .context("IMPORT_KIND is not set (species, class, subclass, spell, monster, feature)")?
        .parse()?;
    let snapshot = std::env::var("LIBRARY_SNAPSHOT").ok().map(PathBuf::from);

    let library = match &snapshot {
        Some(path) => MemoryLibrary::load_snapshot(path)
            .await
            .with_context(|| format!("loading library snapshot {}", path.display()))?,
        None => MemoryLibrary::new(),
    };
    let app = App::new(config, Arc::new(library));

    match app.pipeline.test_connection().await {
        Ok(true) => tracing::info!(
            base_url = %app.pipeline.config().llm.base_url,
            model = %app.pipeline.config().llm.model,
            "Model server reachable"
        ),
        Ok(false) | Err(_) => tracing::warn!(
            base_url = %app.pipeline.config().llm.base_url,
            "Model server did not answer the health check"
        ),
    }

    let request = read_request(kind).await?;
    let outcome = match app
        .pipeline
        .run_with_progress(request, &|stage: ImportStage| {
            tracing::info!("{}", stage.message())
        })
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "{}", e.user_message());
            return Err(e.into());
        }
    };

    tracing::info!("{}", outcome.status_message());
    for warning in &outcome.warnings {
        tracing::warn!("{warning}");
    }

    if let Some(path) = &snapshot {
        app.library
            .save_snapshot(path)
            .await
            .with_context(|| format!("writing library snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "Library snapshot written");
    }
    Ok(())
}

async fn read_request(kind: DomainKind) -> anyhow::Result<ImportRequest> {
    let Some(source) = std::env::var("IMPORT_SOURCE").ok().filter(|s| !s.trim().is_empty())
    else {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("reading source text from stdin")?;
        return Ok(ImportRequest::text(kind, text));
    };

    if let Ok(url) = Url::parse(&source) {
        if matches!(url.scheme(), "http" | "https") {
            return Ok(ImportRequest::url(kind, url));
        }
    }
    let text = tokio::fs::read_to_string(Path::new(&source))
        .await
        .with_context(|| format!("reading source file {source}"))?;
    Ok(ImportRequest::text(kind, text))
}

fn load_dotenv_from_repo_root() {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
