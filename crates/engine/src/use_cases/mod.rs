//! Use cases - User story orchestration.

pub mod import;

pub use import::{ImportError, ImportOutcome, ImportPipeline, ImportRequest};
