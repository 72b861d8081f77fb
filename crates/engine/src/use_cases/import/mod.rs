//! Content import: turn pasted rules text into linked library documents.
//!
//! The flow is prompt -> model -> validate -> compile -> write -> link. Each
//! content domain supplies its own prompt, validator, and compiler under
//! [`strategies`]; everything else is shared.

pub mod dedupe;
pub mod error;
pub mod features;
pub mod json_fields;
pub mod linker;
pub mod persist;
pub mod pipeline;
pub mod safety_net;
pub mod strategies;
pub mod text;

pub use error::ImportError;
pub use linker::{LinkIndex, LinkReport, Linker, MatchTier};
pub use persist::{DocumentWriter, WritePolicy, Written};
pub use pipeline::{ImportOutcome, ImportPipeline, ImportRequest, ImportSource, ImportStage};
pub use strategies::CompileContext;
