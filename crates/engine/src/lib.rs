//! Chronicle Keeper engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - the import pipeline and its per-domain strategies
//! - `infrastructure/` - port traits and their adapters (Ollama, library, web)
//! - `app` - application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
