//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - LLM calls (could swap Ollama -> another local server)
//! - Document storage (could swap the in-memory library -> a VTT bridge)
//! - Source page fetching

mod error;
mod external;
mod library;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ContentFetchPort, LlmPort, LlmRequest, LlmResponse, ResponseFormat};

// =============================================================================
// Library Port
// =============================================================================
pub use library::{DocumentLibraryPort, IndexEntry};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{MockContentFetchPort, MockLlmPort};

#[cfg(test)]
pub use library::MockDocumentLibraryPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{FetchError, LibraryError, LlmError};
