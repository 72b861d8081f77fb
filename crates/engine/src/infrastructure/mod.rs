//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod config;
pub mod memory_library;
pub mod ollama;
pub mod ports;
pub mod resilient_llm;
pub mod web_fetch;
