//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Endings persistence (could swap JSON files -> embedded DB -> remote store)
//! - LLM calls (could swap Hugging Face -> Ollama -> anything else)

mod error;
mod external;
mod repos;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::EndingsRepo;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockLlmPort;
#[cfg(test)]
pub use repos::MockEndingsRepo;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LlmError, PersistenceError};
