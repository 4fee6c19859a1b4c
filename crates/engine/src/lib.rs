//! Questline Engine library.
//!
//! Runs interactive-narrative sessions over a story graph.
//!
//! ## Structure
//!
//! - `use_cases/` - Session, endings and summary orchestration
//! - `stores/` - In-memory per-user session state
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - Console entry point
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Shared stories and wiring for tests.
#[cfg(test)]
pub mod test_fixtures;

/// Scenario tests across use cases and adapters.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
pub use config::EngineConfig;
