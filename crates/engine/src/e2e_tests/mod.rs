//! Scenario tests.
//!
//! These tests drive complete play-throughs through `App`, with real
//! adapters where they are cheap (in-memory and JSON-file endings stores).
//!
//! ```bash
//! cargo test -p questline-engine --lib e2e_tests
//! ```
