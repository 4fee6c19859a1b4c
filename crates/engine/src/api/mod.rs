//! API layer - user-facing entry points.

pub mod console;

pub use console::Console;
