//! ktest-core
//!
//! Core library for turning symbolic-execution output into test suites.
//!
//! This crate holds the KTest record decoder, the heuristic value typing of
//! object payloads, content-hash de-duplication, the engine orchestrator and
//! the test-suite assembler.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends; the CLI is a thin wrapper.

pub mod config;
pub mod dedup;
pub mod ktest;
pub mod model;
pub mod services;
pub mod suite;
pub mod values;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
