pub mod klee;

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::services::orchestrator::EngineError;

pub use klee::KleeEngine;

/// Adapter for a symbolic-execution engine driven by the orchestrator.
pub trait SymbolicEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Resolve the engine executable, failing if it is not installed.
    fn locate(&self) -> Result<PathBuf, EngineError>;

    /// Command that analyzes `unit` and writes its artifacts into `output_dir`.
    fn command(&self, executable: &Path, unit: &Path, output_dir: &Path) -> Command;
}
