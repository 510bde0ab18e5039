use std::path::{Path, PathBuf};

/// Naming scheme for the per-unit engine output directories.
///
/// Like the rest of the config module this does no IO; the orchestrator owns
/// creating and removing the directories.
#[derive(Debug, Clone)]
pub struct WorkLayout {
    /// Directory name prefix, e.g. `klee-out`.
    pub prefix: String,
}

impl WorkLayout {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    /// Output directory for the `ordinal`-th unit: `<unit dir>/<prefix>-<ordinal>`.
    pub fn unit_output_dir(&self, unit: &Path, ordinal: usize) -> PathBuf {
        let parent = match unit.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        parent.join(format!("{}-{ordinal}", self.prefix))
    }
}
