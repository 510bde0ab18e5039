use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ToolConfig;
use crate::services::engines::SymbolicEngine;
use crate::services::orchestrator::EngineError;

/// KLEE invoked as `klee <args...> -output-dir=<dir> <unit>`.
#[derive(Debug, Clone)]
pub struct KleeEngine {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

impl KleeEngine {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self { executable: executable.into(), args: Vec::new() }
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self { executable: config.engine.clone(), args: config.engine_args.clone() }
    }
}

impl SymbolicEngine for KleeEngine {
    fn name(&self) -> &'static str {
        "klee"
    }

    fn locate(&self) -> Result<PathBuf, EngineError> {
        which::which(&self.executable).map_err(|e| EngineError::MissingExecutable {
            engine: self.executable.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn command(&self, executable: &Path, unit: &Path, output_dir: &Path) -> Command {
        let mut output_flag = OsString::from("-output-dir=");
        output_flag.push(output_dir);

        let mut cmd = Command::new(executable);
        cmd.args(&self.args).arg(output_flag).arg(unit);
        cmd
    }
}
