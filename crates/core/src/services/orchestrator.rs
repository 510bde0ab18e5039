//! Sequential engine runs, one input unit at a time.
//!
//! Each unit moves through `Pending -> Running -> {Completed, TimedOut, Failed}`.
//! Output directories are registered with an [`EngineSession`] before the
//! engine is spawned and are removed when the session is dropped, whichever
//! terminal state each unit reached.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;
use wait_timeout::ChildExt;

use crate::config::{ToolConfig, WorkLayout};
use crate::services::engines::SymbolicEngine;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine executable '{engine}' not found: {reason}")]
    MissingExecutable { engine: String, reason: String },
}

/// Terminal state of one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UnitStatus {
    /// The engine exited within the timeout. The exit code is informational.
    Completed { exit_code: Option<i32> },
    /// The engine was killed after the timeout; its records are discarded.
    TimedOut,
    /// The engine could not be run for this unit.
    Failed { reason: String },
}

/// What happened to one input unit.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit: PathBuf,
    pub output_dir: PathBuf,
    pub status: UnitStatus,
    pub elapsed_ms: u128,
    /// Record files registered for decoding; empty unless `Completed`.
    pub record_files: Vec<PathBuf>,
}

/// Output directories owned by a run. Dropping removes all of them.
#[derive(Debug, Default)]
struct OutputDirs {
    dirs: Vec<PathBuf>,
}

impl OutputDirs {
    fn register(&mut self, dir: PathBuf) {
        if !self.dirs.contains(&dir) {
            self.dirs.push(dir);
        }
    }

    fn remove_all(&mut self) {
        for dir in self.dirs.drain(..) {
            match fs::remove_dir_all(&dir) {
                Ok(()) => debug!("removed output dir {}", dir.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove output dir {}: {e}", dir.display()),
            }
        }
    }
}

impl Drop for OutputDirs {
    fn drop(&mut self) {
        self.remove_all();
    }
}

/// Results of running the engine over all units.
///
/// The record files listed in the unit reports stay on disk only while the
/// session is alive; decode them before dropping or closing it.
#[derive(Debug)]
pub struct EngineSession {
    units: Vec<UnitReport>,
    dirs: OutputDirs,
}

impl EngineSession {
    pub fn units(&self) -> &[UnitReport] {
        &self.units
    }

    /// Record files from completed units, in unit order then file-name order.
    pub fn record_files(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().flat_map(|u| u.record_files.iter().map(PathBuf::as_path))
    }

    /// Remove every output directory and hand back the unit reports.
    pub fn close(mut self) -> Vec<UnitReport> {
        self.dirs.remove_all();
        std::mem::take(&mut self.units)
    }
}

/// Drives an engine over input units sequentially with a per-unit timeout.
pub struct Orchestrator<'a> {
    engine: &'a dyn SymbolicEngine,
    layout: WorkLayout,
    timeout: Duration,
    record_extension: String,
}

impl<'a> Orchestrator<'a> {
    pub fn new(engine: &'a dyn SymbolicEngine, config: &ToolConfig) -> Self {
        Self {
            engine,
            layout: WorkLayout::new(&config.output_dir_prefix),
            timeout: config.timeout(),
            record_extension: config.record_extension.clone(),
        }
    }

    /// Run every unit in order.
    ///
    /// Fails up front, before touching the filesystem, if the engine
    /// executable is missing. Per-unit problems (timeouts, spawn failures)
    /// are recorded in the unit's report and do not stop the run.
    pub fn execute(&self, units: &[PathBuf]) -> Result<EngineSession, EngineError> {
        let executable = self.engine.locate()?;
        debug!("using {} at {}", self.engine.name(), executable.display());

        let mut session =
            EngineSession { units: Vec::with_capacity(units.len()), dirs: OutputDirs::default() };
        for (ordinal, unit) in units.iter().enumerate() {
            let output_dir = self.layout.unit_output_dir(unit, ordinal);
            session.dirs.register(output_dir.clone());
            let report = self.run_unit(&executable, unit, output_dir);
            session.units.push(report);
        }
        Ok(session)
    }

    fn run_unit(&self, executable: &Path, unit: &Path, output_dir: PathBuf) -> UnitReport {
        let started = Instant::now();
        let status = match self.spawn_and_wait(executable, unit, &output_dir) {
            Ok(status) => status,
            Err(e) => UnitStatus::Failed { reason: e.to_string() },
        };

        let record_files = match &status {
            UnitStatus::Completed { exit_code } => {
                if *exit_code != Some(0) {
                    debug!(
                        "{} exited with {exit_code:?} for {}",
                        self.engine.name(),
                        unit.display()
                    );
                }
                info!("{} finished: {}", self.engine.name(), unit.display());
                match self.collect_record_files(&output_dir) {
                    Ok(files) => files,
                    Err(e) => {
                        warn!(
                            "no records for {}: cannot read {}: {e}",
                            unit.display(),
                            output_dir.display()
                        );
                        Vec::new()
                    }
                }
            }
            UnitStatus::TimedOut => {
                warn!(
                    "{} timed out after {:?}: {}",
                    self.engine.name(),
                    self.timeout,
                    unit.display()
                );
                Vec::new()
            }
            UnitStatus::Failed { reason } => {
                warn!("{} failed for {}: {reason}", self.engine.name(), unit.display());
                Vec::new()
            }
        };

        UnitReport {
            unit: unit.to_path_buf(),
            output_dir,
            status,
            elapsed_ms: started.elapsed().as_millis(),
            record_files,
        }
    }

    fn spawn_and_wait(
        &self,
        executable: &Path,
        unit: &Path,
        output_dir: &Path,
    ) -> io::Result<UnitStatus> {
        // The engine refuses to reuse an existing output directory.
        if output_dir.exists() {
            fs::remove_dir_all(output_dir)?;
        }

        let mut cmd = self.engine.command(executable, unit, output_dir);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        debug!("spawning {cmd:?}");
        let mut child = cmd.spawn()?;

        match child.wait_timeout(self.timeout) {
            Ok(Some(exit)) => Ok(UnitStatus::Completed { exit_code: exit.code() }),
            Ok(None) => {
                terminate(&mut child);
                Ok(UnitStatus::TimedOut)
            }
            Err(e) => {
                terminate(&mut child);
                Err(e)
            }
        }
    }

    /// Record files directly inside `dir`, sorted by file name.
    fn collect_record_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(self.record_extension.as_str()) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Kill the engine and everything it started, then reap it.
///
/// On unix the engine leads its own process group, so helpers it forked die
/// with it instead of writing into an output directory after cleanup.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: plain syscall on a group id we created; no memory is shared.
        unsafe {
            libc::killpg(pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
