//! End-to-end generation: engine runs, decoding, dedup, suite output.

use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::config::{ConfigError, ToolConfig};
use crate::dedup::dedup;
use crate::ktest::KTest;
use crate::services::engines::{KleeEngine, SymbolicEngine};
use crate::services::orchestrator::{EngineError, Orchestrator, UnitReport};
use crate::suite::{assemble, write_suite, SuiteError};

/// Errors that abort a whole run. Everything else is recorded in the report.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Suite(#[from] SuiteError),
}

/// Why an input path was not handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    WrongExtension,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// A record file that could not be decoded and was left out.
#[derive(Debug, Clone, Serialize)]
pub struct DecodeFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Summary of one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub finished_at: String,
    pub skipped_inputs: Vec<SkippedInput>,
    pub units: Vec<UnitReport>,
    pub records_found: usize,
    pub records_decoded: usize,
    pub decode_failures: Vec<DecodeFailure>,
    pub duplicates_removed: usize,
    pub test_cases: usize,
    pub output: PathBuf,
}

/// Split inputs into units the engine can take and reported skips.
///
/// A unit must exist and end in `.<ir_extension>`.
pub fn select_units(inputs: &[PathBuf], ir_extension: &str) -> (Vec<PathBuf>, Vec<SkippedInput>) {
    let mut units = Vec::new();
    let mut skipped = Vec::new();
    for path in inputs {
        let reason = if path.extension().and_then(|e| e.to_str()) != Some(ir_extension) {
            warn!("{} is not a .{ir_extension} file, skipping", path.display());
            Some(SkipReason::WrongExtension)
        } else if !path.exists() {
            warn!("{} does not exist, skipping", path.display());
            Some(SkipReason::Missing)
        } else {
            None
        };
        match reason {
            Some(reason) => skipped.push(SkippedInput { path: path.clone(), reason }),
            None => units.push(path.clone()),
        }
    }
    (units, skipped)
}

/// Decode record files, skipping (and reporting) the ones that fail.
pub fn decode_records<'p>(
    files: impl IntoIterator<Item = &'p Path>,
    max_version: i32,
) -> (Vec<KTest>, Vec<DecodeFailure>) {
    let mut records = Vec::new();
    let mut failures = Vec::new();
    for path in files {
        match KTest::from_file_with_limit(path, max_version) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("skipping undecodable record {}: {e}", path.display());
                failures.push(DecodeFailure { path: path.to_path_buf(), error: e.to_string() });
            }
        }
    }
    (records, failures)
}

/// Run the configured KLEE engine over `inputs` and write the test suite.
pub fn run(config: &ToolConfig, inputs: &[PathBuf]) -> Result<RunReport, PipelineError> {
    let engine = KleeEngine::from_config(config);
    run_with_engine(&engine, config, inputs)
}

/// Same as [`run`] with an explicit engine adapter.
///
/// The configuration is validated first. Output directories created for the
/// units are gone by the time this returns, on success and on every error path.
pub fn run_with_engine(
    engine: &dyn SymbolicEngine,
    config: &ToolConfig,
    inputs: &[PathBuf],
) -> Result<RunReport, PipelineError> {
    config.validate()?;
    let started_at = Utc::now().to_rfc3339();
    let (units, skipped_inputs) = select_units(inputs, &config.ir_extension);

    let session = Orchestrator::new(engine, config).execute(&units)?;
    let records_found = session.record_files().count();
    let (records, decode_failures) = decode_records(session.record_files(), config.max_version);
    let units = session.close();

    let records_decoded = records.len();
    let unique = dedup(records);
    let duplicates_removed = records_decoded - unique.len();
    if duplicates_removed > 0 {
        info!("dropped {duplicates_removed} duplicate test case(s)");
    }

    let suite = assemble(&unique, &config.suite);
    write_suite(&config.output, &suite)?;
    info!("wrote {} test case(s) to {}", suite.test_cases.len(), config.output.display());

    Ok(RunReport {
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        skipped_inputs,
        units,
        records_found,
        records_decoded,
        decode_failures,
        duplicates_removed,
        test_cases: suite.test_cases.len(),
        output: config.output.clone(),
    })
}
