use std::path::PathBuf;

use anyhow::{Context, Result};
use ktest_core::config::ToolConfig;
use ktest_core::services::orchestrator::UnitStatus;
use ktest_core::services::pipeline::{self, RunReport};

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Default, Clone)]
pub struct RunOverrides {
    pub engine: Option<PathBuf>,
    pub timeout_secs: Option<f64>,
    pub output: Option<PathBuf>,
    pub max_version: Option<i32>,
    pub func_name: Option<String>,
    pub src_file: Option<String>,
    pub description: Option<String>,
}

impl RunOverrides {
    pub fn apply(self, mut config: ToolConfig) -> Result<ToolConfig> {
        if let Some(engine) = self.engine {
            config.engine = engine;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
            config.validate().with_context(|| format!("Invalid --timeout-secs {secs}"))?;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(max_version) = self.max_version {
            config.max_version = max_version;
        }
        if let Some(func_name) = self.func_name {
            config.suite.func_name = func_name;
        }
        if let Some(src_file) = self.src_file {
            config.suite.src_file = src_file;
        }
        if let Some(description) = self.description {
            config.suite.description = description;
        }
        Ok(config)
    }
}

/// Run the engine over the IR files and write the test suite.
pub fn run_command(config: &ToolConfig, inputs: &[PathBuf], json: bool) -> Result<RunReport> {
    let report = pipeline::run(config, inputs).context("Test suite generation failed")?;

    if json {
        let serialized =
            serde_json::to_string_pretty(&report).context("Failed to serialize run report")?;
        println!("{}", serialized);
    } else {
        print_summary(&report);
    }
    Ok(report)
}

fn print_summary(report: &RunReport) {
    println!("Engine runs ({}):", report.units.len());
    if report.units.is_empty() {
        println!("  (none)");
    }
    for unit in &report.units {
        let status = match &unit.status {
            UnitStatus::Completed { .. } => {
                format!("completed, {} record(s)", unit.record_files.len())
            }
            UnitStatus::TimedOut => "timed out".to_string(),
            UnitStatus::Failed { reason } => format!("failed: {reason}"),
        };
        println!("  - {} [{}] {} ms", unit.unit.display(), status, unit.elapsed_ms);
    }
    for skipped in &report.skipped_inputs {
        println!("  - {} [skipped: {:?}]", skipped.path.display(), skipped.reason);
    }
    println!("Records: {} found, {} decoded", report.records_found, report.records_decoded);
    for failure in &report.decode_failures {
        println!("  - {}: {}", failure.path.display(), failure.error);
    }
    println!("Duplicates removed: {}", report.duplicates_removed);
    println!("Test cases: {}", report.test_cases);
    println!("Output: {}", report.output.display());
}
