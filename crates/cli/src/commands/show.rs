use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ktest_core::dedup::fingerprint;
use ktest_core::ktest::KTest;
use ktest_core::model::InputVar;
use ktest_core::values::interpret_object;
use serde::Serialize;

/// JSON view of one record file.
#[derive(Debug, Serialize)]
pub struct RecordSnapshot {
    pub file: PathBuf,
    pub version: i32,
    pub args: Vec<String>,
    pub sym_argvs: i32,
    pub sym_argv_len: i32,
    pub fingerprint: String,
    pub inputs: Vec<InputVar>,
}

impl RecordSnapshot {
    pub fn new(path: &Path, record: &KTest) -> Self {
        Self {
            file: path.to_path_buf(),
            version: record.version(),
            args: record.args().to_vec(),
            sym_argvs: record.sym_argvs(),
            sym_argv_len: record.sym_argv_len(),
            fingerprint: fingerprint(record),
            inputs: record
                .objects()
                .iter()
                .map(|o| InputVar::from(&interpret_object(o)))
                .collect(),
        }
    }
}

/// Decode one record file with context attached to the error.
pub fn load_record(path: &Path, max_version: i32) -> Result<KTest> {
    KTest::from_file_with_limit(path, max_version)
        .with_context(|| format!("Failed to decode KTest file {}", path.display()))
}

/// Print record files in the inspection-tool layout, or as typed JSON.
pub fn show_command(
    files: &[PathBuf],
    trim_zeros: bool,
    json: bool,
    max_version: i32,
) -> Result<()> {
    let mut snapshots = Vec::new();
    for (i, path) in files.iter().enumerate() {
        let record = load_record(path, max_version)?;
        if json {
            snapshots.push(RecordSnapshot::new(path, &record));
        } else {
            if i > 0 {
                println!();
            }
            print!("{}", record.describe(trim_zeros));
        }
    }

    if json {
        let serialized =
            serde_json::to_string_pretty(&snapshots).context("Failed to serialize records")?;
        println!("{}", serialized);
    }
    Ok(())
}
