//! Assembling decoded records into a test suite and persisting it.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::ktest::KTest;
use crate::model::{InputVar, SuiteMetadata, TestCase, TestSuite};
use crate::values::interpret_object;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("failed to serialize test suite: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write test suite to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Map each record, in order, to a test case labelled with its position.
pub fn assemble(records: &[KTest], metadata: &SuiteMetadata) -> TestSuite {
    let test_cases = records
        .iter()
        .enumerate()
        .map(|(ordinal, record)| {
            let inputs =
                record.objects().iter().map(|o| InputVar::from(&interpret_object(o))).collect();
            TestCase::new(inputs, ordinal)
        })
        .collect();
    TestSuite::new(metadata, test_cases)
}

/// Write the suite as pretty JSON, replacing `path` atomically.
///
/// The document is written to a temporary file in the destination directory
/// and renamed into place, so a failed write never leaves a truncated file
/// under the final name.
pub fn write_suite(path: &Path, suite: &TestSuite) -> Result<(), SuiteError> {
    let body = serde_json::to_string_pretty(suite)?;
    let persist_err = |source| SuiteError::Persist { path: path.to_path_buf(), source };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
    tmp.write_all(body.as_bytes()).map_err(persist_err)?;
    tmp.write_all(b"\n").map_err(persist_err)?;
    tmp.as_file().sync_all().map_err(persist_err)?;
    tmp.persist(path).map_err(|e| persist_err(e.error))?;
    Ok(())
}
