use std::path::PathBuf;

use anyhow::Result;
use ktest_core::dedup::fingerprint;

use crate::commands::load_record;

/// Print `<fingerprint>  <file>` per record file, like `sha256sum`.
pub fn fingerprint_command(files: &[PathBuf], max_version: i32) -> Result<()> {
    for path in files {
        let record = load_record(path, max_version)?;
        println!("{}  {}", fingerprint(&record), path.display());
    }
    Ok(())
}
