use std::path::Path;

use anyhow::{Context, Result};

use crate::commands::load_record;

/// Write the named objects of a record file to `<file>.<name>`.
pub fn extract_command(
    file: &Path,
    objects: &[String],
    trim_zeros: bool,
    max_version: i32,
) -> Result<()> {
    let record = load_record(file, max_version)?;
    let written = record
        .extract(objects, trim_zeros)
        .with_context(|| format!("Failed to extract objects from {}", file.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}
