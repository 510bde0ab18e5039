pub mod commands;

use std::path::Path;

use anyhow::{Context, Result};
use ktest_core::config::ToolConfig;

/// Install the stderr logger.
///
/// Defaults to `info`; `RUST_LOG` is honored unless `--verbose` or `--quiet`
/// pins the level.
pub fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).format_timestamp(None);
    // Tests may install a logger more than once per process.
    let _ = builder.try_init();
}

/// Load the tool configuration: the given file (or defaults), then `KLEE_BIN`.
pub fn load_tool_config(path: Option<&Path>) -> Result<ToolConfig> {
    let config = match path {
        Some(p) => ToolConfig::load(p)
            .with_context(|| format!("Failed to load config from {}", p.display()))?,
        None => ToolConfig::default(),
    };
    Ok(config.with_env_overrides())
}
