use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ktest_suite::commands::{
    extract_command, fingerprint_command, run_command, show_command, RunOverrides,
};
use ktest_suite::{init_logging, load_tool_config};

/// Symbolic-execution test-suite generator CLI.
///
/// This CLI is a thin wrapper around `ktest-core` (exposed in code as `ktest_core`).
/// All substantive logic lives in the library so it can be tested thoroughly
/// and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "ktest-suite",
    version,
    about = "Generate de-duplicated test suites from KLEE runs",
    long_about = None
)]
struct Cli {
    /// Log engine command lines and per-file details.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, default_value_t = false, conflicts_with = "verbose")]
    quiet: bool,

    /// Optional JSON or YAML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the engine over LLVM IR files and write the test-suite document.
    ///
    /// Each IR file is analyzed in its own `klee-out-<n>` directory next to it;
    /// those directories are removed once the generated cases are collected.
    Run {
        /// LLVM IR (`.ll`) files to analyze. Other paths are reported and skipped.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Engine executable (overrides config and `KLEE_BIN`).
        #[arg(long)]
        engine: Option<PathBuf>,

        /// Per-file engine timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<f64>,

        /// Where to write the test-suite document.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Highest KTest format version to accept.
        #[arg(long)]
        max_version: Option<i32>,

        /// Function name recorded in the suite.
        #[arg(long)]
        func_name: Option<String>,

        /// Source file recorded in the suite.
        #[arg(long)]
        src_file: Option<String>,

        /// Suite description.
        #[arg(long)]
        description: Option<String>,

        /// Emit the run report as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Print the contents of KTest files.
    Show {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Trim trailing zero bytes from data, hex and text views.
        #[arg(long, default_value_t = false)]
        trim_zeros: bool,

        /// Emit typed inputs as JSON instead of the raw dump.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Write selected objects of a KTest file to `<file>.<object>`.
    Extract {
        file: PathBuf,

        /// Object name to extract (repeatable).
        #[arg(long = "object", required = true)]
        objects: Vec<String>,

        /// Trim trailing zero bytes before writing.
        #[arg(long, default_value_t = false)]
        trim_zeros: bool,
    },

    /// Print the de-duplication fingerprint of KTest files.
    Fingerprint {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    let config = load_tool_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run {
            inputs,
            engine,
            timeout_secs,
            output,
            max_version,
            func_name,
            src_file,
            description,
            json,
        } => {
            let overrides = RunOverrides {
                engine,
                timeout_secs,
                output,
                max_version,
                func_name,
                src_file,
                description,
            };
            let config = overrides.apply(config)?;
            run_command(&config, &inputs, json)?;
        }
        Command::Show { files, trim_zeros, json } => {
            show_command(&files, trim_zeros, json, config.max_version)?
        }
        Command::Extract { file, objects, trim_zeros } => {
            extract_command(&file, &objects, trim_zeros, config.max_version)?
        }
        Command::Fingerprint { files } => fingerprint_command(&files, config.max_version)?,
    }

    Ok(())
}
