//! cwmp-model: validate, inspect, convert and exercise CWMP data models

use clap::{Args, Parser, Subcommand};
use cwmp_data_model::cli::commands::{apply, convert, inspect, validate};
use cwmp_data_model::cli::CliError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "cwmp-model", version, about = "CWMP / TR-069 data model tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// A schema file, or one of the bundled models
#[derive(Debug, Args)]
struct ModelSource {
    /// BBF DM XML, YAML or JSON schema file (`-` for stdin)
    #[arg(required_unless_present = "builtin")]
    file: Option<PathBuf>,

    /// Use a bundled model instead of a file (tr-181, tr-098)
    #[arg(long, conflicts_with = "file")]
    builtin: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check schema files for structural problems
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print an outline of a model's objects and parameters
    Inspect {
        #[command(flatten)]
        source: ModelSource,

        /// Only show objects under this path template
        #[arg(long)]
        object: Option<String>,
    },

    /// Convert a model between YAML, JSON and BBF DM XML
    Convert {
        #[command(flatten)]
        source: ModelSource,

        #[arg(long, default_value = "yaml")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Apply a SetParameterValues request to a fresh device tree
    Apply {
        #[command(flatten)]
        source: ModelSource,

        /// ParameterList or SOAP envelope
        #[arg(long, short)]
        parameters: PathBuf,

        /// TOML validation config
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Validate { files } => validate::handle_validate(&files),
        Command::Inspect { source, object } => {
            inspect::handle_inspect(source.file.as_ref(), source.builtin.as_deref(), object.as_deref())
        }
        Command::Convert {
            source,
            format,
            output,
        } => convert::handle_convert(
            source.file.as_ref(),
            source.builtin.as_deref(),
            &format,
            output.as_ref(),
        ),
        Command::Apply {
            source,
            parameters,
            config,
        } => apply::handle_apply(
            source.file.as_ref(),
            source.builtin.as_deref(),
            &parameters,
            config.as_ref(),
        ),
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
