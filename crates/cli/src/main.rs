//! Resource planning CLI
//!
//! A command-line tool for converting planning messages between JSON and
//! the wire format, inspecting raw bytes, validating content and checking
//! schema compatibility in CI.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{codec, schema};
use planning_lib::{DecodeMode, Framing, MessageKind};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, Settings};
use crate::output::OutputFormat;

/// Resource planning CLI
#[derive(Parser)]
#[command(name = "plnctl")]
#[command(author, version, about = "CLI for resource planning messages", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/plnctl/config.toml)
    #[arg(long, global = true, env = "PLNCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// How fields with an unexpected wire type are handled (lenient, strict)
    #[arg(long, global = true)]
    pub decode_mode: Option<DecodeMode>,

    /// Message framing on the wire (delimited, bare)
    #[arg(long, global = true)]
    pub framing: Option<Framing>,

    /// Log output format
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a JSON message to the wire format
    Encode {
        /// Message kind (e.g. pod-planning, controller-planning)
        #[arg(long, short)]
        kind: MessageKind,

        /// JSON input file (stdin if omitted or `-`)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write hex text instead of raw bytes
        #[arg(long)]
        hex: bool,
    },

    /// Decode wire bytes to JSON or a summary table
    Decode {
        #[arg(long, short)]
        kind: MessageKind,

        /// Wire input file (stdin if omitted or `-`)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Input is hex text
        #[arg(long)]
        hex: bool,

        /// Print codec metrics to stderr after decoding
        #[arg(long)]
        metrics: bool,
    },

    /// Show the field tree of wire bytes, including unknown tags
    Inspect {
        #[arg(long, short)]
        kind: MessageKind,

        #[arg(long, short)]
        input: Option<PathBuf>,

        #[arg(long)]
        hex: bool,
    },

    /// Check a message against producer contracts
    Validate {
        #[arg(long, short)]
        kind: MessageKind,

        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Input is wire bytes rather than JSON
        #[arg(long)]
        wire: bool,

        /// Wire input is hex text
        #[arg(long, requires = "wire")]
        hex: bool,
    },

    /// Schema snapshots and compatibility checks
    #[command(subcommand)]
    Schema(SchemaCommands),
}

#[derive(Subcommand)]
pub enum SchemaCommands {
    /// Write a JSON snapshot of the compiled schema
    Dump {
        /// Output file (stdout if omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Compare the compiled schema with a stored snapshot
    Check {
        /// Snapshot of the previous schema version
        #[arg(long)]
        baseline: PathBuf,
    },
}

fn init_tracing(verbose: bool, log_format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?.with_overrides(
        cli.decode_mode,
        cli.framing,
        cli.format,
        cli.log_format,
    );
    init_tracing(cli.verbose, settings.log_format);

    match cli.command {
        Commands::Encode {
            kind,
            input,
            output,
            hex,
        } => {
            codec::encode(kind, input.as_deref(), output.as_deref(), hex, &settings)?;
        }
        Commands::Decode {
            kind,
            input,
            hex,
            metrics,
        } => {
            codec::decode(kind, input.as_deref(), hex, metrics, &settings)?;
        }
        Commands::Inspect { kind, input, hex } => {
            codec::inspect(kind, input.as_deref(), hex, &settings)?;
        }
        Commands::Validate {
            kind,
            input,
            wire,
            hex,
        } => {
            codec::validate(kind, input.as_deref(), wire, hex, &settings)?;
        }
        Commands::Schema(schema_cmd) => match schema_cmd {
            SchemaCommands::Dump { output } => {
                schema::dump(output.as_deref())?;
            }
            SchemaCommands::Check { baseline } => {
                schema::check(&baseline, settings.format)?;
            }
        },
    }

    Ok(())
}
