use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::analysis::Analyzer;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "codepaint")]
#[command(about = "Codepaint - inline variable bindings and highlight taken branches", long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default search)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the source with bindings inlined and dead assignments removed
    Simplify {
        /// Source file, or `-` for stdin
        input: String,
    },

    /// Highlight the branches of already simplified source
    Paint {
        /// Source file, or `-` for stdin
        input: String,

        /// Comma-separated parameter values, e.g. "1,2,3" or "[8,9,10],1"
        #[arg(short = 'p', long = "params", default_value = "")]
        params: String,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },

    /// Simplify and then paint in one step
    Analyze {
        /// Source file, or `-` for stdin
        input: String,

        /// Comma-separated parameter values, e.g. "1,2,3" or "[8,9,10],1"
        #[arg(short = 'p', long = "params", default_value = "")]
        params: String,

        #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// HTML fragment, one paragraph per line
    Html,
    /// JSON document with the classified line numbers
    Json,
}

/// Run the CLI by parsing process arguments
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    run_cli_with_args(cli)
}

/// Run the CLI with provided arguments
pub fn run_cli_from_args(args: Vec<String>) -> Result<()> {
    let cli = Cli::parse_from(args);
    run_cli_with_args(cli)
}

fn run_cli_with_args(cli: Cli) -> Result<()> {
    // Config errors are reported before any command output
    let config = Config::builder().config_path(cli.config).build()?;
    init_logging(&config);

    let analyzer = Analyzer::from_config(&config);

    match cli.command {
        Commands::Simplify { input } => {
            let source = read_input(&input)?;
            println!("{}", analyzer.simplify(&source)?);
        }

        Commands::Paint {
            input,
            params,
            format,
        } => {
            let source = read_input(&input)?;
            let painting = analyzer.paint(&source, &params)?;
            match format {
                OutputFormat::Html => println!("{}", painting.html),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&painting)?),
            }
        }

        Commands::Analyze {
            input,
            params,
            format,
        } => {
            let source = read_input(&input)?;
            let report = analyzer.analyze(&source, &params)?;
            match format {
                OutputFormat::Html => println!("{}", report.html),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the configured filter
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read source from stdin")?;
        Ok(source)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}
