//! Contour CLI - validate, cast and describe data against schema documents

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::Format;
use colored::Colorize;
use contour::error::format_validation_error;
use contour::{CastOptions, Error, Schema, SchemaDocument, SchemaType, ValidateOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "contour")]
#[command(about = "Cast and validate structured data against declarative schemas", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate data files against a schema
    Validate {
        /// Schema document (JSON, YAML or TOML)
        #[arg(short, long)]
        schema: PathBuf,

        /// Data files to validate
        #[arg(required = true)]
        data: Vec<PathBuf>,

        /// Report every failure instead of stopping at the first
        #[arg(long)]
        all_errors: bool,

        /// Check values as given, without casting
        #[arg(long)]
        strict: bool,

        /// Drop keys the schema does not declare
        #[arg(long)]
        strip_unknown: bool,
    },

    /// Cast a data file and print the result
    Cast {
        #[arg(short, long)]
        schema: PathBuf,

        data: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        format: Format,
    },

    /// Print the schema description as JSON
    Describe {
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("CONTOUR_LOG").unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate {
            schema,
            data,
            all_errors,
            strict,
            strip_unknown,
        } => {
            let schema = load_schema(&schema)?;
            let options = ValidateOptions {
                strict: strict.then_some(true),
                abort_early: Some(!all_errors),
                strip_unknown,
                ..Default::default()
            };

            let mut failures = 0;
            for path in &data {
                let value = cli::load_value(path)?;
                match schema.validate_sync_with(value, options.clone()) {
                    Ok(_) => cli::success(&path.display().to_string()),
                    Err(Error::Validation(e)) => {
                        failures += 1;
                        cli::error(&path.display().to_string());
                        eprint!("{}", format_validation_error(&e));
                    }
                    Err(e) => return Err(e).with_context(|| format!("Failed to validate {}", path.display())),
                }
            }

            if failures > 0 {
                eprintln!(
                    "\n{} {} of {} file(s) failed validation",
                    "✗".red().bold(),
                    failures,
                    data.len()
                );
                std::process::exit(1);
            }
        }

        Commands::Cast { schema, data, format } => {
            let schema = load_schema(&schema)?;
            let value = cli::load_value(&data)?;
            match schema.cast_with(value, &CastOptions::default()) {
                Ok(cast) => println!("{}", cli::render(&cast, format)?),
                Err(e) => {
                    cli::error(&e.to_string());
                    std::process::exit(1);
                }
            }
        }

        Commands::Describe { schema } => {
            let schema = load_schema(&schema)?;
            println!("{}", serde_json::to_string_pretty(&schema.describe())?);
        }
    }

    Ok(())
}

fn load_schema(path: &Path) -> Result<Schema> {
    let document = SchemaDocument::from_path(path)?;
    document
        .build()
        .with_context(|| format!("Invalid schema document: {}", path.display()))
}
