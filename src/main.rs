use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use pg_autodoc::render::Locale;
use pg_autodoc::{document_database, lint, DocumentOptions, OutputFormat};

#[derive(Parser)]
#[command(name = "pg-autodoc")]
#[command(author, version, about = "Documentation generator for PostgreSQL catalogs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate documentation from a catalog snapshot
    Document {
        /// Path to the catalog snapshot JSON
        #[arg(short, long)]
        catalog: PathBuf,

        /// Path to the config JSON (filters, layers, services)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output file prefix (defaults to the database name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (html, docbook, plain)
        #[arg(short, long, default_value = "html")]
        format: OutputFormat,

        /// Language of generated phrases (en, ru)
        #[arg(short, long, default_value = "en")]
        locale: Locale,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
    /// Report every broken annotation in a catalog snapshot
    Lint {
        /// Path to the catalog snapshot JSON
        #[arg(short, long)]
        catalog: PathBuf,

        /// Path to the config JSON (filters, layers, services)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// RUST_LOG wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Document {
            catalog,
            config,
            output,
            format,
            locale,
            verbose,
        } => {
            init_logging(verbose);
            let options = DocumentOptions {
                catalog_path: catalog,
                config_path: config,
                output_prefix: output,
                format,
                locale,
            };

            let path = document_database(options)?;
            println!("Wrote {}", path.display());
        }
        Commands::Lint {
            catalog,
            config,
            verbose,
        } => {
            init_logging(verbose);
            let issues = lint(&catalog, config.as_deref())?;
            for issue in &issues {
                println!("{}", issue);
            }
            if !issues.is_empty() {
                bail!("{} broken annotations", issues.len());
            }
        }
    }

    Ok(())
}
