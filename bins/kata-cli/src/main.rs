mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kata-cli")]
#[command(about = "Kata CLI - Starter code, example cases, harnesses and runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render starter code for a problem signature
    Starter {
        /// File holding the catalog signature metadata
        #[arg(short, long, conflicts_with = "slug")]
        metadata: Option<PathBuf>,

        /// Look the problem up in the catalog instead
        #[arg(short, long)]
        slug: Option<String>,

        /// typescript, python or java
        #[arg(short, long, default_value = "python")]
        language: String,
    },

    /// Group newline-delimited example cases and print them as JSON
    Cases {
        /// File holding the raw example text
        file: PathBuf,

        /// Number of parameters per case
        #[arg(short, long)]
        arity: usize,

        /// Fail on a trailing partial case instead of dropping it
        #[arg(long, default_value = "false")]
        strict: bool,
    },

    /// Print the harness program built around a solution
    Harness {
        /// Solution source file
        #[arg(long)]
        source: PathBuf,

        /// Signature metadata file
        #[arg(short, long)]
        metadata: PathBuf,

        /// Example cases file
        #[arg(short, long)]
        cases: PathBuf,

        #[arg(short, long, default_value = "python")]
        language: String,
    },

    /// Submit a solution to Judge0 and wait for the result
    Run {
        /// Solution source file
        #[arg(long)]
        source: PathBuf,

        #[arg(short, long, default_value = "python")]
        language: String,

        /// Signature metadata file; the solution then runs inside a harness
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Example cases file
        #[arg(short, long, requires = "metadata")]
        cases: Option<PathBuf>,

        /// File passed to the program on stdin
        #[arg(long)]
        stdin: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Starter {
            metadata,
            slug,
            language,
        } => {
            commands::starter(metadata.as_deref(), slug.as_deref(), &language).await?;
        }
        Commands::Cases {
            file,
            arity,
            strict,
        } => {
            commands::cases(&file, arity, strict)?;
        }
        Commands::Harness {
            source,
            metadata,
            cases,
            language,
        } => {
            commands::harness(&source, &metadata, &cases, &language)?;
        }
        Commands::Run {
            source,
            language,
            metadata,
            cases,
            stdin,
        } => {
            commands::run(
                &source,
                &language,
                metadata.as_deref(),
                cases.as_deref(),
                stdin.as_deref(),
            )
            .await?;
        }
    }

    Ok(())
}
