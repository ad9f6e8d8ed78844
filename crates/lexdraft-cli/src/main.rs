use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lexdraft_infrastructure::LexdraftPaths;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lexdraft")]
#[command(about = "Lexdraft CLI - offline tools for smart editor documents", long_about = None)]
struct Cli {
    /// Use this directory instead of the platform config directory
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the heading outline of an HTML document
    Outline {
        file: PathBuf,
        /// Emit JSON instead of an indented list
        #[arg(long)]
        json: bool,
    },
    /// Apply a text suggestion to an HTML document
    Apply {
        file: PathBuf,
        /// Text to replace; leave empty to insert
        #[arg(long, default_value = "")]
        original: String,
        #[arg(long)]
        suggested: String,
        /// Plain-text offset used for insertions
        #[arg(long)]
        cursor: Option<usize>,
        /// Write the result back to FILE instead of stdout
        #[arg(long)]
        in_place: bool,
    },
    /// Locate the first occurrence of TEXT in a document's plain text
    Find { file: PathBuf, text: String },
    /// Manage the recent documents log
    Recent {
        #[command(subcommand)]
        action: RecentAction,
    },
}

#[derive(Subcommand)]
enum RecentAction {
    /// List recent documents, most recent first
    List,
    /// Forget all recent documents
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LEXDRAFT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli, &mut std::io::stdout().lock()).await
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let paths = LexdraftPaths::new(cli.config_dir);

    match cli.command {
        Commands::Outline { file, json } => commands::outline::run(&file, json, out)?,
        Commands::Apply {
            file,
            original,
            suggested,
            cursor,
            in_place,
        } => {
            let args = commands::apply::ApplyArgs {
                file,
                original,
                suggested,
                cursor,
                in_place,
            };
            commands::apply::run(&args, out)?;
        }
        Commands::Find { file, text } => commands::find::run(&file, &text, out)?,
        Commands::Recent { action } => match action {
            RecentAction::List => commands::recent::list(&paths, out).await?,
            RecentAction::Clear => commands::recent::clear(&paths, out).await?,
        },
    }

    Ok(())
}
