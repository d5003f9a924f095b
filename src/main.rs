use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use querygen::pagination::{decode_cursor, encode_cursor};
use querygen::project::{parse_project, PROJECT_FILE_NAME};
use querygen::{analyze_project, parse_project_queries, AnalyzeOptions};

#[derive(Parser)]
#[command(name = "querygen")]
#[command(author, version, about = "Type-resolved IR from a live PostgreSQL schema and annotated SQL")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the schema, analyze every query and write the resolved IR as JSON
    Analyze {
        /// Path to the project file
        #[arg(short, long, default_value = PROJECT_FILE_NAME)]
        project: PathBuf,

        /// Output path for the IR (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Connection URL (defaults to the project's database_url_env variable)
        #[arg(short, long)]
        database_url: Option<String>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Parse and check query files without connecting to a database
    Parse {
        /// Path to the project file
        #[arg(short, long, default_value = PROJECT_FILE_NAME)]
        project: PathBuf,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Encode or decode pagination cursors
    Cursor {
        #[command(subcommand)]
        action: CursorAction,
    },
}

#[derive(Subcommand)]
enum CursorAction {
    /// Encode an identifier as a cursor
    Encode { id: String },
    /// Decode a cursor back to its identifier
    Decode { cursor: String },
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("querygen=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Analyze {
            project,
            output,
            database_url,
            verbose,
        } => {
            setup_tracing(verbose);
            if verbose {
                eprintln!("Analyzing project: {}", project.display());
            }

            let ir = analyze_project(AnalyzeOptions {
                project_path: project,
                database_url,
            })
            .await?;

            for skipped in &ir.skipped_tables {
                eprintln!("warning: skipped table {}: {}", skipped.table, skipped.reason);
            }
            for skipped in &ir.skipped_queries {
                eprintln!("warning: skipped query {}: {}", skipped.query, skipped.reason);
            }

            let json = serde_json::to_string_pretty(&ir)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    if verbose {
                        eprintln!(
                            "Wrote {} tables and {} queries to {}",
                            ir.tables.len(),
                            ir.queries.len(),
                            path.display()
                        );
                    }
                }
                None => println!("{}", json),
            }
        }
        Commands::Parse { project, verbose } => {
            setup_tracing(verbose);
            let project = parse_project(&project)?;
            if verbose {
                eprintln!("Found {} query files", project.query_files.len());
            }

            let queries = parse_project_queries(&project)?;
            if verbose {
                eprintln!("Parsed {} queries", queries.len());
            }
            println!("{}", serde_json::to_string_pretty(&queries)?);
        }
        Commands::Cursor { action } => match action {
            CursorAction::Encode { id } => {
                let id = Uuid::parse_str(&id).with_context(|| format!("Invalid UUID: {}", id))?;
                println!("{}", encode_cursor(&id));
            }
            CursorAction::Decode { cursor } => match decode_cursor(&cursor)? {
                Some(id) => println!("{}", id),
                None => println!(),
            },
        },
    }

    Ok(())
}
