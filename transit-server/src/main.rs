use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use transit_server::catalogue::Catalogue;
use transit_server::dataset::{self, DatasetError};
use transit_server::routing::{Planner, PlannerError};
use transit_server::snapshot::{self, SnapshotError};
use transit_server::stats::{self, StatDocument};
use transit_server::web::{AppState, create_router};

/// Transit catalogue and itinerary routing server.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a network document, build the routing tables, and write a
    /// snapshot.
    Build {
        /// JSON network document to load.
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the snapshot.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Answer a stat-request document and print the responses.
    Query {
        /// Snapshot produced by `build`.
        #[arg(short, long, conflicts_with = "input")]
        snapshot: Option<PathBuf>,

        /// Network document to build from instead of a snapshot.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Stat-request document; read from stdin when omitted.
        #[arg(short, long)]
        requests: Option<PathBuf>,
    },

    /// Serve the HTTP API.
    Serve {
        /// Snapshot produced by `build`.
        #[arg(short, long, conflicts_with = "input")]
        snapshot: Option<PathBuf>,

        /// Network document to build from instead of a snapshot.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Address to listen on.
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("failed to prepare routing tables: {0}")]
    Planner(#[from] PlannerError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed stat-request document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("pass exactly one of --snapshot or --input")]
    MissingSource,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries query output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Build { input, output } => {
            let (catalogue, planner) = build_from_document(&input)?;
            snapshot::save(&output, &catalogue, &planner)?;
            Ok(())
        }
        Command::Query {
            snapshot,
            input,
            requests,
        } => {
            let (catalogue, planner) = load_state(snapshot.as_deref(), input.as_deref())?;
            let json = match &requests {
                Some(path) => {
                    std::fs::read_to_string(path).map_err(|source| CliError::Io {
                        path: path.display().to_string(),
                        source,
                    })?
                }
                None => {
                    let mut buffer = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buffer)
                        .map_err(|source| CliError::Io {
                            path: "<stdin>".to_string(),
                            source,
                        })?;
                    buffer
                }
            };
            let document: StatDocument = serde_json::from_str(&json)?;
            let responses = stats::process_document(&catalogue, &planner, &document);
            println!("{}", serde_json::to_string_pretty(&responses)?);
            Ok(())
        }
        Command::Serve {
            snapshot,
            input,
            addr,
        } => {
            let (catalogue, planner) = load_state(snapshot.as_deref(), input.as_deref())?;
            let app = create_router(AppState::new(catalogue, planner));

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|source| CliError::Bind { addr, source })?;
            info!(%addr, "listening");
            axum::serve(listener, app).await.map_err(CliError::Serve)?;
            Ok(())
        }
    }
}

fn build_from_document(path: &Path) -> Result<(Catalogue, Planner), CliError> {
    let data = dataset::load_path(path)?;
    let planner = Planner::new(&data.catalogue, data.settings)?;
    Ok((data.catalogue, planner))
}

fn load_state(
    snapshot_path: Option<&Path>,
    input: Option<&Path>,
) -> Result<(Catalogue, Planner), CliError> {
    match (snapshot_path, input) {
        (Some(path), None) => Ok(snapshot::load(path)?),
        (None, Some(path)) => build_from_document(path),
        _ => Err(CliError::MissingSource),
    }
}
