//! SVK Registry - read-only artifact registry and query layer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use svk_registry::config::{ConfigError, ConfigLoader, RegistryConfig};
use svk_registry::ipc::{IpcClient, IpcServer};
use svk_registry::query::{Dispatcher, Query};

#[derive(Parser)]
#[command(
    name = "svk-registry",
    about = "Query knowledge, documents, decisions and audits written by SVK producers",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root to query.
    #[arg(short, long, global = true)]
    project_root: Option<PathBuf>,

    /// Knowledge root, if not `<project-root>/knowledge`.
    #[arg(short, long, global = true)]
    knowledge_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show producer states and history count.
    Status,
    /// List knowledge sources, or detail one.
    List {
        /// Source id.
        source: Option<String>,
    },
    /// Read a file from a knowledge source.
    Read {
        /// Source id.
        source: String,
        /// Path within the source. Defaults to the source index.
        path: Option<String>,
    },
    /// List documents, or show those matching a name.
    Doc {
        /// Path or title fragment.
        name: Option<String>,
    },
    /// Show decision records.
    Decisions {
        /// Topic to filter by.
        topic: Option<String>,
    },
    /// Show audit artifacts.
    Audit {
        /// Artifact type (finding, summary, plan, report, any).
        #[arg(short = 't', long = "type")]
        artifact_type: Option<String>,
        /// Subsystem fragment.
        #[arg(short, long)]
        subsystem: Option<String>,
        /// Severity (critical, high, medium, low, info).
        #[arg(long)]
        severity: Option<String>,
        /// Audit run name fragment. Defaults to the latest run.
        #[arg(short, long)]
        audit: Option<String>,
    },
    /// Case-insensitive full-text search.
    Search {
        /// Text to search for.
        query: String,
        /// Scope (docs, decisions, audits, knowledge, all).
        #[arg(short, long)]
        scope: Option<String>,
    },
    /// Print the effective source table.
    Sources,
    /// Serve queries over a Unix socket until interrupted.
    Serve {
        /// Socket path. Defaults to the configured path.
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Send a raw JSON query to a running server.
    Query {
        /// Request, e.g. '{"op": "status"}'.
        json: String,
        /// Socket path. Defaults to the configured path.
        #[arg(long)]
        socket: Option<PathBuf>,
    },
}

impl Commands {
    /// The query this command runs locally, if any.
    fn to_query(&self) -> Option<Query> {
        let query = match self {
            Self::Status => Query::Status,
            Self::List { source } => Query::ListKnowledge {
                source: source.clone(),
            },
            Self::Read { source, path } => Query::ReadKnowledge {
                source: source.clone(),
                path: path.clone(),
            },
            Self::Doc { name } => Query::GetDoc { name: name.clone() },
            Self::Decisions { topic } => Query::GetDecisions {
                topic: topic.clone(),
            },
            Self::Audit {
                artifact_type,
                subsystem,
                severity,
                audit,
            } => Query::GetAudit {
                artifact_type: artifact_type.clone(),
                subsystem: subsystem.clone(),
                severity: severity.clone(),
                audit: audit.clone(),
            },
            Self::Search { query, scope } => Query::Search {
                query: query.clone(),
                scope: scope.clone(),
            },
            Self::Sources | Self::Serve { .. } | Self::Query { .. } => return None,
        };
        Some(query)
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // stdout carries query results
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(cli: &Cli) -> Result<RegistryConfig, ConfigError> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    if let Some(root) = &cli.project_root {
        config.project_root.clone_from(root);
    }
    if let Some(root) = &cli.knowledge_root {
        config.knowledge_root = Some(root.clone());
    }
    Ok(config)
}

/// Print a result as pretty JSON; inline errors set a failing exit code.
fn emit(value: &Value) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    }
    if value.get("error").is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn serve(dispatcher: Dispatcher, socket: PathBuf) -> ExitCode {
    let server = IpcServer::new(&socket);
    let handle = match server.start(Arc::new(dispatcher)) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for interrupt");
    }
    handle.shutdown();
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Commands::Query { json, socket } = &cli.command {
        let socket = socket.clone().unwrap_or(config.ipc.socket_path);
        return match IpcClient::with_path(socket).send_raw(json).await {
            Ok(value) => emit(&value),
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let dispatcher = match Dispatcher::from_config(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Sources => match serde_json::to_value(dispatcher.registry().sources()) {
            Ok(value) => emit(&value),
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        },
        Commands::Serve { socket } => {
            let socket = socket.unwrap_or(config.ipc.socket_path);
            serve(dispatcher, socket).await
        }
        ref command => match command.to_query() {
            Some(query) => emit(&dispatcher.dispatch(&query).await),
            None => ExitCode::SUCCESS,
        },
    }
}
