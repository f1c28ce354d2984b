//! Command-line front end.
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use rest_composer::auth::AuthSpec;
use rest_composer::config::{get_config, load_config_file};
use rest_composer::executor::{Engine, ExecutionConfig};
use rest_composer::history::ui::format_history_stats;
use rest_composer::history::{format_history_details, format_history_list, HistoryFilter};
use rest_composer::models::{Header, HttpMethod, RequestDraft, ResponseBody};
use rest_composer::session::{SessionController, SessionError};
use rest_composer::storage::FileStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Compose, send and recall HTTP requests.
#[derive(Parser, Debug)]
#[command(name = "rest-composer")]
#[command(version)]
#[command(about = "Compose, send and recall HTTP requests.", long_about = None)]
struct Cli {
    /// Settings file holding a "rest-composer" object
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage file (defaults to ~/.config/rest-composer/app-storage.json)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a request and record it in history (Ctrl+C cancels)
    Send {
        /// HTTP method (GET, POST, PUT, DELETE, PATCH)
        method: HttpMethod,

        url: String,

        /// Header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body (ignored for GET and DELETE)
        #[arg(short, long)]
        data: Option<String>,

        /// Bearer token; replaces any Authorization header
        #[arg(long)]
        bearer: Option<String>,

        /// Environment to record the request under
        #[arg(short, long)]
        environment: Option<String>,

        /// Tag the recorded outcome (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List recorded requests, newest first
    History {
        #[arg(short, long)]
        method: Option<HttpMethod>,

        /// Case-insensitive match against URL or name
        #[arg(short, long)]
        search: Option<String>,

        #[arg(short, long)]
        environment: Option<String>,

        /// Match entries carrying any of these tags (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Show full details of one entry
        #[arg(long)]
        show: Option<String>,

        /// Print summary counts
        #[arg(long)]
        stats: bool,
    },

    /// Remove every recorded request
    ClearHistory,

    /// List saved collections
    Collections,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.config {
        load_config_file(path)?;
    }
    let config = get_config();

    let storage_path = match cli.storage.or(config.storage_file.clone()) {
        Some(path) => path,
        None => rest_composer::storage::default_storage_path()?,
    };
    log::debug!("using storage at {}", storage_path.display());
    let backend = Arc::new(FileStore::new(storage_path));

    let engine = Engine::new(ExecutionConfig::from_config(&config))?;
    let session = SessionController::open(engine, backend, config.concurrent_sends).await;

    match cli.command {
        Commands::Send {
            method,
            url,
            headers,
            data,
            bearer,
            environment,
            tags,
        } => {
            if let Some(environment) = environment {
                session.set_environment(environment).await?;
            }
            session.set_tags(tags);

            let mut draft = RequestDraft::new(method, url);
            draft.headers = headers
                .iter()
                .map(|raw| parse_header_arg(raw))
                .collect::<Result<_, _>>()?;
            draft.body = data.unwrap_or_default();
            if let Some(token) = bearer {
                draft.authorization = AuthSpec::bearer(token);
            }
            send(&session, draft).await
        }
        Commands::History {
            method,
            search,
            environment,
            tags,
            show,
            stats,
        } => {
            let history = session.history();
            if let Some(id) = show {
                return match history.get(&id).await {
                    Some(entry) => {
                        println!("{}", format_history_details(&entry));
                        Ok(ExitCode::SUCCESS)
                    }
                    None => {
                        eprintln!("No history entry with id {}", id);
                        Ok(ExitCode::FAILURE)
                    }
                };
            }

            let filter = HistoryFilter {
                method,
                search,
                environment,
                tags,
                ..HistoryFilter::default()
            };
            let entries = history.filter(&filter).await;
            for (entry, line) in entries.iter().zip(format_history_list(&entries)) {
                println!("{}  {}", entry.id, line);
            }
            if stats {
                println!("{}", format_history_stats(&entries));
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::ClearHistory => {
            session.history().clear().await?;
            println!("History cleared");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Collections => {
            for collection in session.storage().collections().await {
                println!("{} ({})", collection.name, collection.id);
                for request in &collection.requests {
                    println!("  {} {} {} ({})", request.method, request.url, request.name, request.id);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn send(
    session: &SessionController<FileStore>,
    draft: RequestDraft,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut handle = session.start_send(draft)?;

    let joined = tokio::select! {
        joined = &mut handle => joined,
        _ = tokio::signal::ctrl_c() => {
            session.cancel();
            handle.await
        }
    };

    match joined? {
        Ok(outcome) => {
            print_response(&outcome.response);
            eprintln!("Recorded as {}", outcome.record.id);
            Ok(if outcome.response.is_synthetic() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Err(SessionError::HistoryWrite {
            response, source, ..
        }) => {
            print_response(&response);
            eprintln!("warning: failed to record request: {}", source);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_response(response: &rest_composer::ResponseData) {
    if response.is_synthetic() {
        eprintln!("0 ({}ms)", response.time_ms);
    } else {
        eprintln!(
            "{} {} ({}ms)",
            response.status, response.status_text, response.time_ms
        );
        for (name, value) in response.headers.iter() {
            eprintln!("{}: {}", name, value);
        }
    }

    match &response.data {
        ResponseBody::Json(value) => match serde_json::to_string_pretty(value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", value),
        },
        ResponseBody::Text(text) => println!("{}", text),
    }
}

fn parse_header_arg(raw: &str) -> Result<Header, String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("Invalid header '{}': expected \"Name: value\"", raw))?;
    Ok(Header::new(name.trim(), value.trim()))
}
