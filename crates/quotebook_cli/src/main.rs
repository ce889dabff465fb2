//! Quotebook command-line front end.
//!
//! # Responsibility
//! - Wire config, logging, storage, and the mock remote into a `QuoteApp`.
//! - Map subcommands onto app operations and print resulting events.

mod render;

use clap::{Parser, Subcommand};
use log::warn;
use quotebook_core::{
    default_log_level, default_server_quotes, init_logging, AppEvent, CategoryFilter,
    KvQuoteRepository, MergePolicy, MockRemote, QuoteApp, QuoteService, QuotebookConfig,
    SqliteKeyValueStore, SqliteQuoteRepository, SyncEngine, SyncReport, EXPORT_FILE_NAME,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "quotebook", version, about = "Browse, filter, and sync quotes")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the data directory (database and logs).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lists quotes matching the active filter.
    List,
    /// Lists categories; the active one is starred.
    Categories,
    /// Shows one random quote from the active filter.
    Random,
    /// Adds a quote and posts it to the server.
    Add { text: String, category: String },
    /// Selects a category (`all` for every quote).
    Filter { category: String },
    /// Writes every quote to a JSON file.
    Export {
        #[arg(long, default_value = EXPORT_FILE_NAME)]
        out: PathBuf,
    },
    /// Appends quotes from a JSON array file.
    Import { file: PathBuf },
    /// Runs one sync cycle.
    Sync {
        #[arg(long)]
        policy: Option<MergePolicy>,
    },
    /// Syncs on a timer and prints events until interrupted.
    Watch {
        /// Stop after this many sync cycles.
        #[arg(long)]
        ticks: Option<usize>,
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = QuotebookConfig::load_or_default(cli.config.as_deref())?;
    let data_dir = absolute(&config.resolve_data_dir(cli.data_dir.as_deref()))?;

    let level = cli
        .log_level
        .as_deref()
        .or(config.log_level.as_deref())
        .unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &QuotebookConfig::log_dir(&data_dir)) {
        eprintln!("warning: logging disabled: {err}");
    }

    let policy = match &cli.command {
        Command::Sync {
            policy: Some(policy),
        } => *policy,
        _ => config.sync.policy,
    };
    let app = build_app(&config, &data_dir, policy)?;
    let mut events = app.subscribe();

    match cli.command {
        Command::List => {
            let service = app.service().await;
            let visible: Vec<_> = service.visible().into_iter().cloned().collect();
            println!("{}", render::quote_list(service.filter(), &visible));
        }
        Command::Categories => {
            let service = app.service().await;
            println!(
                "{}",
                render::category_list(&service.categories(), service.filter())
            );
        }
        Command::Random => {
            let service = app.service().await;
            println!(
                "{}",
                render::random_pick(service.filter(), service.pick_random())
            );
        }
        Command::Add { text, category } => {
            let (_, post) = app.add_quote(&text, &category).await?;
            if let Err(err) = post.await {
                warn!("event=quote_post module=cli status=error error={err}");
            }
        }
        Command::Filter { category } => {
            app.set_filter(CategoryFilter::parse(&category)).await?;
            let service = app.service().await;
            let visible: Vec<_> = service.visible().into_iter().cloned().collect();
            println!("{}", render::quote_list(service.filter(), &visible));
        }
        Command::Export { out } => {
            let json = app.export_json().await?;
            std::fs::write(&out, json)?;
            println!("Quotes exported successfully to {}!", out.display());
        }
        Command::Import { file } => {
            let payload = std::fs::read_to_string(&file)?;
            app.import_json(&payload).await?;
        }
        Command::Sync { .. } => {
            if let SyncReport::Skipped = app.sync_now().await {
                println!("Sync already in progress.");
            }
        }
        Command::Watch {
            ticks,
            interval_secs,
        } => {
            let period = interval_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.sync.interval());
            watch(&app, &mut events, period, ticks).await;
            return Ok(());
        }
    }

    print_pending(&mut events);
    Ok(())
}

fn build_app(
    config: &QuotebookConfig,
    data_dir: &Path,
    policy: MergePolicy,
) -> CliResult<QuoteApp<SqliteQuoteRepository>> {
    let store = SqliteKeyValueStore::open(QuotebookConfig::db_path(data_dir))?;
    let mut service = QuoteService::load(KvQuoteRepository::new(store))?;
    if config.seed_defaults {
        service.seed_defaults_if_empty()?;
    }

    let remote = MockRemote::new(&default_server_quotes())
        .with_endpoint(config.sync.endpoint.clone())
        .with_latency(config.sync.fetch_latency, config.sync.post_latency);
    let engine =
        SyncEngine::new(Arc::new(remote), policy).with_retry(config.sync.retry_policy());
    Ok(QuoteApp::new(service, engine))
}

async fn watch(
    app: &QuoteApp<SqliteQuoteRepository>,
    events: &mut Receiver<AppEvent>,
    period: Duration,
    ticks: Option<usize>,
) {
    let timer = app.spawn_periodic_sync(period);
    let mut cycles = 0;
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(event) => {
                    if let Some(line) = render::event(&event) {
                        println!("{line}");
                    }
                    // Every finished cycle ends with exactly one notice.
                    if matches!(event, AppEvent::Notice(_)) {
                        cycles += 1;
                        if ticks.is_some_and(|limit| cycles >= limit) {
                            break;
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("event=watch module=cli status=lagged skipped={skipped}");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    timer.abort();
}

fn print_pending(events: &mut Receiver<AppEvent>) {
    while let Ok(event) = events.try_recv() {
        if let Some(line) = render::event(&event) {
            println!("{line}");
        }
    }
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
