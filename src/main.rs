//! Guestbook entry point: API server, terminal client, and operations commands.

use std::io::Write as _;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use guestbook::api::{create_router, AppState};
use guestbook::client::{GuestbookClient, GuestbookView};
use guestbook::config::Config;
use guestbook::error::GuestbookError;
use guestbook::message::{validate, CreateMessageRequest, Message};
use guestbook::metrics;
use guestbook::store::{
    MemoryMessageStore, MessageStore, PgMessageStore, QueryMode, StoreBackend, StoreConfig,
};
use guestbook::utils::shutdown_signal;

/// Guestbook API server and client.
#[derive(Parser, Debug)]
#[command(name = "guestbook")]
#[command(about = "Sign and read a guestbook over a small REST API")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API base URL for client commands (overrides API_URL).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the API server (default).
    Serve {
        /// Listening port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,

        /// Store backend (overrides STORE_BACKEND).
        #[arg(long)]
        store: Option<StoreBackend>,
    },

    /// Check configuration validity.
    CheckConfig,

    /// Print all messages, newest first.
    List,

    /// Sign the guestbook once.
    Post {
        /// Author name.
        #[arg(short, long)]
        name: String,

        /// Message body.
        #[arg(short, long)]
        message: String,
    },

    /// Interactive guestbook session.
    Client,

    /// Compare structured and raw query latency against PostgreSQL.
    Bench {
        /// Operations per query mode.
        #[arg(short, long, default_value = "10")]
        iterations: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;

    // Logs go to stderr so client output stays clean.
    let filter = EnvFilter::try_new(config.log_directive(args.verbose))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }

    match args.command {
        Some(Command::Serve { port, store }) => cmd_serve(config, port, store).await,
        None => cmd_serve(config, None, None).await,
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::List) => cmd_list(&config).await,
        Some(Command::Post { name, message }) => cmd_post(&config, name, message).await,
        Some(Command::Client) => cmd_client(&config).await,
        Some(Command::Bench { iterations }) => cmd_bench(&config, iterations).await,
    }
}

/// Build the storage handle selected by configuration.
async fn build_store(config: &Config) -> guestbook::Result<Arc<dyn MessageStore>> {
    let store: Arc<dyn MessageStore> = match config.store_backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; messages are lost on exit");
            Arc::new(MemoryMessageStore::new())
        }
        StoreBackend::Postgres => {
            let store = connect_postgres(config).await?;
            if config.run_migrations {
                store.migrate().await?;
            }
            Arc::new(store)
        }
    };

    store.ping().await?;
    Ok(store)
}

async fn connect_postgres(config: &Config) -> guestbook::Result<PgMessageStore> {
    let database_url = config
        .database_url
        .clone()
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            GuestbookError::InvalidConfig(
                "DATABASE_URL is required for the postgres store".to_string(),
            )
        })?;

    let store_config = StoreConfig {
        max_connections: config.db_max_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
        ..StoreConfig::new(database_url)
    };

    info!("Connecting to database {}", config.redacted_database_url());
    Ok(PgMessageStore::connect(&store_config).await?)
}

fn client_from_config(config: &Config) -> guestbook::Result<GuestbookClient> {
    let base_url: Url = config
        .api_base_url()
        .map_err(GuestbookError::InvalidConfig)?;
    Ok(GuestbookClient::new(base_url)?)
}

/// Run the API server until Ctrl-C or SIGTERM.
async fn cmd_serve(
    mut config: Config,
    port: Option<u16>,
    store: Option<StoreBackend>,
) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(store) = store {
        config.store_backend = store;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    metrics::init_metrics();
    if config.metrics_enabled {
        metrics::install_exporter(config.metrics_port)?;
    }

    info!("Store backend: {}", config.store_backend);
    let store = build_store(&config).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server running on http://{}", addr);

    let router = create_router(AppState::new(store));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("GUESTBOOK - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate().and_then(|()| config.validate_client()) {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Store: {}", config.store_backend);
    println!("  Database: {}", config.redacted_database_url());
    println!("  Pool Size: {}", config.db_max_connections);
    println!("  Run Migrations: {}", config.run_migrations);
    println!("  API URL: {}", config.api_url);
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Print the current list.
async fn cmd_list(config: &Config) -> anyhow::Result<()> {
    let client = client_from_config(config)?;
    let mut view = GuestbookView::new();
    view.load(&client).await;
    print!("{}", view.render());
    Ok(())
}

/// Sign once, then print the refreshed list.
async fn cmd_post(config: &Config, name: String, message: String) -> anyhow::Result<()> {
    let client = client_from_config(config)?;
    let mut view = GuestbookView::new();
    view.set_name(name);
    view.set_message(message);

    let stored = view.submit(&client).await;
    print!("{}", view.render());

    if stored {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "{}",
            view.error().unwrap_or("Failed to submit message")
        ))
    }
}

fn prompt(text: &str) -> std::io::Result<()> {
    print!("{}", text);
    std::io::stdout().flush()
}

/// Interactive form and list.
async fn cmd_client(config: &Config) -> anyhow::Result<()> {
    let client = client_from_config(config)?;
    let mut view = GuestbookView::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Guestbook at {}", client.base_url());
    view.load(&client).await;
    print!("{}", view.render());

    loop {
        prompt("\n[s]ign, [r]efresh, [q]uit > ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "s" | "sign" => {
                prompt("Name: ")?;
                let name = lines.next_line().await?.unwrap_or_default();
                view.set_name(name);

                println!("Message (finish with an empty line):");
                let mut body = Vec::new();
                while let Some(line) = lines.next_line().await? {
                    if line.is_empty() {
                        break;
                    }
                    body.push(line);
                }
                view.set_message(body.join("\n"));

                println!("Submitting...");
                if view.submit(&client).await {
                    println!("Thanks for signing!");
                }
                print!("{}", view.render());
            }
            "r" | "refresh" => {
                view.load(&client).await;
                print!("{}", view.render());
            }
            "q" | "quit" | "exit" => break,
            "" => {}
            other => println!("Unknown command: {}", other),
        }
    }

    Ok(())
}

fn summarize(label: &str, mut latencies: Vec<f64>) {
    if latencies.is_empty() {
        return;
    }
    latencies.sort_by(|a, b| a.total_cmp(b));
    let avg = latencies.iter().sum::<f64>() / latencies.len() as f64;
    let p50 = latencies[latencies.len() / 2];
    println!("   {:<18} avg {:>7.2}ms   p50 {:>7.2}ms", label, avg, p50);
}

/// Compare structured and raw query modes against PostgreSQL.
async fn cmd_bench(config: &Config, iterations: usize) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("GUESTBOOK - QUERY MODE BENCHMARK");
    println!("======================================================================");

    let store = connect_postgres(config).await?;
    if config.run_migrations {
        store.migrate().await?;
    }
    println!("NOTE: this inserts {} rows per mode.", iterations);

    let mut listings: Vec<Vec<Message>> = Vec::new();

    for mode in [QueryMode::Structured, QueryMode::Raw] {
        let store = store.clone().with_query_mode(mode);
        println!("\n{} mode ({} iterations)", mode, iterations);

        let mut creates = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let new = validate(&CreateMessageRequest::new(
                format!("bench-{}", mode),
                format!("benchmark message {}", i + 1),
            ))?;
            let start = Instant::now();
            store.create_message(new).await?;
            creates.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        summarize("create", creates);

        let mut lists = Vec::with_capacity(iterations);
        for _ in 0..iterations {
            let start = Instant::now();
            store.list_messages().await?;
            lists.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        summarize("list", lists);

        listings.push(store.list_messages().await?);
    }

    let equivalent = listings.windows(2).all(|pair| pair[0] == pair[1]);
    println!("\n======================================================================");
    println!(
        "Listings identical across modes: {}",
        if equivalent { "YES" } else { "NO" }
    );
    println!("======================================================================");

    if equivalent {
        Ok(())
    } else {
        Err(anyhow::anyhow!("query modes returned different listings"))
    }
}
