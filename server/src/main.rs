use clap::Parser;
use std::{
    future::{self, Future},
    io,
    net::SocketAddr,
    path::PathBuf,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use booksorter_server::{
    core::Application,
    error::Result,
    http,
    infrastructure::{persistence::BookArchive, MemoryStore, RecordStore},
};

const DEFAULT_LOG_FILTER: &str = "booksorter_server=info,tower_http=info";

#[derive(Parser)]
#[command(name = "booksorter-server")]
#[command(about = "HTTP API for a personal reading list")]
struct ServerArgs {
    #[arg(
        long,
        env = "BOOKSORTER_LISTEN",
        default_value = "0.0.0.0:3001",
        help = "Address to listen on"
    )]
    listen: SocketAddr,

    #[arg(
        long,
        env = "BOOKSORTER_STORE",
        default_value = "book-store",
        help = "Directory of the book archive"
    )]
    store_path: PathBuf,

    #[arg(long, help = "Keep books in memory only")]
    ephemeral: bool,

    #[arg(long, help = "Log as JSON lines")]
    log_json: bool,
}

fn init_logging(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        subscriber.json().init()
    } else {
        subscriber.init()
    }
}

async fn shutdown_signal() {
    shutdown_on(tokio::signal::ctrl_c()).await
}

/// Resolves once `signal` fires. When the signal cannot be listened for the
/// server keeps running rather than stopping straight away.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(error) = signal.await {
        tracing::error!(%error, "unable to listen for shutdown signal");
        future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn serve<RS>(store: RS, listener: TcpListener) -> Result<()>
where
    RS: RecordStore + 'static,
{
    http::Api::new(Application::new(store))
        .start(listener, shutdown_signal())
        .await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();
    init_logging(args.log_json);

    let listener = TcpListener::bind(args.listen).await?;
    tracing::info!(address = %args.listen, "listening");

    if args.ephemeral {
        tracing::warn!("using an in-memory store, books are lost on exit");
        serve(MemoryStore::new(), listener).await
    } else {
        tracing::info!(path = %args.store_path.display(), "opening book archive");
        serve(BookArchive::try_new(&args.store_path)?, listener).await
    }
}
