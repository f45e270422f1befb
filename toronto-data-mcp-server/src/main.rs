mod server;

use server::{ServerError, TorontoDataMcpServer};
use tracing_subscriber::{EnvFilter, fmt};

/// Stdout carries JSON-RPC only; logs go to stderr.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting toronto-data-mcp-server");

    TorontoDataMcpServer::bootstrap().await.inspect_err(|err| {
        tracing::error!("server stopped: {err}");
    })
}
