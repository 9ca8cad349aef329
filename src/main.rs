//! babytalk - a bot you teach to talk
//!
//! Serves the learned-response API or works on the data file directly.

use babytalk::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging (INFO by default, override with RUST_LOG)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("babytalk=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    cli::run().await
}
