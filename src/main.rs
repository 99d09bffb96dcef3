use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chirpy::{app, config::Config, Server, ServerState};

fn main() -> std::io::Result<()> {
    let config = Config::parse();

    let filter = if config.verbose {
        EnvFilter::new("chirpy=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let server = Server::builder()
        .max_threads(config.threads)
        .read_timeout(config.read_timeout())
        .bind(("0.0.0.0", config.port))?;

    info!(
        root = %config.root.display(),
        layout = ?config.layout,
        "Start server at localhost:{}",
        config.port
    );

    server.serve(app(ServerState::new(), config.root, config.layout))
}
