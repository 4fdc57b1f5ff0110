use anyhow::Context;
use clap::Parser;
use depdocs::{
    logging,
    server::{create_app, AppState},
    Config, DocsService,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "HTTP server for dependency extraction and documentation lookup")]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind, overriding the configuration
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing("info,tower_http=debug");

    let args = Args::parse();
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind;
    }

    let bind_addr = config.server.bind_addr.clone();
    let service = DocsService::new(config).context("building documentation service")?;
    let app = create_app(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
