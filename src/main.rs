use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use voicedesk::http::{AppState, SessionDefaults};
use voicedesk::{create_router, Config, KeywordExtractor};

#[derive(Debug, Parser)]
#[command(name = "voicedesk", about = "Voice-assistant session transcript service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/voicedesk")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Agent label: {}", cfg.session.agent_label);

    let state = AppState::new(
        SessionDefaults {
            agent_label: cfg.session.agent_label.clone(),
            agent_identity: cfg.session.agent_identity.clone(),
        },
        std::sync::Arc::new(KeywordExtractor),
    );

    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .await
        .context("HTTP server error")?;

    Ok(())
}
