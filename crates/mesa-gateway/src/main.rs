//! Mesa Gateway: restaurant chat over HTTP.
//! Settings from `config/mesa.toml` + `MESA_*` / `CHATBOT_*` env; demo mode when unconfigured.

use anyhow::Context;
use mesa_core::{select_responder, ChatConfig};
use mesa_gateway::{build_app, AppState, SessionLimits};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ChatConfig::load().context("loading chat config")?;
    let responder = select_responder(&config).context("initializing chat backend")?;
    tracing::info!(
        "[MESA] Restaurant chat v{} starting in {} mode",
        mesa_core::version(),
        responder.mode()
    );

    let app = build_app(AppState::with_limits(
        responder,
        SessionLimits::from_config(&config),
    ));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!("[MESA] Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
