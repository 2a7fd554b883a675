//! Voice Turn Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_turn_agent::TurnOrchestrator;
use voice_turn_config::{load_settings, Settings};
use voice_turn_llm::{OpenAiAssistant, OpenAiAssistantConfig};
use voice_turn_pipeline::{DeepgramConfig, DeepgramStt, ElevenLabsConfig, ElevenLabsTts};
use voice_turn_server::{create_router, init_metrics, AppState, ServerError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.* > config/default.* > defaults
    let env = std::env::var("VOICE_TURN_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        },
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return Err(e.into());
        },
    };

    init_tracing(&config);

    tracing::info!("Starting Voice Turn Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let orchestrator = build_orchestrator(&config)?;
    tracing::info!(
        staging_dir = %orchestrator.staging().directory().display(),
        "Providers initialized"
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let metrics_enabled = config.observability.metrics_enabled;

    let mut state = AppState::new(config, orchestrator);
    if metrics_enabled {
        state = state.with_metrics(init_metrics()?);
        tracing::info!("Initialized Prometheus metrics at /metrics");
    }

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Build the long-lived provider clients and wire them into the orchestrator
fn build_orchestrator(config: &Settings) -> Result<TurnOrchestrator, ServerError> {
    let stt = DeepgramStt::new(DeepgramConfig::from(&config.stt))?;
    let assistant = OpenAiAssistant::new(OpenAiAssistantConfig::from(&config.assistant))?;
    let tts = ElevenLabsTts::new(ElevenLabsConfig::from(&config.tts))?;

    if config.assistant.assistant_id.trim().is_empty() {
        return Err(ServerError::Provider(
            "ASSISTANT_ID_KEY not set. Set it via environment or config.".to_string(),
        ));
    }

    Ok(TurnOrchestrator::from_settings(
        config,
        Arc::new(stt),
        Arc::new(assistant),
        Arc::new(tts),
    ))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("voice_turn={},tower_http=debug", level).into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
