use std::sync::Arc;

use anyhow::Result;

use returns_backend::auth::{FirebaseIdentity, GateMode, SessionSigner};
use returns_backend::carrier::{CarrierClient, MemoryTokenCache, ShipdelightApi};
use returns_backend::state::AppState;
use returns_backend::{config, logging, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = config::read_config()?;

    // Initialize logging
    let _logging_guard = logging::init_logging(
        &config.server.log_dir,
        "returns-backend",
        &config.server.log_level,
    )?;

    tracing::info!("Returns backend starting...");
    tracing::info!("Carrier API at {}", config.carrier.base_url);

    let api = ShipdelightApi::new(
        &config.carrier.base_url,
        &config.carrier.api_key,
        config.carrier.timeout_secs,
    )?;
    let carrier = CarrierClient::new(Arc::new(api), Arc::new(MemoryTokenCache::new()));

    let identity = FirebaseIdentity::new(
        &config.identity.api_key,
        &config.identity.auth_base_url,
        &config.identity.token_base_url,
        config.identity.timeout_secs,
    )?;

    let signer = if config.auth.session_secret.is_empty() && config.auth.gate_mode == GateMode::Presence {
        tracing::warn!("No session secret configured, sessions will not survive a restart");
        SessionSigner::ephemeral()
    } else {
        SessionSigner::from_secret(&config.auth.session_secret)?
    };

    match config.auth.gate_mode {
        GateMode::Presence => {
            tracing::warn!("Auth gate in presence mode: cookies are not verified")
        }
        GateMode::Verified => tracing::info!("Auth gate in verified mode"),
    }
    if config.diagnostics.enabled {
        tracing::warn!("Diagnostic routes are mounted");
    }

    let state = AppState::new(&config, carrier, Arc::new(identity), signer);
    let app = routes::build_router(state);

    tracing::info!("HTTP server starting on {}", config.server_address());
    let listener = tokio::net::TcpListener::bind(config.server_address()).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
