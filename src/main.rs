//! xmpp-commander - command bot binary.
//!
//! Usage: `xmpp-commander [config.toml]`

use std::sync::Arc;
use tracing::{Instrument, error, info};
use tracing_subscriber::EnvFilter;
use xmpp_commander::config::{Config, validate};
use xmpp_commander::executor::BuiltinCommands;
use xmpp_commander::transport::LineTransport;
use xmpp_commander::{Session, SessionActor, http, metrics, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "commander.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        return Err(anyhow::anyhow!(
            "{} configuration error(s) in {}",
            errors.len(),
            config_path
        ));
    }

    info!(
        jid = %config.connection.jid,
        address = %config.connection.address,
        room = ?config.muc.as_ref().and_then(|m| m.room.as_deref()),
        admins = config.admins.len(),
        "Starting xmpp-commander"
    );

    metrics::init();
    if let Some(port) = config.connection.metrics_port {
        tokio::spawn(http::run_http_server(port));
    }

    let session = Session::from_config(&config)?;
    let actor = SessionActor::new(session, Arc::new(BuiltinCommands::new()))
        .with_command_timeout(config.connection.command_timeout());

    let transport = LineTransport::new(
        config.connection.address.clone(),
        config.connection.max_line_bytes,
    );
    let (outbound, events) = transport.spawn();

    let session_span = telemetry::spans::session(&config.connection.jid);
    tokio::select! {
        result = actor.run(events, outbound).instrument(session_span) => {
            if let Err(e) = result {
                error!(
                    code = e.error_code(),
                    was_online = e.was_online(),
                    error = %e,
                    "Session failed"
                );
                return Err(e.into());
            }
            info!("Session ended");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
