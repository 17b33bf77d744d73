//! vcgate agent daemon.
//!
//! Exposes vehicle commands over HTTP and drives each one over a fresh,
//! session-oriented short-range link: connect, handshake, optional wake-up,
//! bounded retries, teardown.
//!
//! Usage:
//!   vcgate-agent --sim-vin 5YJ3E1EA7KF000001 --port 8080
//!   USERNAME=fleet PASSWORD=s3cret vcgate-agent --sim-vin 5YJ3E1EA7KF000001 --sim-asleep

use std::future::IntoFuture;
use std::sync::Arc;

// ---

use clap::Parser;
use tokio::sync::Notify;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ---

use vcgate_sim::{SimConfig, SimConnector, SimVehicle};

// ---

mod config;
mod connection;
mod dispatcher;
mod handlers;
mod http;
mod keys;
mod retry;
mod wake;

// ---

use config::{Config, SHUTDOWN_GRACE};
use dispatcher::Dispatcher;
use http::Credentials;

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ---

    let cfg = Config::parse();

    let no_color = std::env::var("EMACS").is_ok()
        || std::env::var("NO_COLOR").is_ok()
        || std::env::var("CARGO_TERM_COLOR").as_deref() == Ok("never")
        || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(!no_color)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "vcgate-agent starting");

    // Keys are fetched and parsed once; a bad key is fatal.
    let cache_dir = cfg.key_cache_dir();
    let private_key = keys::load_private_key(&cfg.private_key, &cache_dir).await?;
    let public_key = keys::load_public_key(&cfg.public_key, &cache_dir).await?;
    info!(private = %cfg.private_key, public = %cfg.public_key, "keys loaded");

    let settings = cfg.settings(private_key, public_key);

    // Bench mode: every configured VIN gets its own simulated vehicle.
    anyhow::ensure!(
        !cfg.sim_vins.is_empty(),
        "no vehicle backend configured; pass --sim-vin (or SIM_VIN)"
    );
    let sim = if cfg.sim_asleep {
        SimConfig::asleep
    } else {
        SimConfig::awake
    };
    let connector = cfg
        .sim_vins
        .iter()
        .fold(SimConnector::new(), |c, vin| c.with_vehicle(vin.clone(), SimVehicle::new(sim())));
    for vin in connector.vins() {
        info!(vin, asleep = cfg.sim_asleep, "simulated vehicle registered");
    }

    let credentials = match cfg.credentials() {
        Some((user, pass)) => {
            info!("basic auth enabled");
            Some(Credentials::new(user, pass))
        }
        None => {
            warn!("USERNAME/PASSWORD not set, serving without authentication");
            None
        }
    };

    let app = http::router(Dispatcher::new(connector, settings), credentials);

    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP listening");

    // Stop accepting on Ctrl-C, then give in-flight requests a grace period.
    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { signal.notified().await })
            .into_future(),
    );

    tokio::select! {
        res = &mut server => {
            res??;
            return Ok(());
        }
        res = tokio::signal::ctrl_c() => res?,
    }

    info!(grace = ?SHUTDOWN_GRACE, "shutting down");
    shutdown.notify_one();

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(res) => res??,
        Err(_) => warn!("in-flight requests did not finish within the grace period"),
    }

    Ok(())
}
