//! Connection lifecycle — one fresh link and session per command execution.
//!
//! [`prepare_connection`] opens the link, builds the session handle,
//! connects it and runs the handshake, undoing exactly the steps that
//! succeeded when a later one fails. On success the caller owns a
//! [`Connection`] and must [`close`](Connection::close) it on every path.
//!
//! ```text
//! open_connection ──► new_session ──► connect ──► start_session ──► Connection
//!       │                  │              │               │
//!       └── (nothing) ◄────┴── close ◄────┴── close ◄─────┴── disconnect + close
//! ```

use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use vcgate_domain::{
    // ---
    ActionCommand,
    Command,
    Domain,
    Result,
    VcError,
    VehicleConnector,
    VehicleLink,
    VehicleSession,
};

use crate::config::Settings;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A connected, handshaken session and the link under it.
pub struct Connection<C: VehicleConnector> {
    // ---
    link: C::Link,
    session: C::Session,
}

// ---

impl<C: VehicleConnector> Connection<C> {
    // ---
    pub fn session(&self) -> &C::Session {
        &self.session
    }

    // ---

    /// Disconnect the session, then close the link.
    pub async fn close(self) {
        // ---
        self.session.disconnect().await;
        self.link.close().await;
    }
}

// ---------------------------------------------------------------------------
// prepare_connection
// ---------------------------------------------------------------------------

/// Handshake scope for `command`.
///
/// Key enrollment runs without a session. A wake-up only talks to the
/// security controller because nothing else answers while the vehicle
/// sleeps. Everything else gets all domains (an empty scope).
fn handshake_scope(command: Command) -> Option<&'static [Domain]> {
    // ---
    const SECURITY_ONLY: &[Domain] = &[Domain::Vcsec];
    const ALL_DOMAINS: &[Domain] = &[];

    match command {
        Command::Action(ActionCommand::Pair) => None,
        Command::Action(ActionCommand::WakeUp) => Some(SECURITY_ONLY),
        _ => Some(ALL_DOMAINS),
    }
}

// ---

/// Open a link to `vin` and bring up a session suitable for `command`.
///
/// The whole setup shares one deadline, short for data commands and long
/// for everything else. No global state is touched.
pub async fn prepare_connection<C: VehicleConnector>(
    connector: &C,
    settings: &Settings,
    vin: &str,
    command: Command,
) -> Result<Connection<C>> {
    // ---
    let deadline = Instant::now() + settings.connect_timeout(command);

    let link = timeout_at(deadline, connector.open_connection(vin))
        .await
        .map_err(|_| VcError::Timeout("opening vehicle connection".into()))?
        .map_err(|e| VcError::Connection(format!("failed to open connection to vehicle: {e}")))?;

    let session = match connector.new_session(&link, &settings.private_key) {
        Ok(session) => session,
        Err(e) => {
            link.close().await;
            return Err(VcError::Connection(format!("failed to create vehicle handle: {e}")));
        }
    };

    let connected = match timeout_at(deadline, session.connect()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(VcError::Connection(format!("failed to connect to vehicle: {e}"))),
        Err(_) => Err(VcError::Timeout("connecting to vehicle".into())),
    };
    if let Err(e) = connected {
        link.close().await;
        return Err(e);
    }

    if let Some(domains) = handshake_scope(command) {
        // ---
        let handshake = match timeout_at(deadline, session.start_session(domains)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(VcError::Connection(format!(
                "failed to perform handshake with vehicle: {e}"
            ))),
            Err(_) => Err(VcError::Timeout("vehicle handshake".into())),
        };
        if let Err(e) = handshake {
            warn!(vin, %command, error = %e, "handshake failed, tearing down");
            session.disconnect().await;
            link.close().await;
            return Err(e);
        }
    }

    debug!(vin, %command, "vehicle connection ready");
    Ok(Connection { link, session })
}

// ---
