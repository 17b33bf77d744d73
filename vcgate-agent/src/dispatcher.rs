//! [`Dispatcher`] — turns one inbound request into connection setup,
//! optional wake-up, handler execution and teardown.
//!
//! Every call opens its own connection and closes it before returning, so
//! requests share nothing but the immutable [`Settings`] and the connector.

use std::sync::Arc;

use tracing::{info, warn};

use vcgate_domain::{
    // ---
    ActionCommand,
    Command,
    DataCommand,
    DataValue,
    Params,
    Result,
    VcError,
    VehicleConnector,
};

use crate::config::Settings;
use crate::connection::prepare_connection;
use crate::handlers::{self, DataReadError};
use crate::retry::retry;
use crate::wake::needs_wake_up;

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher<C: VehicleConnector> {
    // ---
    connector: Arc<C>,
    settings: Arc<Settings>,
}

// Manual impl: `C` itself need not be `Clone`.
impl<C: VehicleConnector> Clone for Dispatcher<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            settings: Arc::clone(&self.settings),
        }
    }
}

// ---

impl<C: VehicleConnector> Dispatcher<C> {
    // ---
    pub fn new(connector: C, settings: Settings) -> Self {
        // ---
        Self {
            connector: Arc::new(connector),
            settings: Arc::new(settings),
        }
    }

    // ---

    /// Handle `POST .../command/{command}`.
    ///
    /// Resolves the command before anything touches the vehicle, so an
    /// unknown name never triggers a wake-up.
    pub async fn execute_action(&self, vin: &str, command: &str, params: &Params) -> Result<()> {
        // ---
        check_vin(vin)?;
        let action = match command.parse::<Command>()? {
            Command::Action(a) => a,
            Command::Data(_) => return Err(VcError::CommandNotFound(command.to_owned())),
        };

        if needs_wake_up(action.into()) {
            self.run_action(vin, ActionCommand::WakeUp, params)
                .await
                .map_err(|e| {
                    warn!(vin, command, error = %e, "waking vehicle failed, giving up");
                    VcError::WakeUpFailed(Box::new(e))
                })?;

            info!(vin, settle = ?self.settings.wake_settle, "vehicle awake, settling");
            tokio::time::sleep(self.settings.wake_settle).await;
        }

        self.run_action(vin, action, params).await
    }

    // ---

    /// One connection, the retry engine, teardown.
    async fn run_action(&self, vin: &str, action: ActionCommand, params: &Params) -> Result<()> {
        // ---
        let command = action.name();
        info!(vin, command, "executing command");

        let conn = prepare_connection(&*self.connector, &self.settings, vin, action.into()).await?;

        let settings = &*self.settings;
        let session = conn.session();
        let result = retry(vin, command, settings.max_attempts, || {
            handlers::run_action(action, session, params, settings)
        })
        .await;

        conn.close().await;
        result
    }

    // ---

    /// Handle `GET .../data/{command}`. One connection, one read, no retry.
    pub async fn execute_data(&self, vin: &str, command: &str) -> Result<DataValue> {
        // ---
        check_vin(vin)?;
        let data: DataCommand = match command.parse::<Command>()? {
            Command::Data(d) => d,
            Command::Action(_) => return Err(VcError::CommandNotFound(command.to_owned())),
        };

        info!(vin, command, "executing data command");
        let conn = prepare_connection(&*self.connector, &self.settings, vin, data.into()).await?;
        let result = handlers::read_data(data, conn.session(), &self.settings).await;
        conn.close().await;

        result.map_err(|DataReadError { error, degraded }| {
            if let Some(value) = degraded {
                warn!(vin, command, ?value, "read failed, degraded value available");
            }
            error
        })
    }
}

// ---

fn check_vin(vin: &str) -> Result<()> {
    // ---
    if vin.trim().is_empty() {
        return Err(VcError::BadRequest("missing vehicle identifier".into()));
    }
    Ok(())
}

// ---
