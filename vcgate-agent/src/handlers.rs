//! Per-command handlers.
//!
//! Action handlers change vehicle state and run inside the retry engine;
//! data handlers read one value from the charge section and run once. Each
//! invocation is bounded by its own timeout, separate from the connection
//! deadline.

use tokio::time::timeout;

use vcgate_domain::{
    // ---
    ActionCommand,
    ChargeClass,
    ChargeEnable,
    ChargeState,
    ChargingAmps,
    DataCommand,
    DataValue,
    FromParams,
    KeyFormFactor,
    KeyRole,
    Params,
    Result,
    SocLimit,
    StateCategory,
    VcError,
    VehicleSession,
};

use crate::config::Settings;

/// Rejection reasons that mean charging is already on.
const ALREADY_CHARGING: &[&str] = &["already_started", "is_charging"];

/// Rejection reasons that mean charging is already off.
const NOT_CHARGING: &[&str] = &["not_charging"];

// ---------------------------------------------------------------------------
// Action handlers
// ---------------------------------------------------------------------------

/// Run one attempt of `command`.
pub async fn run_action<S: VehicleSession>(
    command: ActionCommand,
    session: &S,
    params: &Params,
    settings: &Settings,
) -> Result<()> {
    // ---
    timeout(
        settings.command_timeout,
        execute(command, session, params, settings),
    )
    .await
    .map_err(|_| VcError::Timeout(command.name().into()))?
}

// ---

async fn execute<S: VehicleSession>(
    command: ActionCommand,
    session: &S,
    params: &Params,
    settings: &Settings,
) -> Result<()> {
    // ---
    match command {
        ActionCommand::Pair => {
            session
                .send_add_key_request(&settings.public_key, KeyRole::Owner, KeyFormFactor::Unknown)
                .await
        }
        ActionCommand::WakeUp => session.wakeup().await,
        ActionCommand::SetChargingAmps => {
            let p = ChargingAmps::from_params(params)?;
            session.set_charging_amps(p.amps).await
        }
        ActionCommand::SetSocLimit => {
            let p = SocLimit::from_params(params)?;
            session.change_charge_limit(p.percent).await
        }
        ActionCommand::Charge => {
            if ChargeEnable::from_params(params)?.enable {
                charge_start(session).await
            } else {
                charge_stop(session).await
            }
        }
        ActionCommand::ChargeStart => charge_start(session).await,
        ActionCommand::ChargeStop => charge_stop(session).await,
    }
}

// ---

async fn charge_start<S: VehicleSession>(session: &S) -> Result<()> {
    // ---
    match session.charge_start().await {
        Err(e) if e.rejected_with_any(ALREADY_CHARGING) => {
            tracing::info!(reason = %e, "vehicle already charging");
            Ok(())
        }
        other => other,
    }
}

async fn charge_stop<S: VehicleSession>(session: &S) -> Result<()> {
    // ---
    match session.charge_stop().await {
        Err(e) if e.rejected_with_any(NOT_CHARGING) => {
            tracing::info!(reason = %e, "vehicle not charging");
            Ok(())
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Data handlers
// ---------------------------------------------------------------------------

/// A failed read, with an optional value the caller may degrade to.
///
/// The HTTP layer still answers 500 for a degraded read; the fallback is
/// only logged.
#[derive(Debug)]
pub struct DataReadError {
    // ---
    pub error: VcError,

    /// Set for reads with a safe fallback (`get_charge_state` → `"A"`).
    pub degraded: Option<DataValue>,
}

// ---

impl From<VcError> for DataReadError {
    fn from(error: VcError) -> Self {
        Self {
            error,
            degraded: None,
        }
    }
}

// ---

/// Read the value behind `command`. Never retried.
pub async fn read_data<S: VehicleSession>(
    command: DataCommand,
    session: &S,
    settings: &Settings,
) -> std::result::Result<DataValue, DataReadError> {
    // ---
    let charge = timeout(settings.data_timeout, charge_section(session))
        .await
        .map_err(|_| VcError::Timeout(command.name().into()))
        .and_then(|r| r);

    match command {
        DataCommand::GetSoc => Ok(DataValue::Integer(charge?.battery_level)),
        DataCommand::GetSocLimit => Ok(DataValue::Integer(charge?.charge_limit_soc)),
        DataCommand::GetBatteryRange => Ok(DataValue::Float(charge?.battery_range)),
        DataCommand::GetChargeState => match charge {
            Ok(c) => Ok(ChargeClass::from(c.charging_state).into()),
            Err(error) => Err(DataReadError {
                error,
                degraded: Some(ChargeClass::A.into()),
            }),
        },
    }
}

// ---

async fn charge_section<S: VehicleSession>(session: &S) -> Result<ChargeState> {
    // ---
    session
        .get_state(StateCategory::Charge)
        .await?
        .charge_state
        .ok_or_else(|| VcError::Handler("vehicle state has no charge section".into()))
}

// ---
