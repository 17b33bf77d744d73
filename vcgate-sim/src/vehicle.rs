//! [`SimVehicle`] — shared state of one simulated vehicle.
//!
//! Every link and session operation goes through here so a test can read
//! back the exact order of calls with [`SimVehicle::calls`] and script
//! failures with [`SimVehicle::fail_next`] / [`SimVehicle::fail_always`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use vcgate_domain::{
    // ---
    ChargingState,
    Domain,
    KeyRole,
    Result,
    StateCategory,
    VcError,
    VehicleState,
};

use super::SimConfig;

// ---------------------------------------------------------------------------
// Call
// ---------------------------------------------------------------------------

/// One recorded collaborator call, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    // ---
    Open,
    Close,
    NewSession,
    Connect,
    StartSession(Vec<Domain>),
    Disconnect,

    // --- commands ----------------------------------------------------------
    Wakeup,
    AddKey(KeyRole),
    SetChargingAmps(i32),
    ChangeChargeLimit(i32),
    ChargeStart,
    ChargeStop,
    GetState(StateCategory),
}

// ---

impl Call {
    // ---
    pub fn op(&self) -> SimOp {
        // ---
        match self {
            Call::Open => SimOp::Open,
            Call::Close => SimOp::Close,
            Call::NewSession => SimOp::NewSession,
            Call::Connect => SimOp::Connect,
            Call::StartSession(_) => SimOp::StartSession,
            Call::Disconnect => SimOp::Disconnect,
            Call::Wakeup => SimOp::Wakeup,
            Call::AddKey(_) => SimOp::AddKey,
            Call::SetChargingAmps(_) => SimOp::SetChargingAmps,
            Call::ChangeChargeLimit(_) => SimOp::ChangeChargeLimit,
            Call::ChargeStart => SimOp::ChargeStart,
            Call::ChargeStop => SimOp::ChargeStop,
            Call::GetState(_) => SimOp::GetState,
        }
    }
}

// ---------------------------------------------------------------------------
// SimOp / SimFault
// ---------------------------------------------------------------------------

/// Operation kind, used as the key for scripted faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimOp {
    Open,
    Close,
    NewSession,
    Connect,
    StartSession,
    Disconnect,
    Wakeup,
    AddKey,
    SetChargingAmps,
    ChangeChargeLimit,
    ChargeStart,
    ChargeStop,
    GetState,
}

/// Injected failure for an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimFault {
    // ---
    /// Link-level failure, surfaces as [`VcError::Connection`].
    Transport(String),

    /// Vehicle refusal, surfaces as [`VcError::Rejected`].
    Rejected(String),

    /// Never completes. Exercises caller timeouts.
    Hang,
}

// ---

impl SimFault {
    // ---
    pub(crate) async fn raise<T>(self) -> Result<T> {
        // ---
        match self {
            SimFault::Transport(msg) => Err(VcError::Connection(msg)),
            SimFault::Rejected(reason) => Err(VcError::Rejected(reason)),
            SimFault::Hang => std::future::pending().await,
        }
    }
}

// ---------------------------------------------------------------------------
// SimVehicle
// ---------------------------------------------------------------------------

struct Inner {
    // ---
    config: SimConfig,
    calls: Vec<Call>,
    next_faults: HashMap<SimOp, VecDeque<SimFault>>,
    sticky_faults: HashMap<SimOp, SimFault>,
}

/// Cheaply cloneable handle; all clones share one vehicle.
#[derive(Clone)]
pub struct SimVehicle {
    inner: Arc<Mutex<Inner>>,
}

// ---

impl SimVehicle {
    // ---
    pub fn new(config: SimConfig) -> Self {
        // ---
        Self {
            inner: Arc::new(Mutex::new(Inner {
                config,
                calls: Vec::new(),
                next_faults: HashMap::new(),
                sticky_faults: HashMap::new(),
            })),
        }
    }

    // ---

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock only happens in a failing test;
        // the state is still readable for its diagnostics.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    // --- scripting ---------------------------------------------------------

    /// Queue `fault` for the next call of `op`. Queued faults are consumed
    /// in order, one per call.
    pub fn fail_next(&self, op: SimOp, fault: SimFault) {
        self.lock().next_faults.entry(op).or_default().push_back(fault);
    }

    /// Fail every call of `op` with `fault`.
    pub fn fail_always(&self, op: SimOp, fault: SimFault) {
        self.lock().sticky_faults.insert(op, fault);
    }

    // --- observation -------------------------------------------------------

    /// Every call so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: SimOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn is_asleep(&self) -> bool {
        self.lock().config.asleep
    }

    pub fn is_key_enrolled(&self) -> bool {
        self.lock().config.key_enrolled
    }

    pub fn charge_state(&self) -> vcgate_domain::ChargeState {
        self.lock().config.charge.clone()
    }

    // --- called by link and session ----------------------------------------

    /// Record `call` and pop the fault scripted for it, if any.
    pub(crate) fn record_and_take_fault(&self, call: Call) -> Option<SimFault> {
        // ---
        let op = call.op();
        let mut inner = self.lock();
        inner.calls.push(call);
        let queued = inner.next_faults.get_mut(&op).and_then(VecDeque::pop_front);
        queued.or_else(|| inner.sticky_faults.get(&op).cloned())
    }

    // ---

    /// Record `call`, apply latency and any scripted fault, then run `apply`
    /// against the vehicle state.
    pub(crate) async fn invoke<T: Send>(
        &self,
        call: Call,
        apply: impl FnOnce(&mut SimConfig) -> Result<T> + Send,
    ) -> Result<T> {
        // ---
        let op = call.op();
        let fault = self.record_and_take_fault(call);
        let latency = self.lock().config.latency;

        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if let Some(fault) = fault {
            tracing::debug!(?op, ?fault, "sim: injected fault");
            return fault.raise().await;
        }

        let mut inner = self.lock();
        apply(&mut inner.config)
    }

    /// Record a call that cannot fail.
    pub(crate) fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

// ---------------------------------------------------------------------------
// Vehicle behaviour
// ---------------------------------------------------------------------------

pub(crate) fn start_session(cfg: &mut SimConfig, domains: &[Domain]) -> Result<()> {
    // ---
    if !cfg.key_enrolled {
        return Err(VcError::Connection(
            "handshake rejected: key not enrolled".into(),
        ));
    }
    let wants_infotainment = domains.is_empty() || domains.contains(&Domain::Infotainment);
    if cfg.asleep && wants_infotainment {
        return Err(VcError::Connection(
            "infotainment did not respond: vehicle asleep".into(),
        ));
    }
    Ok(())
}

pub(crate) fn require_awake(cfg: &SimConfig) -> Result<()> {
    // ---
    if cfg.asleep {
        return Err(VcError::Rejected("vehicle_asleep".into()));
    }
    Ok(())
}

pub(crate) fn charge_start(cfg: &mut SimConfig) -> Result<()> {
    // ---
    require_awake(cfg)?;
    match cfg.charge.charging_state {
        ChargingState::Charging => Err(VcError::Rejected("is_charging".into())),
        ChargingState::Starting => Err(VcError::Rejected("already_started".into())),
        ChargingState::Disconnected => Err(VcError::Rejected("cable_not_connected".into())),
        ChargingState::Complete => Err(VcError::Rejected("complete".into())),
        _ => {
            cfg.charge.charging_state = ChargingState::Charging;
            Ok(())
        }
    }
}

pub(crate) fn charge_stop(cfg: &mut SimConfig) -> Result<()> {
    // ---
    require_awake(cfg)?;
    match cfg.charge.charging_state {
        ChargingState::Charging | ChargingState::Starting => {
            cfg.charge.charging_state = ChargingState::Stopped;
            Ok(())
        }
        _ => Err(VcError::Rejected("not_charging".into())),
    }
}

pub(crate) fn get_state(cfg: &SimConfig, category: StateCategory) -> Result<VehicleState> {
    // ---
    require_awake(cfg)?;
    let charge_state = match category {
        StateCategory::Charge => Some(cfg.charge.clone()),
        _ => None,
    };
    Ok(VehicleState { charge_state })
}
