use std::time::Duration;

use vcgate_domain::{ChargeState, ChargingState};

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Initial condition of a simulated vehicle.
///
/// Defaults to an awake, paired vehicle plugged in and not charging.
#[derive(Debug, Clone)]
pub struct SimConfig {
    // ---
    /// Asleep vehicles only answer handshakes scoped to the security domain.
    pub asleep: bool,

    /// Whether the gateway's key is already enrolled. Handshakes fail until
    /// a key-enrollment request succeeds.
    pub key_enrolled: bool,

    /// Charge section returned by `get_state` and mutated by commands.
    pub charge: ChargeState,

    /// Added before every link and session operation.
    pub latency: Duration,
}

// ---

impl Default for SimConfig {
    fn default() -> Self {
        // ---
        Self {
            asleep: false,
            key_enrolled: true,
            charge: ChargeState {
                battery_level: 64,
                charge_limit_soc: 80,
                battery_range: 231.5,
                charging_state: ChargingState::Stopped,
                charging_amps: 16,
            },
            latency: Duration::ZERO,
        }
    }
}

// ---

impl SimConfig {
    // ---
    /// Awake, paired, not charging.
    pub fn awake() -> Self {
        Self::default()
    }

    // ---

    /// Parked and asleep: needs a wake-up before anything but the security
    /// domain will talk.
    pub fn asleep() -> Self {
        // ---
        Self {
            asleep: true,
            ..Default::default()
        }
    }

    // ---

    /// Fresh gateway key that has never been enrolled.
    pub fn unpaired() -> Self {
        // ---
        Self {
            key_enrolled: false,
            ..Default::default()
        }
    }

    // ---

    /// Awake and currently charging.
    pub fn charging() -> Self {
        // ---
        let mut cfg = Self::default();
        cfg.charge.charging_state = ChargingState::Charging;
        cfg
    }
}
