use serde::Serialize;

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// Vehicle subsystem that a session handshake is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    // ---
    /// Vehicle security controller. The only subsystem that answers while
    /// the vehicle is asleep.
    Vcsec,

    /// Infotainment computer. Carries charging and state commands.
    Infotainment,
}

// ---------------------------------------------------------------------------
// StateCategory
// ---------------------------------------------------------------------------

/// Section of vehicle state requested by `get_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateCategory {
    Charge,
    Climate,
}

// ---------------------------------------------------------------------------
// Key enrollment
// ---------------------------------------------------------------------------

/// Role requested for a key in a key-enrollment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    // ---
    /// Primary key with full authority.
    Owner,
}

/// Physical form factor advertised with an enrolled key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFormFactor {
    Unknown,
    NfcCard,
    IosDevice,
    AndroidDevice,
    CloudKey,
}

// ---------------------------------------------------------------------------
// ChargingState
// ---------------------------------------------------------------------------

/// Charging sub-state as reported by the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChargingState {
    // ---
    #[default]
    Unknown,
    Disconnected,
    NoPower,
    Starting,
    Charging,
    Complete,
    Stopped,
    Calibrating,
}

// ---------------------------------------------------------------------------
// ChargeState / VehicleState
// ---------------------------------------------------------------------------

/// Charge section of a vehicle state snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChargeState {
    // ---
    /// State of charge, percent.
    pub battery_level: i32,

    /// Configured charge limit, percent.
    pub charge_limit_soc: i32,

    /// Estimated range.
    pub battery_range: f32,

    pub charging_state: ChargingState,

    /// Requested charging current, amps.
    pub charging_amps: i32,
}

/// Snapshot returned by `get_state`. Only the requested section is populated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleState {
    pub charge_state: Option<ChargeState>,
}

// ---------------------------------------------------------------------------
// ChargeClass
// ---------------------------------------------------------------------------

/// Three-way classification reported by `get_charge_state`.
///
/// The letters follow the EVSE pilot states: `C` charging, `B` connected but
/// not drawing power, `A` anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeClass {
    A,
    B,
    C,
}

// ---

impl ChargeClass {
    // ---
    pub fn as_str(self) -> &'static str {
        match self {
            ChargeClass::A => "A",
            ChargeClass::B => "B",
            ChargeClass::C => "C",
        }
    }
}

// ---

impl From<ChargingState> for ChargeClass {
    // ---
    fn from(state: ChargingState) -> Self {
        // ---
        match state {
            ChargingState::Charging => ChargeClass::C,
            ChargingState::Stopped | ChargingState::NoPower | ChargingState::Complete => {
                ChargeClass::B
            }
            _ => ChargeClass::A,
        }
    }
}

// ---------------------------------------------------------------------------
// DataValue
// ---------------------------------------------------------------------------

/// Typed scalar returned by a data command. Serializes as a bare JSON value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Integer(i32),
    Float(f32),
    Text(String),
}

// ---

impl From<ChargeClass> for DataValue {
    fn from(class: ChargeClass) -> Self {
        DataValue::Text(class.as_str().to_owned())
    }
}

// ---
