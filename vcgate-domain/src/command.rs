use std::fmt;
use std::str::FromStr;

use super::error::VcError;

// ---------------------------------------------------------------------------
// ActionCommand
// ---------------------------------------------------------------------------

/// Commands that change vehicle state and report only success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCommand {
    Pair,
    WakeUp,
    SetChargingAmps,
    SetSocLimit,
    Charge,
    ChargeStart,
    ChargeStop,
}

// ---

impl ActionCommand {
    // ---
    pub const ALL: [ActionCommand; 7] = [
        ActionCommand::Pair,
        ActionCommand::WakeUp,
        ActionCommand::SetChargingAmps,
        ActionCommand::SetSocLimit,
        ActionCommand::Charge,
        ActionCommand::ChargeStart,
        ActionCommand::ChargeStop,
    ];

    pub fn name(self) -> &'static str {
        // ---
        match self {
            ActionCommand::Pair => "pair",
            ActionCommand::WakeUp => "wake_up",
            ActionCommand::SetChargingAmps => "set_charging_amps",
            ActionCommand::SetSocLimit => "set_soc_limit",
            ActionCommand::Charge => "charge",
            ActionCommand::ChargeStart => "charge_start",
            ActionCommand::ChargeStop => "charge_stop",
        }
    }
}

// ---------------------------------------------------------------------------
// DataCommand
// ---------------------------------------------------------------------------

/// Commands that read vehicle state and return a typed scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataCommand {
    GetSoc,
    GetSocLimit,
    GetBatteryRange,
    GetChargeState,
}

// ---

impl DataCommand {
    // ---
    pub const ALL: [DataCommand; 4] = [
        DataCommand::GetSoc,
        DataCommand::GetSocLimit,
        DataCommand::GetBatteryRange,
        DataCommand::GetChargeState,
    ];

    pub fn name(self) -> &'static str {
        // ---
        match self {
            DataCommand::GetSoc => "get_soc",
            DataCommand::GetSocLimit => "get_soc_limit",
            DataCommand::GetBatteryRange => "get_battery_range",
            DataCommand::GetChargeState => "get_charge_state",
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Any command the gateway knows, resolved from its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Action(ActionCommand),
    Data(DataCommand),
}

// ---

impl Command {
    // ---
    pub fn name(self) -> &'static str {
        match self {
            Command::Action(a) => a.name(),
            Command::Data(d) => d.name(),
        }
    }

    pub fn is_data(self) -> bool {
        matches!(self, Command::Data(_))
    }
}

// ---

impl FromStr for Command {
    // ---
    type Err = VcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // ---
        if let Some(a) = ActionCommand::ALL.into_iter().find(|a| a.name() == s) {
            return Ok(Command::Action(a));
        }
        if let Some(d) = DataCommand::ALL.into_iter().find(|d| d.name() == s) {
            return Ok(Command::Data(d));
        }
        Err(VcError::CommandNotFound(s.to_owned()))
    }
}

// ---

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<ActionCommand> for Command {
    fn from(a: ActionCommand) -> Self {
        Command::Action(a)
    }
}

impl From<DataCommand> for Command {
    fn from(d: DataCommand) -> Self {
        Command::Data(d)
    }
}

// ---
