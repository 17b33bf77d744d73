//! Wake-escalation policy.
//!
//! A sleeping vehicle only answers its security controller, so most
//! actions need a wake-up first. The dispatcher runs `wake_up` as a full
//! command and then waits the configured settle delay while the vehicle
//! brings its other subsystems up.

use vcgate_domain::{ActionCommand, Command};

// ---

/// Whether `command` must be preceded by a successful wake-up.
///
/// Reads are attempted on a sleeping vehicle as-is and fail fast if it
/// does not answer.
pub fn needs_wake_up(command: Command) -> bool {
    // ---
    match command {
        Command::Data(_) => false,
        Command::Action(action) => match action {
            ActionCommand::WakeUp | ActionCommand::Pair => false,
            ActionCommand::SetChargingAmps
            | ActionCommand::SetSocLimit
            | ActionCommand::Charge
            | ActionCommand::ChargeStart
            | ActionCommand::ChargeStop => true,
        },
    }
}

// ---

#[cfg(test)]
mod tests {
    // ---
    use vcgate_domain::{ActionCommand, Command, DataCommand};

    use super::needs_wake_up;

    #[test]
    fn only_state_changing_actions_escalate() {
        // ---
        for a in ActionCommand::ALL {
            let want = !matches!(a, ActionCommand::WakeUp | ActionCommand::Pair);
            assert_eq!(needs_wake_up(Command::Action(a)), want, "{a:?}");
        }
        for d in DataCommand::ALL {
            assert!(!needs_wake_up(Command::Data(d)), "{d:?}");
        }
    }
}
