use thiserror::Error;

// ---

#[derive(Debug, Error)]
pub enum VcError {
    // ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// Link open, `connect` or session handshake failed.
    #[error("connection failure: {0}")]
    Connection(String),

    /// The handler could not run the command or got an unusable result.
    #[error("handler failure: {0}")]
    Handler(String),

    /// The vehicle refused the command. Carries the reason text verbatim.
    #[error("rejected by vehicle: {0}")]
    Rejected(String),

    #[error("{0} timed out")]
    Timeout(String),

    #[error("command {command} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        command: String,
        attempts: u32,
        last: Box<VcError>,
    },

    #[error("wake-up failed: {0}")]
    WakeUpFailed(Box<VcError>),

    #[error("invalid key: {0}")]
    InvalidKey(String),
}

// ---

impl VcError {
    // ---
    /// True if this is a remote rejection whose reason mentions any of `needles`.
    ///
    /// Used to absorb "already in target state" responses.
    pub fn rejected_with_any(&self, needles: &[&str]) -> bool {
        // ---
        match self {
            VcError::Rejected(reason) => needles.iter().any(|n| reason.contains(n)),
            _ => false,
        }
    }
}

// ---

pub type Result<T> = std::result::Result<T, VcError>;

// ---

#[cfg(test)]
mod tests {
    // ---
    use super::VcError;

    #[test]
    fn rejected_with_any_matches_substring() {
        let err = VcError::Rejected("charge_start: already_started".into());
        assert!(err.rejected_with_any(&["already_started", "is_charging"]));
        assert!(!err.rejected_with_any(&["not_charging"]));
    }

    #[test]
    fn rejected_with_any_ignores_other_variants() {
        let err = VcError::Connection("already_started".into());
        assert!(!err.rejected_with_any(&["already_started"]));
    }

    #[test]
    fn retries_exhausted_surfaces_last_error() {
        let err = VcError::RetriesExhausted {
            command: "wake_up".into(),
            attempts: 3,
            last: Box::new(VcError::Timeout("wake_up".into())),
        };
        assert_eq!(
            err.to_string(),
            "command wake_up failed after 3 attempts: wake_up timed out"
        );
    }
}
