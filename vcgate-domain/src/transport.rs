use async_trait::async_trait;

use super::error::Result;
use super::key::{PrivateKey, PublicKey};
use super::state::{Domain, KeyFormFactor, KeyRole, StateCategory, VehicleState};

// ---------------------------------------------------------------------------
// VehicleLink
// ---------------------------------------------------------------------------

/// An open short-range radio link to one vehicle.
///
/// Carries no authentication of its own; a [`VehicleSession`] built on top
/// of it does the handshake.
#[async_trait]
pub trait VehicleLink: Send + Sync {
    // ---
    /// Release the link. Must be called exactly once by the owner.
    async fn close(&self);
}

// ---------------------------------------------------------------------------
// VehicleSession
// ---------------------------------------------------------------------------

/// A session-bound vehicle handle.
///
/// Lifecycle: [`connect`](Self::connect), then
/// [`start_session`](Self::start_session) (skipped for key enrollment), then
/// any number of commands, then [`disconnect`](Self::disconnect). Callers
/// bound each call with their own timeout; implementations need not.
#[async_trait]
pub trait VehicleSession: Send + Sync {
    // ---
    /// Attach the handle to its link.
    async fn connect(&self) -> Result<()>;

    /// Run the authenticated handshake with the given subsystems.
    ///
    /// An empty slice means every subsystem.
    async fn start_session(&self, domains: &[Domain]) -> Result<()>;

    /// Detach from the link. Only valid after a successful `connect`.
    async fn disconnect(&self);

    // --- commands ----------------------------------------------------------

    async fn wakeup(&self) -> Result<()>;

    /// Ask the vehicle to enroll `public_key`. Confirmed by tapping a key
    /// card on the vehicle, which is outside this call.
    async fn send_add_key_request(
        &self,
        public_key: &PublicKey,
        role: KeyRole,
        form_factor: KeyFormFactor,
    ) -> Result<()>;

    async fn set_charging_amps(&self, amps: i32) -> Result<()>;

    async fn change_charge_limit(&self, percent: i32) -> Result<()>;

    async fn charge_start(&self) -> Result<()>;

    async fn charge_stop(&self) -> Result<()>;

    async fn get_state(&self, category: StateCategory) -> Result<VehicleState>;
}

// ---------------------------------------------------------------------------
// VehicleConnector
// ---------------------------------------------------------------------------

/// Factory for links and session handles.
///
/// Implementations: `vcgate_sim::SimConnector`. A radio backend implements
/// this same trait.
#[async_trait]
pub trait VehicleConnector: Send + Sync + 'static {
    // ---
    type Link: VehicleLink + 'static;
    type Session: VehicleSession + 'static;

    /// Open a link to the vehicle identified by `vin`.
    async fn open_connection(&self, vin: &str) -> Result<Self::Link>;

    /// Build a session handle bound to `link` and signed with `key`.
    fn new_session(&self, link: &Self::Link, key: &PrivateKey) -> Result<Self::Session>;
}
