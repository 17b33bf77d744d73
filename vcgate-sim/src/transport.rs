use std::collections::HashMap;

use async_trait::async_trait;

use vcgate_domain::{PrivateKey, Result, VcError, VehicleConnector, VehicleLink};

use super::vehicle::{Call, SimFault};
use super::{SimSession, SimVehicle};

// ---------------------------------------------------------------------------
// SimLink
// ---------------------------------------------------------------------------

/// In-process stand-in for a radio link to one [`SimVehicle`].
pub struct SimLink {
    // ---
    vehicle: SimVehicle,
}

// ---

#[async_trait]
impl VehicleLink for SimLink {
    // ---
    async fn close(&self) {
        self.vehicle.record(Call::Close);
    }
}

// ---------------------------------------------------------------------------
// SimConnector
// ---------------------------------------------------------------------------

/// [`VehicleConnector`] over a fixed set of simulated vehicles keyed by VIN.
///
/// Opening a link to a VIN that was never registered fails the way an
/// out-of-range vehicle would.
#[derive(Clone, Default)]
pub struct SimConnector {
    // ---
    vehicles: HashMap<String, SimVehicle>,
}

// ---

impl SimConnector {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    // ---

    /// Register `vehicle` under `vin`. Returns `self` for chaining.
    pub fn with_vehicle(mut self, vin: impl Into<String>, vehicle: SimVehicle) -> Self {
        self.vehicles.insert(vin.into(), vehicle);
        self
    }

    // ---

    pub fn vins(&self) -> impl Iterator<Item = &str> {
        self.vehicles.keys().map(String::as_str)
    }
}

// ---

#[async_trait]
impl VehicleConnector for SimConnector {
    // ---
    type Link = SimLink;
    type Session = SimSession;

    async fn open_connection(&self, vin: &str) -> Result<SimLink> {
        // ---
        let vehicle = self
            .vehicles
            .get(vin)
            .ok_or_else(|| VcError::Connection(format!("vehicle {vin} not in range")))?
            .clone();

        vehicle.invoke(Call::Open, |_| Ok(())).await?;
        Ok(SimLink { vehicle })
    }

    // ---

    fn new_session(&self, link: &SimLink, _key: &PrivateKey) -> Result<SimSession> {
        // ---
        match link.vehicle.record_and_take_fault(Call::NewSession) {
            None => Ok(SimSession::new(link.vehicle.clone())),
            Some(SimFault::Rejected(reason)) => Err(VcError::Rejected(reason)),
            Some(SimFault::Transport(msg)) => Err(VcError::Connection(msg)),
            Some(SimFault::Hang) => Err(VcError::Connection("session setup stalled".into())),
        }
    }
}
