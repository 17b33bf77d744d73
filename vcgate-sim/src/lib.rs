//! In-process simulated vehicle for vcgate unit and integration testing.
//!
//! [`SimConnector`] implements [`vcgate_domain::VehicleConnector`] over a
//! set of [`SimVehicle`]s instead of a radio. Each vehicle:
//!
//! - records every link and session call in order ([`Call`])
//! - fails scripted operations once or always ([`SimOp`], [`SimFault`])
//! - models sleep, key enrollment and the charging state machine
//!   ([`SimConfig`])
//!
//! # Quick start
//!
//! ```rust
//! use vcgate_sim::{SimConfig, SimConnector, SimVehicle};
//!
//! let car = SimVehicle::new(SimConfig::asleep());
//! let connector = SimConnector::new().with_vehicle("5YJ3E1EA7KF000001", car.clone());
//! ```

mod config;
mod session;
mod transport;
mod vehicle;

// --- public API
pub use config::SimConfig;
pub use session::SimSession;
pub use transport::{SimConnector, SimLink};
pub use vehicle::{Call, SimFault, SimOp, SimVehicle};
