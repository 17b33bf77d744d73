//! Core traits and types for the vcgate vehicle command gateway.
//!
//! This crate defines the vocabulary of the system. The simulator and the
//! agent both speak its types. No collaborator implementations live here.
//!
//! # Structure
//!
//! - [`error`]     — [`VcError`] and [`Result<T>`] alias
//! - [`command`]   — [`Command`] registry: [`ActionCommand`], [`DataCommand`]
//! - [`params`]    — request [`Params`] and typed [`FromParams`] decoding
//! - [`state`]     — vehicle state snapshot, [`ChargeClass`], [`DataValue`]
//! - [`key`]       — opaque [`PrivateKey`] / [`PublicKey`] material
//! - [`transport`] — [`VehicleConnector`], [`VehicleLink`], [`VehicleSession`] traits

mod command;
mod error;
mod key;
mod params;
mod state;
mod transport;

// --- error
pub use error::{Result, VcError};

// --- command
pub use command::{ActionCommand, Command, DataCommand};

// --- params
pub use params::{
    // ---
    decode_body,
    ChargeEnable,
    ChargingAmps,
    FromParams,
    Params,
    SocLimit,
};

// --- state
pub use state::{
    // ---
    ChargeClass,
    ChargeState,
    ChargingState,
    DataValue,
    Domain,
    KeyFormFactor,
    KeyRole,
    StateCategory,
    VehicleState,
};

// --- key
pub use key::{PrivateKey, PublicKey};

// --- transport
pub use transport::{
    // ---
    VehicleConnector,
    VehicleLink,
    VehicleSession,
};
