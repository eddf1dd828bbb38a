#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod app;
pub mod buttons;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod indicator;
pub mod pairing;
pub mod platform;
pub mod radio;
pub mod readings;
pub mod web;
pub mod wifi;

pub use app::{App, HubState};
pub use engine::{HostIdentity, PairingPolicy, ProtocolEngine};
pub use error::{Error, Result};
