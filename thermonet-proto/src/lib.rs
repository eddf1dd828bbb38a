#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod addr;
pub mod codec;
pub mod message;

pub use addr::MacAddr;
pub use codec::{DecodeError, MSG_SIGNATURE};
pub use message::{Message, SensorId};
