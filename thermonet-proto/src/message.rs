use core::fmt;

use serde::{Deserialize, Serialize};

use crate::addr::MacAddr;

/// Stable logical key of a sensor node, independent of its radio address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(pub u32);

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages exchanged between the hub and sensor nodes.
///
/// Every frame on the wire is the 4-byte signature, a 1-byte type tag and a
/// fixed-width payload; see [`crate::codec`] for the exact layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    /// Sensor asks to join the network.
    PairRequest { sensor: SensorId },
    /// Hub acknowledges a pairing request; only ever sent by the hub.
    PairResponse {
        host: MacAddr,
        channel: u8,
        update_period_mins: u8,
    },
    /// Periodic telemetry from a paired sensor.
    SensorReading {
        sensor: SensorId,
        temperature_c: f32,
        humidity_pct: f32,
    },
    /// Recognized envelope, unrecognized type tag.
    Unknown { tag: u8 },
}
