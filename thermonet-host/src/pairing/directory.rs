use alloc::collections::BTreeMap;

use thermonet_proto::{MacAddr, SensorId};
use time::OffsetDateTime;

/// Two distinct registries: transient radio-layer peers, alive only for
/// the duration of one handshake reply, and the logical paired-sensor set
/// that admits telemetry. Logical entries never expire on their own; they
/// go away only through explicit removal (factory reset wipes the persisted
/// set, so the next boot seeds empty).
#[derive(Debug, Default)]
pub struct PeerDirectory {
    transient: BTreeMap<MacAddr, u8>,
    paired: BTreeMap<SensorId, OffsetDateTime>,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transient radio peer on the given channel. Idempotent.
    pub fn add_peer(&mut self, address: MacAddr, channel: u8) {
        self.transient.insert(address, channel);
    }

    pub fn remove_peer(&mut self, address: MacAddr) {
        self.transient.remove(&address);
    }

    pub fn has_peer(&self, address: MacAddr) -> bool {
        self.transient.contains_key(&address)
    }

    pub fn peer_count(&self) -> usize {
        self.transient.len()
    }

    pub fn mark_paired(&mut self, sensor: SensorId, at: OffsetDateTime) {
        self.paired.entry(sensor).or_insert(at);
    }

    pub fn is_paired(&self, sensor: SensorId) -> bool {
        self.paired.contains_key(&sensor)
    }

    pub fn paired_since(&self, sensor: SensorId) -> Option<OffsetDateTime> {
        self.paired.get(&sensor).copied()
    }

    pub fn unpair_all(&mut self) {
        self.paired.clear();
    }
}
