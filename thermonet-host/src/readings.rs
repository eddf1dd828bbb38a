use alloc::collections::{BTreeMap, VecDeque};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use serde::{Deserialize, Serialize};
use thermonet_proto::SensorId;
use time::OffsetDateTime;

/// Readings kept per sensor before the oldest are dropped.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub sensor: SensorId,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    #[serde(with = "time::serde::timestamp")]
    pub timestamp: OffsetDateTime,
}

/// Destination for accepted sensor readings. Called from the radio receive
/// context; implementations must not block.
pub trait ReadingsSink {
    fn record(
        &mut self,
        sensor: SensorId,
        temperature_c: f32,
        humidity_pct: f32,
        at: OffsetDateTime,
    );
}

/// Bounded per-sensor reading history.
#[derive(Debug)]
pub struct ReadingsHistory {
    per_sensor: BTreeMap<SensorId, VecDeque<Reading>>,
    capacity: usize,
}

impl ReadingsHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            per_sensor: BTreeMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn latest(&self, sensor: SensorId) -> Option<Reading> {
        self.per_sensor
            .get(&sensor)
            .and_then(|readings| readings.back())
            .copied()
    }

    pub fn history(&self, sensor: SensorId) -> Vec<Reading> {
        self.per_sensor
            .get(&sensor)
            .map(|readings| readings.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn sensors(&self) -> Vec<SensorId> {
        self.per_sensor.keys().copied().collect()
    }
}

impl Default for ReadingsHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ReadingsSink for ReadingsHistory {
    fn record(
        &mut self,
        sensor: SensorId,
        temperature_c: f32,
        humidity_pct: f32,
        at: OffsetDateTime,
    ) {
        let readings = self.per_sensor.entry(sensor).or_default();
        if readings.len() == self.capacity {
            readings.pop_front();
        }
        readings.push_back(Reading {
            sensor,
            temperature_c,
            humidity_pct,
            timestamp: at,
        });
    }
}

/// History handle shared between the receive context and the main loop.
/// Access straddles the two contexts, so every touch goes through the
/// blocking mutex.
#[derive(Clone)]
pub struct SharedReadings {
    inner: Arc<Mutex<CriticalSectionRawMutex, RefCell<ReadingsHistory>>>,
}

impl SharedReadings {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RefCell::new(ReadingsHistory::new(capacity)))),
        }
    }

    pub fn with<T>(&self, f: impl FnOnce(&mut ReadingsHistory) -> T) -> T {
        self.inner.lock(|history| f(&mut history.borrow_mut()))
    }

    pub fn latest(&self, sensor: SensorId) -> Option<Reading> {
        self.with(|history| history.latest(sensor))
    }

    pub fn history(&self, sensor: SensorId) -> Vec<Reading> {
        self.with(|history| history.history(sensor))
    }

    pub fn sensors(&self) -> Vec<SensorId> {
        self.with(|history| history.sensors())
    }
}

impl Default for SharedReadings {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl ReadingsSink for SharedReadings {
    fn record(
        &mut self,
        sensor: SensorId,
        temperature_c: f32,
        humidity_pct: f32,
        at: OffsetDateTime,
    ) {
        self.with(|history| history.record(sensor, temperature_c, humidity_pct, at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(epoch: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(epoch).unwrap()
    }

    #[test]
    fn test_latest_and_history() {
        let mut history = ReadingsHistory::new(10);
        history.record(SensorId(1), 20.0, 40.0, at(100));
        history.record(SensorId(1), 21.0, 41.0, at(160));
        history.record(SensorId(2), 5.0, 90.0, at(160));

        assert_eq!(history.latest(SensorId(1)).unwrap().temperature_c, 21.0);
        assert_eq!(history.history(SensorId(1)).len(), 2);
        assert_eq!(history.sensors(), [SensorId(1), SensorId(2)]);
        assert!(history.latest(SensorId(3)).is_none());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = ReadingsHistory::new(3);
        for i in 0..5 {
            history.record(SensorId(1), i as f32, 0.0, at(i));
        }

        let kept = history.history(SensorId(1));
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].temperature_c, 2.0);
        assert_eq!(kept[2].temperature_c, 4.0);
    }

    #[test]
    fn test_shared_handle_clones_see_writes() {
        let shared = SharedReadings::new(10);
        let mut writer = shared.clone();
        writer.record(SensorId(9), 18.5, 55.0, at(1_700_000_000));

        assert_eq!(shared.latest(SensorId(9)).unwrap().humidity_pct, 55.0);
    }
}
