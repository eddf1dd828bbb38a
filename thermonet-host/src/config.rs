use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use thermonet_proto::SensorId;

use crate::error::{Error, Result};

pub const DEFAULT_SERVER_PORT: u16 = 80;
pub const DEFAULT_UPDATE_PERIOD_MINS: u8 = 1;

const DEFAULT_ADMIN_USER: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "passwd";

/// Persistence for the single configuration document. The original hub
/// keeps one JSON file on flash; anything that can hand back the last
/// written string works here.
#[allow(async_fn_in_trait)]
pub trait ConfigBackend {
    type Error;

    async fn read(&mut self) -> core::result::Result<Option<String>, Self::Error>;

    async fn write(&mut self, contents: &str) -> core::result::Result<(), Self::Error>;
}

/// Volatile backend for tests and host-side integrations.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: Option<String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: &str) -> Self {
        Self {
            contents: Some(contents.to_string()),
        }
    }
}

impl ConfigBackend for MemoryBackend {
    type Error = ();

    async fn read(&mut self) -> core::result::Result<Option<String>, Self::Error> {
        Ok(self.contents.clone())
    }

    async fn write(&mut self, contents: &str) -> core::result::Result<(), Self::Error> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubConfig {
    pub wifi: Option<WifiCredentials>,
    /// Display names of sensors that completed pairing, keyed by their
    /// logical id. Membership here survives reboots.
    pub sensors: BTreeMap<SensorId, String>,
    pub server_port: u16,
    pub update_period_mins: u8,
    /// Login for the dashboard's administrative pages.
    pub admin_user: String,
    pub admin_password: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            wifi: None,
            sensors: BTreeMap::new(),
            server_port: DEFAULT_SERVER_PORT,
            update_period_mins: DEFAULT_UPDATE_PERIOD_MINS,
            admin_user: DEFAULT_ADMIN_USER.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

/// Typed view over the persisted configuration document.
pub struct ConfigStore<B: ConfigBackend> {
    backend: B,
    config: HubConfig,
}

impl<B: ConfigBackend> ConfigStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: HubConfig::default(),
        }
    }

    /// Load the persisted document. A missing, unreadable or corrupt
    /// document applies built-in defaults and continues; boot must not
    /// fail on configuration problems.
    pub async fn load(&mut self) {
        let contents = match self.backend.read().await {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                log::info!("No stored configuration, writing defaults");
                self.apply_defaults().await;
                return;
            }
            Err(_) => {
                log::warn!("Configuration backend unreadable, using defaults");
                self.config = HubConfig::default();
                return;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(config) => {
                self.config = config;
                log::info!("Configuration loaded");
            }
            Err(_) => {
                log::warn!("Stored configuration is corrupt, rewriting defaults");
                self.apply_defaults().await;
            }
        }
    }

    async fn apply_defaults(&mut self) {
        self.config = HubConfig::default();
        if self.save().await.is_err() {
            log::warn!("Could not persist default configuration");
        }
    }

    pub async fn save(&mut self) -> Result<()> {
        let contents = serde_json::to_string(&self.config).map_err(|_| Error::Serialization)?;
        self.backend
            .write(&contents)
            .await
            .map_err(|_| Error::ConfigStorage)
    }

    /// Factory reset: defaults, persisted.
    pub async fn reset(&mut self) -> Result<()> {
        self.config = HubConfig::default();
        self.save().await
    }

    pub fn wifi(&self) -> Option<&WifiCredentials> {
        self.config.wifi.as_ref()
    }

    pub fn set_wifi(&mut self, credentials: WifiCredentials) {
        self.config.wifi = Some(credentials);
    }

    pub fn sensor_name(&self, sensor: SensorId) -> Option<&str> {
        self.config.sensors.get(&sensor).map(String::as_str)
    }

    pub fn add_sensor(&mut self, sensor: SensorId, name: String) {
        self.config.sensors.insert(sensor, name);
    }

    pub fn sensor_ids(&self) -> Vec<SensorId> {
        self.config.sensors.keys().copied().collect()
    }

    pub fn admin_credentials(&self) -> (&str, &str) {
        (&self.config.admin_user, &self.config.admin_password)
    }

    pub fn server_port(&self) -> u16 {
        self.config.server_port
    }

    pub fn update_period_mins(&self) -> u8 {
        self.config.update_period_mins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;

    impl ConfigBackend for FailingBackend {
        type Error = ();

        async fn read(&mut self) -> core::result::Result<Option<String>, Self::Error> {
            Err(())
        }

        async fn write(&mut self, _contents: &str) -> core::result::Result<(), Self::Error> {
            Err(())
        }
    }

    #[tokio::test]
    async fn test_missing_document_applies_defaults() {
        let mut store = ConfigStore::new(MemoryBackend::new());
        store.load().await;

        assert_eq!(store.wifi(), None);
        assert_eq!(store.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(store.update_period_mins(), DEFAULT_UPDATE_PERIOD_MINS);
        assert_eq!(store.admin_credentials(), ("admin", "passwd"));
        assert!(store.sensor_ids().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let mut store = ConfigStore::new(MemoryBackend::new());
        store.set_wifi(WifiCredentials {
            ssid: "HomeNet".to_string(),
            password: "secret".to_string(),
        });
        store.add_sensor(SensorId(2_506_682_365), "Greenhouse".to_string());
        store.save().await.unwrap();

        let MemoryBackend { contents } = store.backend;
        let mut reloaded = ConfigStore::new(MemoryBackend {
            contents: contents.clone(),
        });
        reloaded.load().await;

        assert_eq!(reloaded.wifi().unwrap().ssid, "HomeNet");
        assert_eq!(
            reloaded.sensor_name(SensorId(2_506_682_365)),
            Some("Greenhouse")
        );
    }

    #[tokio::test]
    async fn test_corrupt_document_is_replaced_by_defaults() {
        let mut store = ConfigStore::new(MemoryBackend::with_contents("{not json"));
        store.load().await;

        assert_eq!(store.wifi(), None);
        // The rewrite happened, so the next load parses cleanly.
        assert!(store.backend.contents.as_deref().unwrap().starts_with('{'));
    }

    #[tokio::test]
    async fn test_unreadable_backend_is_not_fatal() {
        // Boot continues on defaults; this is a policy decision, not an
        // oversight.
        let mut store = ConfigStore::new(FailingBackend);
        store.load().await;

        assert_eq!(store.server_port(), DEFAULT_SERVER_PORT);
        assert!(store.save().await.is_err());
    }

    #[tokio::test]
    async fn test_reset_persists_defaults() {
        let mut store = ConfigStore::new(MemoryBackend::new());
        store.set_wifi(WifiCredentials {
            ssid: "x".to_string(),
            password: "y".to_string(),
        });
        store.save().await.unwrap();

        store.reset().await.unwrap();

        let stored = store.backend.contents.clone().unwrap();
        let parsed: HubConfig = serde_json::from_str(&stored).unwrap();
        assert_eq!(parsed, HubConfig::default());
    }
}
