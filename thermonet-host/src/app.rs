use alloc::boxed::Box;
use alloc::format;

use embassy_time::{Duration, Instant, Timer};

use crate::buttons::{ButtonEvent, ButtonMonitor};
use crate::clock::TimeSync;
use crate::config::ConfigStore;
use crate::engine::{HostIdentity, PairingPolicy, ProtocolEngine};
use crate::error::Error;
use crate::indicator::{LedMode, StatusLed};
use crate::platform::{Platform, SystemReset};
use crate::readings::ReadingsSink;
use crate::web::WebUi;
use crate::wifi::{WifiAdapter, WifiStatus};

/// Network name announced while the hub hosts its own configuration portal.
pub const AP_SSID: &str = "TH-NETWORK";

const WIFI_RETRY_LIMIT: u8 = 10;
const WIFI_RETRY_DELAY: Duration = Duration::from_secs(1);
const PORTAL_TIMEOUT: Duration = Duration::from_secs(60 * 10);
const PAIRING_WINDOW: Duration = Duration::from_secs(60 * 2);
const LONG_PRESS: Duration = Duration::from_secs(5);
const REBOOT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubState {
    InitBasics,
    LoadConfig,
    ConnectWifi { attempts: u8 },
    HostWifiConfig,
    StartServers,
    Running,
    ErrorRebooting,
}

/// The hub application: boots the device through configuration load and
/// WiFi association into serving mode, hosts the configuration portal when
/// there is nothing to associate with, and escalates to a reboot when it
/// cannot make progress. One `tick` per control-loop iteration drives
/// everything, including the cross-cutting button, indicator and
/// pairing-window housekeeping.
pub struct App<P: Platform> {
    state: HubState,
    state_entered: Instant,
    fault: Option<Error>,
    config: ConfigStore<P::Config>,
    wifi: P::Wifi,
    web: P::Web,
    clock: P::Clock,
    engine: ProtocolEngine<P::Radio, P::Clock>,
    wifi_button: ButtonMonitor<P::WifiButton>,
    pair_button: ButtonMonitor<P::PairButton>,
    led: StatusLed<P::StatusLed>,
    reset: P::Reset,
    retry_limit: u8,
    retry_delay: Duration,
    portal_timeout: Duration,
    pairing_window: Duration,
    reboot_delay: Duration,
}

impl<P: Platform> App<P> {
    pub fn new(
        platform: P,
        sink: Box<dyn ReadingsSink>,
        policy: Box<dyn PairingPolicy>,
    ) -> Self {
        let parts = platform.split();
        let now = Instant::now();

        Self {
            state: HubState::InitBasics,
            state_entered: now,
            fault: None,
            config: ConfigStore::new(parts.config),
            wifi: parts.wifi,
            web: parts.web,
            clock: parts.clock.clone(),
            engine: ProtocolEngine::new(parts.radio, parts.clock, sink, policy),
            wifi_button: ButtonMonitor::new(parts.wifi_button, LONG_PRESS),
            pair_button: ButtonMonitor::new(parts.pair_button, LONG_PRESS),
            led: StatusLed::new(parts.status_led, now),
            reset: parts.reset,
            retry_limit: WIFI_RETRY_LIMIT,
            retry_delay: WIFI_RETRY_DELAY,
            portal_timeout: PORTAL_TIMEOUT,
            pairing_window: PAIRING_WINDOW,
            reboot_delay: REBOOT_DELAY,
        }
    }

    pub fn with_retry_policy(mut self, limit: u8, delay: Duration) -> Self {
        self.retry_limit = limit.max(1);
        self.retry_delay = delay;
        self
    }

    pub fn with_portal_timeout(mut self, timeout: Duration) -> Self {
        self.portal_timeout = timeout;
        self
    }

    pub fn with_pairing_window(mut self, window: Duration) -> Self {
        self.pairing_window = window;
        self
    }

    pub fn with_long_press(mut self, threshold: Duration) -> Self {
        self.wifi_button.set_long_press(threshold);
        self
    }

    pub fn with_reboot_delay(mut self, delay: Duration) -> Self {
        self.reboot_delay = delay;
        self
    }

    pub fn state(&self) -> HubState {
        self.state
    }

    pub fn fault(&self) -> Option<Error> {
        self.fault
    }

    pub fn config(&self) -> &ConfigStore<P::Config> {
        &self.config
    }

    pub fn engine(&self) -> &ProtocolEngine<P::Radio, P::Clock> {
        &self.engine
    }

    /// Mutable engine access for platform glue that wires transport
    /// callbacks straight into `on_frame_received`.
    pub fn engine_mut(&mut self) -> &mut ProtocolEngine<P::Radio, P::Clock> {
        &mut self.engine
    }

    /// One control-loop iteration.
    pub async fn tick(&mut self) {
        let now = Instant::now();
        self.poll_inputs(now).await;
        self.update_indicator(now);

        match self.state {
            HubState::InitBasics => {
                log::info!("Hub starting");
                self.transition(HubState::LoadConfig);
            }
            HubState::LoadConfig => {
                self.config.load().await;
                self.transition(HubState::ConnectWifi { attempts: 0 });
            }
            HubState::ConnectWifi { attempts } => self.connect_wifi(attempts).await,
            HubState::HostWifiConfig => self.host_wifi_config(now).await,
            HubState::StartServers => self.start_servers().await,
            HubState::Running => self.serve().await,
            HubState::ErrorRebooting => {
                match self.fault {
                    Some(fault) => log::error!("Unrecoverable fault: {}. Rebooting", fault),
                    None => log::error!("Rebooting"),
                }
                Timer::after(self.reboot_delay).await;
                self.reset.restart().await;
            }
        }
    }

    /// Cross-cutting input handling, evaluated every tick regardless of
    /// state: mode-switch edge, factory-reset long press, pairing-window
    /// activation.
    async fn poll_inputs(&mut self, now: Instant) {
        match self.wifi_button.poll(now) {
            ButtonEvent::Pressed
                if self.state != HubState::HostWifiConfig
                    && self.state != HubState::ErrorRebooting =>
            {
                self.enter_wifi_config().await;
            }
            ButtonEvent::LongPress => self.factory_reset().await,
            _ => {}
        }

        if self.pair_button.poll(now) == ButtonEvent::Pressed {
            self.engine.open_pairing_window(self.pairing_window);
        }
    }

    fn update_indicator(&mut self, now: Instant) {
        let mode = if self.state == HubState::HostWifiConfig {
            LedMode::Solid
        } else if self.engine.pairing_window_open(now) {
            LedMode::Blink
        } else {
            LedMode::Off
        };
        self.led.set_mode(mode, now);
        self.led.update(now);
    }

    async fn connect_wifi(&mut self, attempts: u8) {
        let Some(credentials) = self.config.wifi().cloned() else {
            log::warn!("No wifi configuration!");
            self.enter_wifi_config().await;
            return;
        };

        match self
            .wifi
            .connect(&credentials.ssid, &credentials.password)
            .await
        {
            Ok(WifiStatus::Connected) => {
                log::info!(
                    "Connected to {} as {} on channel {}",
                    credentials.ssid,
                    self.wifi.mac_address(),
                    self.wifi.channel()
                );
                self.transition(HubState::StartServers);
            }
            _ => {
                let attempts = attempts.saturating_add(1);
                if attempts >= self.retry_limit {
                    log::error!("WiFi connection issue after {} attempts", attempts);
                    self.fail(Error::RetriesExhausted);
                } else {
                    log::info!("WiFi attempt {} failed, retrying", attempts);
                    Timer::after(self.retry_delay).await;
                    self.transition(HubState::ConnectWifi { attempts });
                }
            }
        }
    }

    async fn host_wifi_config(&mut self, now: Instant) {
        if let Some(credentials) = self.web.poll_credentials().await {
            log::info!("Received wifi credentials for {}", credentials.ssid);
            self.config.set_wifi(credentials);
            if self.config.save().await.is_err() {
                log::error!("Can't save settings");
            }
            self.web.stop_config_portal().await;
            log::info!("Restarting to apply configuration");
            self.reset.restart().await;
        } else if now.saturating_duration_since(self.state_entered) >= self.portal_timeout {
            log::warn!("Wifi configuration timeout");
            self.fail(Error::PortalTimeout);
        }
    }

    async fn start_servers(&mut self) {
        if self.clock.sync().await.is_err() {
            log::warn!("Time sync failed, continuing on local clock");
        }

        let identity = HostIdentity {
            address: self.wifi.mac_address(),
            channel: self.wifi.channel(),
        };
        let known_sensors = self.config.sensor_ids();
        if self
            .engine
            .init(identity, self.config.update_period_mins(), known_sensors)
            .await
            .is_err()
        {
            self.fail(Error::TransportInit);
            return;
        }

        if self
            .web
            .start_dashboard(self.config.server_port())
            .await
            .is_err()
        {
            self.fail(Error::WebUiFailure);
            return;
        }

        self.transition(HubState::Running);
    }

    async fn serve(&mut self) {
        self.engine.pump().await;

        for sensor in self.engine.take_newly_paired() {
            if self.config.sensor_name(sensor).is_none() {
                self.config.add_sensor(sensor, format!("Sensor {}", sensor));
                if self.config.save().await.is_err() {
                    log::warn!("Could not persist sensor {}", sensor);
                }
            }
        }
    }

    /// Stop serving and host the credentials portal on our own access
    /// point. The protocol engine cannot share the radio with access-point
    /// mode, so it is torn down first.
    async fn enter_wifi_config(&mut self) {
        log::info!("Wifi settings mode");
        self.engine.deinit().await;
        self.web.stop_dashboard().await;
        self.wifi.disconnect().await;

        if self.wifi.start_access_point(AP_SSID).await.is_err() {
            self.fail(Error::WifiFailure);
            return;
        }
        if self.web.start_config_portal().await.is_err() {
            self.fail(Error::WebUiFailure);
            return;
        }

        self.transition(HubState::HostWifiConfig);
    }

    /// Reset persisted configuration to defaults and restart.
    async fn factory_reset(&mut self) {
        log::warn!("Factory reset requested");
        if self.config.reset().await.is_err() {
            log::error!("Can't save settings");
        }
        self.reset.restart().await;
    }

    fn fail(&mut self, cause: Error) {
        self.fault = Some(cause);
        self.transition(HubState::ErrorRebooting);
    }

    fn transition(&mut self, next: HubState) {
        log::debug!("State transition: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.state_entered = Instant::now();
    }
}
