use alloc::boxed::Box;
use alloc::vec::Vec;

use embassy_time::{Duration, Instant};
use thermonet_proto::{MacAddr, Message, SensorId};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::pairing::{PairingWindow, PeerDirectory};
use crate::radio::{MAX_FRAME_LEN, RadioTransport, SendStatus};
use crate::readings::ReadingsSink;

/// Inbound frames handled per pump call; receive work stays bounded.
const MAX_FRAMES_PER_PUMP: usize = 8;

/// Admission gate consulted for every pairing request that arrives while
/// the pairing window is open.
pub trait PairingPolicy {
    fn approve(&mut self, sensor: SensorId) -> bool;
}

/// Admits every requester, like the original firmware did.
pub struct AcceptAll;

impl PairingPolicy for AcceptAll {
    fn approve(&mut self, _sensor: SensorId) -> bool {
        true
    }
}

impl<F: FnMut(SensorId) -> bool> PairingPolicy for F {
    fn approve(&mut self, sensor: SensorId) -> bool {
        self(sensor)
    }
}

/// The hub's own coordinates, advertised in pairing responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostIdentity {
    pub address: MacAddr,
    pub channel: u8,
}

/// Receives raw radio frames, admits or rejects pairing, and forwards
/// accepted readings to the sink. Owns the pairing window and the peer
/// directory exclusively; the lifecycle reaches them only through the
/// methods here.
pub struct ProtocolEngine<R: RadioTransport, C: Clock> {
    transport: R,
    clock: C,
    sink: Box<dyn ReadingsSink>,
    policy: Box<dyn PairingPolicy>,
    window: PairingWindow,
    directory: PeerDirectory,
    identity: Option<HostIdentity>,
    update_period_mins: u8,
    newly_paired: Vec<SensorId>,
    active: bool,
}

impl<R: RadioTransport, C: Clock> ProtocolEngine<R, C> {
    pub fn new(
        transport: R,
        clock: C,
        sink: Box<dyn ReadingsSink>,
        policy: Box<dyn PairingPolicy>,
    ) -> Self {
        Self {
            transport,
            clock,
            sink,
            policy,
            window: PairingWindow::new(),
            directory: PeerDirectory::new(),
            identity: None,
            update_period_mins: 1,
            newly_paired: Vec::new(),
            active: false,
        }
    }

    /// Bring up the transport and start serving. `known_sensors` seeds the
    /// logical paired set from persisted configuration. A transport that
    /// will not start is fatal to the caller.
    pub async fn init(
        &mut self,
        identity: HostIdentity,
        update_period_mins: u8,
        known_sensors: impl IntoIterator<Item = SensorId>,
    ) -> Result<()> {
        self.transport.init().await.map_err(|_| Error::TransportInit)?;
        self.identity = Some(identity);
        self.update_period_mins = update_period_mins;

        let now = self.clock.now();
        for sensor in known_sensors {
            self.directory.mark_paired(sensor, now);
        }

        self.active = true;
        log::info!(
            "Protocol engine up as {} on channel {}",
            identity.address,
            identity.channel
        );
        Ok(())
    }

    /// Tear the transport down. Idempotent; the paired set is kept so a
    /// later `init` resumes where it left off.
    pub async fn deinit(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.window.disable();
        self.transport.deinit().await;
        log::info!("Protocol engine stopped");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn open_pairing_window(&mut self, duration: Duration) {
        log::info!("Pairing window open for {}s", duration.as_secs());
        self.window.enable_for(duration, Instant::now());
    }

    pub fn pairing_window_open(&mut self, now: Instant) -> bool {
        self.window.is_open(now)
    }

    pub fn is_paired(&self, sensor: SensorId) -> bool {
        self.directory.is_paired(sensor)
    }

    pub fn peer_directory(&self) -> &PeerDirectory {
        &self.directory
    }

    /// Sensors that completed their first pairing since the last call.
    /// The lifecycle drains this into persisted configuration.
    pub fn take_newly_paired(&mut self) -> Vec<SensorId> {
        core::mem::take(&mut self.newly_paired)
    }

    /// Drain pending inbound frames and send-completion notifications.
    pub async fn pump(&mut self) {
        if !self.active {
            return;
        }

        let mut buffer = [0u8; MAX_FRAME_LEN];
        for _ in 0..MAX_FRAMES_PER_PUMP {
            match self.transport.poll_frame(&mut buffer).await {
                Ok(Some((sender, len))) => {
                    self.on_frame_received(sender, &buffer[..len]).await;
                }
                Ok(None) => break,
                Err(_) => {
                    log::warn!("Radio receive failed");
                    break;
                }
            }
        }

        while let Some((peer, status)) = self.transport.poll_send_status() {
            self.on_send_completed(peer, status);
        }
    }

    /// Sole entry point for inbound radio frames. Malformed or foreign
    /// traffic is logged and dropped; nothing here escalates.
    pub async fn on_frame_received(&mut self, sender: MacAddr, frame: &[u8]) {
        let message = match Message::decode(frame) {
            Ok(message) => message,
            Err(err) => {
                log::warn!("Dropping frame from {}: {}", sender, err);
                return;
            }
        };

        match message {
            Message::PairRequest { sensor } => self.handle_pair_request(sender, sensor).await,
            Message::PairResponse { .. } => {
                log::warn!("Received PairResponse from {}, shouldn't be here", sender);
            }
            Message::SensorReading {
                sensor,
                temperature_c,
                humidity_pct,
            } => self.handle_reading(sensor, temperature_c, humidity_pct),
            Message::Unknown { tag } => {
                log::warn!("Unknown message tag 0x{:02X} from {}", tag, sender);
            }
        }
    }

    /// Delivery notification from the transport. Informational only; the
    /// link is fire-and-forget and nothing is retransmitted.
    pub fn on_send_completed(&mut self, peer: MacAddr, status: SendStatus) {
        match status {
            SendStatus::Delivered => log::info!("Delivery success: {}", peer),
            SendStatus::Failed => log::warn!("Delivery fail: {}", peer),
        }
    }

    async fn handle_pair_request(&mut self, sender: MacAddr, sensor: SensorId) {
        if !self.window.is_open(Instant::now()) {
            log::warn!("Pairing not enabled, request from sensor {} rejected", sensor);
            return;
        }

        let Some(identity) = self.identity else {
            log::warn!("Pairing request from {} before initialization", sender);
            return;
        };

        if !self.policy.approve(sensor) {
            log::warn!("Admission denied for sensor {}", sensor);
            return;
        }

        log::info!("Pairing sensor {} at {}", sensor, sender);

        // The radio layer needs the requester registered as a peer just
        // long enough to unicast one reply.
        self.directory.add_peer(sender, identity.channel);
        if self.transport.add_peer(sender, identity.channel).await.is_err() {
            log::warn!("Transient peer registration failed for {}", sender);
        }

        let response = Message::PairResponse {
            host: identity.address,
            channel: identity.channel,
            update_period_mins: self.update_period_mins,
        };
        if self.transport.send(sender, &response.encode()).await.is_err() {
            log::warn!("Pairing response send failed for {}", sender);
        }

        self.transport.remove_peer(sender).await;
        self.directory.remove_peer(sender);

        let first_pairing = !self.directory.is_paired(sensor);
        self.directory.mark_paired(sensor, self.clock.now());
        if first_pairing {
            self.newly_paired.push(sensor);
        }
    }

    fn handle_reading(&mut self, sensor: SensorId, temperature_c: f32, humidity_pct: f32) {
        if !self.directory.is_paired(sensor) {
            log::warn!("Ignored reading from unpaired sensor {}", sensor);
            return;
        }

        let at = self.clock.now();
        log::info!(
            "[{} @{}] T: {:.1}, H: {:.1}",
            sensor,
            at.unix_timestamp(),
            temperature_c,
            humidity_pct
        );
        self.sink.record(sensor, temperature_c, humidity_pct, at);
    }
}
