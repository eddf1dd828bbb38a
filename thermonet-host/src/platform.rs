use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::TimeSync;
use crate::config::ConfigBackend;
use crate::radio::RadioTransport;
use crate::web::WebUi;
use crate::wifi::WifiAdapter;

/// Restarts the device. On hardware this does not return; mocks record the
/// call and do.
#[allow(async_fn_in_trait)]
pub trait SystemReset {
    async fn restart(&mut self);
}

/// Everything the board and OS integration supplies to the lifecycle,
/// bundled as associated types so the whole application is generic over a
/// single parameter.
///
/// The clock is `Clone` because the protocol engine stamps readings with
/// its own handle while the lifecycle keeps one for time sync; clones must
/// share state.
pub trait Platform {
    type Config: ConfigBackend;
    type Wifi: WifiAdapter;
    type Radio: RadioTransport;
    type Clock: TimeSync + Clone;
    type Web: WebUi;
    type WifiButton: InputPin;
    type PairButton: InputPin;
    type StatusLed: OutputPin;
    type Reset: SystemReset;

    fn split(self) -> PlatformParts<Self>
    where
        Self: Sized;
}

/// The platform broken into its owned components.
pub struct PlatformParts<P: Platform> {
    pub config: P::Config,
    pub wifi: P::Wifi,
    pub radio: P::Radio,
    pub clock: P::Clock,
    pub web: P::Web,
    pub wifi_button: P::WifiButton,
    pub pair_button: P::PairButton,
    pub status_led: P::StatusLed,
    pub reset: P::Reset,
}
