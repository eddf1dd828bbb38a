use embassy_time::{Duration, Instant};
use embedded_hal::digital::OutputPin;

const BLINK_PERIOD: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off,
    Solid,
    Blink,
}

/// Single status LED: solid while the hub hosts its configuration portal,
/// blinking while the pairing window is open, off otherwise.
pub struct StatusLed<L: OutputPin> {
    pin: L,
    mode: LedMode,
    lit: bool,
    last_toggle: Instant,
}

impl<L: OutputPin> StatusLed<L> {
    pub fn new(pin: L, now: Instant) -> Self {
        let mut led = Self {
            pin,
            mode: LedMode::Off,
            lit: false,
            last_toggle: now,
        };
        led.apply(false);
        led
    }

    pub fn mode(&self) -> LedMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: LedMode, now: Instant) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.last_toggle = now;
        self.apply(matches!(mode, LedMode::Solid | LedMode::Blink));
    }

    pub fn update(&mut self, now: Instant) {
        if self.mode == LedMode::Blink
            && now.saturating_duration_since(self.last_toggle) >= BLINK_PERIOD
        {
            self.last_toggle = now;
            self.apply(!self.lit);
        }
    }

    fn apply(&mut self, lit: bool) {
        self.lit = lit;
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if result.is_err() {
            log::warn!("Indicator pin write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;
    use core::convert::Infallible;

    use super::*;

    #[derive(Clone)]
    struct TestPin {
        high: Rc<Cell<bool>>,
    }

    impl embedded_hal::digital::ErrorType for TestPin {
        type Error = Infallible;
    }

    impl OutputPin for TestPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high.set(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high.set(true);
            Ok(())
        }
    }

    const T0: Instant = Instant::from_ticks(0);

    #[test]
    fn test_modes_drive_pin() {
        let state = Rc::new(Cell::new(true));
        let mut led = StatusLed::new(
            TestPin {
                high: state.clone(),
            },
            T0,
        );
        assert!(!state.get());

        led.set_mode(LedMode::Solid, T0);
        assert!(state.get());

        led.set_mode(LedMode::Off, T0);
        assert!(!state.get());
    }

    #[test]
    fn test_blink_toggles_on_period() {
        let state = Rc::new(Cell::new(false));
        let mut led = StatusLed::new(
            TestPin {
                high: state.clone(),
            },
            T0,
        );

        led.set_mode(LedMode::Blink, T0);
        assert!(state.get());

        led.update(T0 + Duration::from_millis(100));
        assert!(state.get());

        led.update(T0 + Duration::from_millis(260));
        assert!(!state.get());

        led.update(T0 + Duration::from_millis(520));
        assert!(state.get());
    }
}
