use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Idle,
    /// Rising edge: the button went down since the last poll.
    Pressed,
    /// The button has been held past the long-press threshold. Fires once
    /// per hold.
    LongPress,
}

/// Edge and long-press detector over an active-low input (pull-up wiring,
/// low means pressed). A pin read error counts as released.
pub struct ButtonMonitor<I: InputPin> {
    pin: I,
    held_since: Option<Instant>,
    long_press: Duration,
    long_press_fired: bool,
}

impl<I: InputPin> ButtonMonitor<I> {
    pub fn new(pin: I, long_press: Duration) -> Self {
        Self {
            pin,
            held_since: None,
            long_press,
            long_press_fired: false,
        }
    }

    pub fn set_long_press(&mut self, long_press: Duration) {
        self.long_press = long_press;
    }

    pub fn is_held(&mut self) -> bool {
        self.pin.is_low().unwrap_or(false)
    }

    pub fn poll(&mut self, now: Instant) -> ButtonEvent {
        let held = self.is_held();

        match (held, self.held_since) {
            (true, None) => {
                self.held_since = Some(now);
                self.long_press_fired = false;
                ButtonEvent::Pressed
            }
            (true, Some(since)) => {
                if !self.long_press_fired && now.saturating_duration_since(since) >= self.long_press
                {
                    self.long_press_fired = true;
                    ButtonEvent::LongPress
                } else {
                    ButtonEvent::Idle
                }
            }
            (false, _) => {
                self.held_since = None;
                ButtonEvent::Idle
            }
        }
    }
}
