use embassy_time::{Duration, Instant};

/// Timed gate for pairing admission. Disabled by default; an operator
/// request opens it for a fixed period. Expiry is observed lazily on
/// check, so `is_open` must be consulted on every admission decision.
///
/// A set deadline is the enabled state; there is no separate flag to fall
/// out of sync with it.
#[derive(Debug, Default)]
pub struct PairingWindow {
    expires_at: Option<Instant>,
}

impl PairingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window until `now + duration`. Re-arming while open moves
    /// the deadline; durations do not stack.
    pub fn enable_for(&mut self, duration: Duration, now: Instant) {
        self.expires_at = Some(now + duration);
    }

    pub fn disable(&mut self) {
        self.expires_at = None;
    }

    pub fn is_open(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now < deadline => true,
            Some(_) => {
                log::debug!("Pairing window expired");
                self.expires_at = None;
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Instant = Instant::from_ticks(0);

    #[test]
    fn test_closed_by_default() {
        let mut window = PairingWindow::new();
        assert!(!window.is_open(T0));
    }

    #[test]
    fn test_open_until_deadline() {
        let mut window = PairingWindow::new();
        window.enable_for(Duration::from_secs(120), T0);

        assert!(window.is_open(T0));
        assert!(window.is_open(T0 + Duration::from_secs(119)));
        assert!(!window.is_open(T0 + Duration::from_secs(120)));
    }

    #[test]
    fn test_expiry_is_latched() {
        let mut window = PairingWindow::new();
        window.enable_for(Duration::from_secs(10), T0);

        assert!(!window.is_open(T0 + Duration::from_secs(10)));
        // Once observed expired, earlier instants do not reopen it.
        assert!(!window.is_open(T0));
    }

    #[test]
    fn test_rearm_resets_deadline() {
        let mut window = PairingWindow::new();
        window.enable_for(Duration::from_secs(10), T0);
        window.enable_for(Duration::from_secs(10), T0 + Duration::from_secs(8));

        assert!(window.is_open(T0 + Duration::from_secs(15)));
        assert!(!window.is_open(T0 + Duration::from_secs(18)));
    }

    #[test]
    fn test_disable() {
        let mut window = PairingWindow::new();
        window.enable_for(Duration::from_secs(10), T0);
        window.disable();
        assert!(!window.is_open(T0));
    }
}
