use time::OffsetDateTime;

/// Wall-clock source for stamping readings. Object safe so the protocol
/// engine can hold it behind a handle shared with the lifecycle.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// A clock that can be disciplined against a network reference (NTP or
/// similar). Sync failures are non-fatal; the hub keeps its local notion of
/// time until the next attempt.
#[allow(async_fn_in_trait)]
pub trait TimeSync: Clock {
    type Error;

    async fn sync(&mut self) -> Result<(), Self::Error>;
}

/// Host-OS clock, for integrations and tests running on std.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "std")]
impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[cfg(feature = "std")]
impl TimeSync for SystemClock {
    type Error = ();

    async fn sync(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
