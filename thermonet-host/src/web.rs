use crate::config::WifiCredentials;

/// Local web front-end: the readings dashboard served while the hub is
/// running, and the credentials form served while it hosts its own access
/// point. The two never run at the same time.
#[allow(async_fn_in_trait)]
pub trait WebUi {
    type Error;

    async fn start_dashboard(&mut self, port: u16) -> Result<(), Self::Error>;

    async fn stop_dashboard(&mut self);

    async fn start_config_portal(&mut self) -> Result<(), Self::Error>;

    /// Credentials submitted through the portal form, if any arrived since
    /// the last poll.
    async fn poll_credentials(&mut self) -> Option<WifiCredentials>;

    async fn stop_config_portal(&mut self);
}
