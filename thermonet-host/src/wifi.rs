use thermonet_proto::MacAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiStatus {
    Connected,
    Failed,
}

/// Station/access-point WiFi adapter.
#[allow(async_fn_in_trait)]
pub trait WifiAdapter {
    type Error;

    /// One bounded association attempt against the given network.
    async fn connect(&mut self, ssid: &str, password: &str) -> Result<WifiStatus, Self::Error>;

    async fn start_access_point(&mut self, ssid: &str) -> Result<(), Self::Error>;

    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Current radio channel; pairing replies advertise it to sensors.
    fn channel(&self) -> u8;

    fn mac_address(&self) -> MacAddr;
}
