use thermonet_proto::MacAddr;

/// Largest frame the connectionless radio link carries in one datagram.
pub const MAX_FRAME_LEN: usize = 250;

/// Delivery outcome reported by the transport after a send completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStatus {
    Delivered,
    Failed,
}

/// Connectionless radio transport (ESP-NOW shaped).
///
/// Unicast to an address the radio has not seen requires a transient peer
/// registration first; the protocol engine registers one for the duration
/// of a pairing reply and removes it immediately after.
#[allow(async_fn_in_trait)]
pub trait RadioTransport {
    type Error;

    async fn init(&mut self) -> Result<(), Self::Error>;

    async fn deinit(&mut self);

    async fn add_peer(&mut self, peer: MacAddr, channel: u8) -> Result<(), Self::Error>;

    async fn remove_peer(&mut self, peer: MacAddr);

    async fn send(&mut self, target: MacAddr, frame: &[u8]) -> Result<(), Self::Error>;

    /// Next inbound frame, if one is pending: sender address and the number
    /// of bytes written into `buffer`.
    async fn poll_frame(&mut self, buffer: &mut [u8])
    -> Result<Option<(MacAddr, usize)>, Self::Error>;

    /// Next send-completion notification, if one is pending.
    fn poll_send_status(&mut self) -> Option<(MacAddr, SendStatus)>;
}
