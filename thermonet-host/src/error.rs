use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    ConfigStorage,
    Serialization,
    WifiFailure,
    WebUiFailure,
    RetriesExhausted,
    PortalTimeout,
    TransportInit,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigStorage => write!(f, "Configuration storage failure"),
            Error::Serialization => write!(f, "Serialization failure"),
            Error::WifiFailure => write!(f, "WiFi operation failed"),
            Error::WebUiFailure => write!(f, "Web front-end failed to start"),
            Error::RetriesExhausted => write!(f, "WiFi association retries exhausted"),
            Error::PortalTimeout => write!(f, "Configuration portal timed out"),
            Error::TransportInit => write!(f, "Radio transport failed to initialize"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
