use alloc::vec::Vec;
use core::fmt;

use crate::addr::MacAddr;
use crate::message::{Message, SensorId};

/// Fixed signature prefixing every frame. Must match the sensor firmware
/// bit for bit; frames carrying anything else are foreign traffic.
pub const MSG_SIGNATURE: [u8; 4] = *b"THSN";

/// Signature plus type tag.
pub const ENVELOPE_LEN: usize = MSG_SIGNATURE.len() + 1;

const TAG_PAIR_REQUEST: u8 = 0x01;
const TAG_PAIR_RESPONSE: u8 = 0x02;
const TAG_SENSOR_READING: u8 = 0x03;

const PAIR_REQUEST_LEN: usize = ENVELOPE_LEN + 4;
const PAIR_RESPONSE_LEN: usize = ENVELOPE_LEN + MacAddr::LEN + 2;
const SENSOR_READING_LEN: usize = ENVELOPE_LEN + 4 + 4 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Fewer bytes than the envelope, or than the payload its tag requires.
    TooShort,
    /// First four bytes are not the fixed signature.
    BadSignature,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::TooShort => write!(f, "frame shorter than its layout requires"),
            DecodeError::BadSignature => write!(f, "frame signature mismatch"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// Bounds-checked sequential reader. Frames arrive from a radio DMA buffer
/// of untrusted content; every field read goes through here.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos.checked_add(N).ok_or(DecodeError::TooShort)?;
        let slice = self.data.get(self.pos..end).ok_or(DecodeError::TooShort)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take::<1>()?[0])
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take::<4>()?))
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_le_bytes(self.take::<4>()?))
    }

    fn mac(&mut self) -> Result<MacAddr, DecodeError> {
        Ok(MacAddr(self.take::<6>()?))
    }
}

impl Message {
    /// Wire type tag of this message.
    pub fn tag(&self) -> u8 {
        match self {
            Message::PairRequest { .. } => TAG_PAIR_REQUEST,
            Message::PairResponse { .. } => TAG_PAIR_RESPONSE,
            Message::SensorReading { .. } => TAG_SENSOR_READING,
            Message::Unknown { tag } => *tag,
        }
    }

    /// Total encoded length, deterministic per message kind.
    pub fn encoded_len(&self) -> usize {
        match self {
            Message::PairRequest { .. } => PAIR_REQUEST_LEN,
            Message::PairResponse { .. } => PAIR_RESPONSE_LEN,
            Message::SensorReading { .. } => SENSOR_READING_LEN,
            Message::Unknown { .. } => ENVELOPE_LEN,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(self.encoded_len());
        frame.extend_from_slice(&MSG_SIGNATURE);
        frame.push(self.tag());

        match self {
            Message::PairRequest { sensor } => {
                frame.extend_from_slice(&sensor.0.to_le_bytes());
            }
            Message::PairResponse {
                host,
                channel,
                update_period_mins,
            } => {
                frame.extend_from_slice(host.as_bytes());
                frame.push(*channel);
                frame.push(*update_period_mins);
            }
            Message::SensorReading {
                sensor,
                temperature_c,
                humidity_pct,
            } => {
                frame.extend_from_slice(&sensor.0.to_le_bytes());
                frame.extend_from_slice(&temperature_c.to_le_bytes());
                frame.extend_from_slice(&humidity_pct.to_le_bytes());
            }
            Message::Unknown { .. } => {}
        }

        frame
    }

    pub fn decode(data: &[u8]) -> Result<Message, DecodeError> {
        let mut reader = Reader::new(data);

        let signature = reader.take::<4>()?;
        if signature != MSG_SIGNATURE {
            return Err(DecodeError::BadSignature);
        }

        match reader.u8()? {
            TAG_PAIR_REQUEST => Ok(Message::PairRequest {
                sensor: SensorId(reader.u32()?),
            }),
            TAG_PAIR_RESPONSE => Ok(Message::PairResponse {
                host: reader.mac()?,
                channel: reader.u8()?,
                update_period_mins: reader.u8()?,
            }),
            TAG_SENSOR_READING => Ok(Message::SensorReading {
                sensor: SensorId(reader.u32()?),
                temperature_c: reader.f32()?,
                humidity_pct: reader.f32()?,
            }),
            tag => Ok(Message::Unknown { tag }),
        }
    }
}
