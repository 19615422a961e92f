use bytes::{BufMut, BytesMut};

use crate::crc;

/// Frame size on the wire: two `f32` fields plus one checksum byte.
pub const FRAME_LEN: usize = 9;

/// Bytes covered by the checksum.
pub const DATA_LEN: usize = 8;

/// Position of the checksum byte within a frame.
pub const CHECKSUM_OFFSET: usize = DATA_LEN;

/// One measurement decoded from a checksum-valid frame.
///
/// Field values are taken as-is: NaN and infinities survive decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// First field (temperature in °C on the reference instrument).
    pub field_1: f32,
    /// Second field (relative humidity on the reference instrument).
    pub field_2: f32,
}

impl Reading {
    /// Create a new reading.
    pub fn new(field_1: f32, field_2: f32) -> Self {
        Self { field_1, field_2 }
    }

    /// Decode the data bytes of a frame (little-endian IEEE-754).
    pub fn from_data(data: &[u8; DATA_LEN]) -> Self {
        let [a0, a1, a2, a3, b0, b1, b2, b3] = *data;
        Self {
            field_1: f32::from_le_bytes([a0, a1, a2, a3]),
            field_2: f32::from_le_bytes([b0, b1, b2, b3]),
        }
    }

    /// Encode into the data bytes of a frame.
    pub fn to_data(&self) -> [u8; DATA_LEN] {
        let mut data = [0u8; DATA_LEN];
        data[..4].copy_from_slice(&self.field_1.to_le_bytes());
        data[4..].copy_from_slice(&self.field_2.to_le_bytes());
        data
    }
}

/// Encode a reading into its complete wire frame.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────────┬──────────┐
/// │ Field 1      │ Field 2      │ CRC-8    │
/// │ (f32, 4B LE) │ (f32, 4B LE) │ (1B)     │
/// └──────────────┴──────────────┴──────────┘
/// ```
pub fn frame_bytes(reading: &Reading) -> [u8; FRAME_LEN] {
    let data = reading.to_data();
    let mut frame = [0u8; FRAME_LEN];
    frame[..DATA_LEN].copy_from_slice(&data);
    frame[CHECKSUM_OFFSET] = crc::compute(&data);
    frame
}

/// Append the wire frame for `reading` to `dst`.
pub fn encode_frame(reading: &Reading, dst: &mut BytesMut) {
    dst.reserve(FRAME_LEN);
    dst.put_slice(&frame_bytes(reading));
}

/// Whether the trailing checksum byte matches the data bytes.
pub fn verify_frame(frame: &[u8; FRAME_LEN]) -> bool {
    crc::compute(&frame[..DATA_LEN]) == frame[CHECKSUM_OFFSET]
}

/// Decode a frame if its checksum matches.
pub fn decode_frame(frame: &[u8; FRAME_LEN]) -> Option<Reading> {
    if !verify_frame(frame) {
        return None;
    }
    let mut data = [0u8; DATA_LEN];
    data.copy_from_slice(&frame[..DATA_LEN]);
    Some(Reading::from_data(&data))
}
