//! Fixed-size, CRC-8 validated frame decoding for serial instruments.
//!
//! This is the core layer of serframe. Every frame on the wire is 9 bytes:
//! - field 1: little-endian `f32`
//! - field 2: little-endian `f32`
//! - CRC-8 (polynomial 0x07) of the eight bytes before it
//!
//! There is no start marker. The decoder finds frame boundaries by testing the
//! checksum of a sliding window and shifting one byte at a time until it
//! matches, so it recovers from line noise, dropped bytes, and attaching to
//! the stream mid-frame.

pub mod aligner;
pub mod capture;
pub mod codec;
pub mod crc;
pub mod error;
pub mod session;
pub mod synchronizer;
pub mod writer;

#[cfg(feature = "async")]
pub mod async_codec;

pub use aligner::{AlignerStats, FrameAligner};
pub use capture::{BacklogFilter, Clock, Sample, SystemClock, DEFAULT_BACKLOG_WINDOW};
pub use codec::{
    decode_frame, encode_frame, frame_bytes, verify_frame, Reading, CHECKSUM_OFFSET, DATA_LEN,
    FRAME_LEN,
};
pub use error::{FrameError, Result};
pub use session::{CaptureSession, EndReason, PayloadSink, SessionConfig, SessionSummary};
pub use synchronizer::{FrameSynchronizer, Readings, Step};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use async_codec::ReadingCodec;
