//! Self-synchronizing frame decoding for serial instrument loggers.
//!
//! serframe pulls fixed-size, CRC-8 checked measurement frames out of a noisy
//! byte stream and recovers alignment on its own after corruption, partial
//! reads, or attaching to an instrument mid-transmission.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte source abstraction over `Read` streams
//! - [`frame`]: CRC engine, frame synchronizer, capture session
//! - [`logging`]: stderr `tracing` subscriber setup (behind `logging` feature)
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use serframe::frame::{FrameSynchronizer, Reading};
//! use serframe::transport::ReadSource;
//!
//! let wire = [0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x00, 0x40, 0x4d];
//! let mut sync = FrameSynchronizer::new(ReadSource::new(Cursor::new(wire)));
//!
//! assert_eq!(sync.next_reading().unwrap(), Reading::new(1.0, 2.0));
//! ```

/// Re-export transport types.
pub mod transport {
    pub use serframe_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serframe_frame::*;
}

#[cfg(feature = "logging")]
pub mod logging;
