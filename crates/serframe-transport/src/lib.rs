//! Byte source abstraction for serial instruments.
//!
//! The framing layer consumes its input one byte at a time. This crate turns
//! anything that implements [`std::io::Read`] (a serial tty opened as a file,
//! a socket, a replay buffer) into a [`ByteSource`] that:
//! - blocks until exactly one byte is available, or fails
//! - retries interrupted and partial reads internally
//! - reports end-of-stream and read timeouts as distinct errors
//!
//! This is the lowest layer of serframe. Everything else builds on top of
//! the [`ByteSource`] trait provided here.

pub mod error;
pub mod source;
pub mod traits;

pub use error::{Result, TransportError};
pub use source::{ReadSource, SourceConfig, DEFAULT_READ_CHUNK_SIZE};
pub use traits::{Available, ByteSource};
