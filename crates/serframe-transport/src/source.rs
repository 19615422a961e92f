use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::{Buf, BytesMut};
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::traits::{Available, ByteSource};

/// Default number of bytes requested from the underlying reader per `read` call.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Configuration for a [`ReadSource`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Upper bound on bytes requested per underlying `read`. Default: 1 KiB.
    pub read_chunk_size: usize,
    /// Read timeout for the underlying stream. Default: none.
    ///
    /// Only [`ReadSource::with_config_unix`] and [`ReadSource::with_config_tcp`]
    /// apply it. Other streams must be configured before they are wrapped.
    pub read_timeout: Option<Duration>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            read_timeout: None,
        }
    }
}

/// Adapts any `Read` stream into a [`ByteSource`].
///
/// Reads are chunked into an internal buffer so a 9600 baud tty is not hit
/// with one syscall per byte; callers still see exactly one byte per call.
pub struct ReadSource<T> {
    inner: T,
    buf: BytesMut,
    config: SourceConfig,
}

impl<T: Read> ReadSource<T> {
    /// Create a new source with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, SourceConfig::default())
    }

    /// Create a new source with explicit configuration.
    pub fn with_config(inner: T, config: SourceConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.read_chunk_size.max(1)),
            config,
        }
    }

    /// Refill the internal buffer with at least one byte (blocking).
    fn fill(&mut self) -> Result<()> {
        let chunk = self.config.read_chunk_size.max(1);
        loop {
            self.buf.resize(chunk, 0);
            let read = match self.inner.read(&mut self.buf[..]) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    self.buf.clear();
                    debug!("read timed out");
                    return Err(TransportError::TimedOut);
                }
                Err(err) => {
                    self.buf.clear();
                    return Err(TransportError::Io(err));
                }
            };

            self.buf.truncate(read);
            if read == 0 {
                debug!("byte stream reached end-of-file");
                return Err(TransportError::Closed);
            }

            trace!(read, "buffered bytes from source");
            return Ok(());
        }
    }

    /// Number of bytes already read from the stream but not yet handed out.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the source and return the inner stream.
    ///
    /// Any buffered bytes are lost.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current source configuration.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }
}

impl<T: Read + Available> ByteSource for ReadSource<T> {
    fn read_byte(&mut self) -> Result<u8> {
        if self.buf.is_empty() {
            self.fill()?;
        }
        Ok(self.buf.get_u8())
    }

    fn bytes_available(&mut self) -> Result<bool> {
        if !self.buf.is_empty() {
            return Ok(true);
        }
        Ok(self.inner.available()? > 0)
    }
}

#[cfg(unix)]
impl ReadSource<std::os::unix::net::UnixStream> {
    /// Create a source for a Unix stream and apply the read timeout from config.
    pub fn with_config_unix(
        inner: std::os::unix::net::UnixStream,
        config: SourceConfig,
    ) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}

impl ReadSource<std::net::TcpStream> {
    /// Create a source for a TCP stream and apply the read timeout from config.
    pub fn with_config_tcp(inner: std::net::TcpStream, config: SourceConfig) -> Result<Self> {
        inner.set_read_timeout(config.read_timeout)?;
        Ok(Self::with_config(inner, config))
    }
}
