/// Errors that can occur while pulling bytes from an instrument.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The stream reached end-of-file; no more bytes will arrive.
    #[error("byte stream closed")]
    Closed,

    /// The underlying read timed out before a byte arrived.
    #[error("timed out waiting for data")]
    TimedOut,

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Whether this error marks the normal end of a capture rather than a fault.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, TransportError::Closed | TransportError::TimedOut)
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
