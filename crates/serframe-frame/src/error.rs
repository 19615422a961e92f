use serframe_transport::TransportError;

/// Errors that can end a framing session.
///
/// Checksum mismatches are not errors: they are absorbed by resynchronization.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The byte stream ended; no partial frame is kept.
    #[error("byte stream closed")]
    Closed,

    /// The transport's read timeout elapsed before the next byte arrived.
    #[error("timed out waiting for data")]
    TimedOut,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The payload sink rejected a sample.
    #[error("payload sink error: {0}")]
    Sink(#[source] std::io::Error),
}

impl FrameError {
    /// Whether this error marks the normal end of a capture rather than a fault.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FrameError::Closed | FrameError::TimedOut)
    }
}

impl From<TransportError> for FrameError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => FrameError::Closed,
            TransportError::TimedOut => FrameError::TimedOut,
            TransportError::Io(io) => FrameError::Io(io),
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_map_one_to_one() {
        assert!(matches!(
            FrameError::from(TransportError::Closed),
            FrameError::Closed
        ));
        assert!(matches!(
            FrameError::from(TransportError::TimedOut),
            FrameError::TimedOut
        ));
        let io = TransportError::Io(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert!(matches!(
            FrameError::from(io),
            FrameError::Io(e) if e.kind() == std::io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn sink_error_keeps_source() {
        use std::error::Error;

        let err = FrameError::Sink(std::io::Error::other("disk full"));
        assert!(err.source().is_some());
        assert!(!err.is_end_of_stream());
        assert_eq!(err.to_string(), "payload sink error: disk full");
    }
}
