use serframe_transport::ByteSource;
use tracing::warn;

use crate::aligner::{AlignerStats, FrameAligner};
use crate::codec::Reading;
use crate::error::{FrameError, Result};

/// Outcome of advancing a synchronizer by one byte.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The byte completed a valid frame.
    Reading(Reading),
    /// No frame yet; call again.
    Pending,
}

/// Pulls validated readings out of a [`ByteSource`].
///
/// Blocks only inside the source's `read_byte`. Any source error ends the
/// session: build a new synchronizer after reconnecting.
pub struct FrameSynchronizer<S> {
    source: S,
    aligner: FrameAligner,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    /// Create a synchronizer with an empty window.
    pub fn new(source: S) -> Self {
        Self {
            source,
            aligner: FrameAligner::new(),
        }
    }

    /// Read exactly one byte and advance the window.
    pub fn step(&mut self) -> Result<Step> {
        let byte = self.source.read_byte()?;
        Ok(match self.aligner.push(byte) {
            Some(reading) => Step::Reading(reading),
            None => Step::Pending,
        })
    }

    /// Read until the next valid frame (blocking).
    ///
    /// Returns `Err(FrameError::Closed)` when the stream ends, dropping any
    /// partially filled window.
    pub fn next_reading(&mut self) -> Result<Reading> {
        loop {
            if let Step::Reading(reading) = self.step()? {
                return Ok(reading);
            }
        }
    }

    /// Iterate over readings until the stream ends.
    pub fn readings(&mut self) -> Readings<'_, S> {
        Readings {
            sync: self,
            done: false,
        }
    }

    /// Non-blocking check for unread input on the underlying source.
    pub fn bytes_available(&mut self) -> Result<bool> {
        Ok(self.source.bytes_available()?)
    }

    /// Lifetime alignment counters.
    pub fn stats(&self) -> AlignerStats {
        self.aligner.stats()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the synchronizer and return the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Iterator over the readings of a [`FrameSynchronizer`].
///
/// Ends at end-of-stream. A timeout or I/O error is yielded once, after which
/// the iterator is exhausted.
pub struct Readings<'a, S> {
    sync: &'a mut FrameSynchronizer<S>,
    done: bool,
}

impl<S: ByteSource> Iterator for Readings<'_, S> {
    type Item = Result<Reading>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.sync.next_reading() {
            Ok(reading) => Some(Ok(reading)),
            Err(FrameError::Closed) => {
                self.done = true;
                None
            }
            Err(err) => {
                if !err.is_end_of_stream() {
                    warn!(error = %err, "frame source failed");
                }
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<S: ByteSource> std::iter::FusedIterator for Readings<'_, S> {}
