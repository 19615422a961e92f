//! Sliding-window frame alignment, independent of any I/O.
//!
//! The aligner is fed one byte at a time. It fills a window of [`FRAME_LEN`]
//! bytes and tests the trailing checksum. On a match the window is decoded and
//! refilled from scratch; on a mismatch the oldest byte is dropped and the
//! window is retested as soon as the next byte arrives. There is no limit on
//! how many bytes may be dropped before the stream comes back into alignment.
//!
//! An 8-bit checksum cannot tell a real frame boundary from a misaligned window
//! whose last byte happens to equal the checksum of the eight before it. Such
//! collisions are accepted as frames; the wire format offers nothing stronger.

use tracing::{debug, trace};

use crate::codec::{decode_frame, Reading, FRAME_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Fewer than `FRAME_LEN` bytes read since the last accepted frame.
    Filling { filled: usize },
    /// Window is full and its last test failed; each new byte shifts it.
    Aligned,
}

/// Counters kept by an aligner over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignerStats {
    /// Bytes pushed into the aligner.
    pub bytes_consumed: u64,
    /// Frames that passed their checksum.
    pub frames_accepted: u64,
    /// Bytes shifted out of the window by resynchronization.
    pub bytes_discarded: u64,
}

/// Byte-at-a-time frame synchronization state machine.
#[derive(Debug, Clone)]
pub struct FrameAligner {
    window: [u8; FRAME_LEN],
    state: State,
    discarded_since_lock: u64,
    stats: AlignerStats,
}

impl Default for FrameAligner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAligner {
    /// Create an aligner with an empty window.
    pub fn new() -> Self {
        Self {
            window: [0u8; FRAME_LEN],
            state: State::Filling { filled: 0 },
            discarded_since_lock: 0,
            stats: AlignerStats::default(),
        }
    }

    /// Feed one byte. Returns a reading when the window becomes a valid frame.
    pub fn push(&mut self, byte: u8) -> Option<Reading> {
        self.stats.bytes_consumed += 1;

        match self.state {
            State::Filling { filled } => {
                self.window[filled] = byte;
                let filled = filled + 1;
                if filled < FRAME_LEN {
                    self.state = State::Filling { filled };
                    return None;
                }
                self.state = State::Aligned;
            }
            State::Aligned => {
                self.window.copy_within(1.., 0);
                self.window[FRAME_LEN - 1] = byte;
                self.discarded_since_lock += 1;
                self.stats.bytes_discarded += 1;
            }
        }

        self.test_window()
    }

    fn test_window(&mut self) -> Option<Reading> {
        match decode_frame(&self.window) {
            Some(reading) => {
                if self.discarded_since_lock > 0 {
                    debug!(
                        discarded = self.discarded_since_lock,
                        "frame alignment recovered"
                    );
                    self.discarded_since_lock = 0;
                }
                self.stats.frames_accepted += 1;
                self.state = State::Filling { filled: 0 };
                Some(reading)
            }
            None => {
                // The oldest byte leaves the window on the next push.
                trace!(
                    checksum = self.window[FRAME_LEN - 1],
                    "checksum mismatch, shifting window"
                );
                None
            }
        }
    }

    /// Whether the window is full and being shifted byte by byte.
    pub fn is_resyncing(&self) -> bool {
        self.state == State::Aligned
    }

    /// Bytes currently held in the window.
    pub fn buffered(&self) -> usize {
        match self.state {
            State::Filling { filled } => filled,
            State::Aligned => FRAME_LEN,
        }
    }

    /// Lifetime counters.
    pub fn stats(&self) -> AlignerStats {
        self.stats
    }
}
