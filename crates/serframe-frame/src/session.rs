use std::time::Duration;

use serframe_transport::ByteSource;
use tracing::{debug, info, warn};

use crate::aligner::AlignerStats;
use crate::capture::{BacklogFilter, Clock, Sample, DEFAULT_BACKLOG_WINDOW};
use crate::error::{FrameError, Result};
use crate::synchronizer::FrameSynchronizer;

/// Receives stamped samples. Formatting and storage are the sink's business.
pub trait PayloadSink {
    /// Take one sample.
    fn accept(&mut self, sample: Sample) -> std::io::Result<()>;

    /// Persist anything buffered. Called once when a session ends.
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl PayloadSink for Vec<Sample> {
    fn accept(&mut self, sample: Sample) -> std::io::Result<()> {
        self.push(sample);
        Ok(())
    }
}

impl<K: PayloadSink + ?Sized> PayloadSink for &mut K {
    fn accept(&mut self, sample: Sample) -> std::io::Result<()> {
        (**self).accept(sample)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        (**self).flush()
    }
}

/// Per-session capture settings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SessionConfig {
    /// Minimum spacing between samples; earlier ones are treated as bridge
    /// backlog and dropped. `None` keeps every sample. Default: 100 ms.
    pub backlog_window: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backlog_window: Some(DEFAULT_BACKLOG_WINDOW),
        }
    }
}

/// Why a session stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndReason {
    /// The byte stream reached end-of-file.
    Closed,
    /// The instrument went quiet for longer than the transport's read timeout.
    TimedOut,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionSummary {
    /// Samples handed to the sink.
    pub samples_delivered: u64,
    /// Samples rejected by the backlog filter.
    pub backlog_dropped: u64,
    /// Byte and frame counters from the synchronizer.
    pub alignment: AlignerStats,
    /// Why the session stopped.
    pub end: EndReason,
}

/// One capture run against one instrument: synchronize, stamp, filter, deliver.
///
/// The session owns its synchronizer and backlog filter, so a reconnect means
/// a new session with fresh state.
pub struct CaptureSession<S, C> {
    sync: FrameSynchronizer<S>,
    clock: C,
    backlog: Option<BacklogFilter>,
    delivered: u64,
}

impl<S: ByteSource, C: Clock> CaptureSession<S, C> {
    /// Start a session. The backlog window is measured from now.
    pub fn new(source: S, clock: C, config: SessionConfig) -> Self {
        let start = clock.now();
        Self {
            sync: FrameSynchronizer::new(source),
            backlog: config
                .backlog_window
                .map(|window| BacklogFilter::new(start, window)),
            clock,
            delivered: 0,
        }
    }

    /// Block until the next sample that survives backlog filtering.
    pub fn next_sample(&mut self) -> Result<Sample> {
        loop {
            let reading = self.sync.next_reading()?;
            let now = self.clock.now();

            if let Some(backlog) = self.backlog.as_mut() {
                if !backlog.admit(now) {
                    debug!(
                        dropped = backlog.dropped(),
                        "dropping sample inside backlog window"
                    );
                    continue;
                }
            }

            self.delivered += 1;
            return Ok(Sample::new(now, reading));
        }
    }

    /// Deliver samples to `sink` until the stream ends.
    ///
    /// End-of-stream and read timeouts finish the session cleanly. The sink is
    /// flushed before returning, including when the source fails.
    pub fn run<K: PayloadSink + ?Sized>(&mut self, sink: &mut K) -> Result<SessionSummary> {
        loop {
            let err = match self.next_sample() {
                Ok(sample) => {
                    sink.accept(sample).map_err(FrameError::Sink)?;
                    continue;
                }
                Err(err) => err,
            };

            let end = match err {
                FrameError::Closed => EndReason::Closed,
                FrameError::TimedOut => EndReason::TimedOut,
                err => {
                    warn!(error = %err, "capture session failed");
                    if let Err(flush_err) = sink.flush() {
                        warn!(error = %flush_err, "failed flushing payload sink");
                    }
                    return Err(err);
                }
            };

            sink.flush().map_err(FrameError::Sink)?;
            let summary = self.summary(end);
            info!(
                samples = summary.samples_delivered,
                backlog_dropped = summary.backlog_dropped,
                bytes_discarded = summary.alignment.bytes_discarded,
                end = ?end,
                "capture session ended"
            );
            return Ok(summary);
        }
    }

    /// Non-blocking check for unread instrument bytes.
    pub fn bytes_available(&mut self) -> Result<bool> {
        self.sync.bytes_available()
    }

    /// Totals so far, labelled with `end`.
    pub fn summary(&self, end: EndReason) -> SessionSummary {
        SessionSummary {
            samples_delivered: self.delivered,
            backlog_dropped: self.backlog.as_ref().map_or(0, BacklogFilter::dropped),
            alignment: self.sync.stats(),
            end,
        }
    }

    /// Consume the session and return the byte source.
    pub fn into_inner(self) -> S {
        self.sync.into_inner()
    }
}
