use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Reading, FRAME_LEN};
use crate::error::{FrameError, Result};

/// Writes readings as wire frames to any `Write` stream.
///
/// This is the instrument side of the protocol, used for loopback tests,
/// device simulators, and replay captures.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(FRAME_LEN),
        }
    }

    /// Encode and send one reading, then flush.
    pub fn send(&mut self, reading: &Reading) -> Result<()> {
        self.buf.clear();
        encode_frame(reading, &mut self.buf);
        self.write_raw()?;
        self.flush()
    }

    /// Send raw bytes unframed (line noise, truncated frames), then flush.
    pub fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.clear();
        self.buf.extend_from_slice(bytes);
        self.write_raw()?;
        self.flush()
    }

    fn write_raw(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use serframe_transport::ReadSource;

    use super::*;
    use crate::codec::frame_bytes;
    use crate::synchronizer::FrameSynchronizer;

    fn written(writer: FrameWriter<Cursor<Vec<u8>>>) -> Vec<u8> {
        writer.into_inner().into_inner()
    }

    #[test]
    fn write_single_frame() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(&Reading::new(1.0, 2.0)).unwrap();

        assert_eq!(
            written(writer),
            vec![0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x00, 0x40, 0x4d]
        );
    }

    #[test]
    fn write_multiple_frames() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send(&Reading::new(1.0, 2.0)).unwrap();
        writer.send(&Reading::new(21.5, 40.25)).unwrap();

        let wire = written(writer);
        assert_eq!(wire.len(), 2 * FRAME_LEN);
        assert_eq!(&wire[FRAME_LEN..], &frame_bytes(&Reading::new(21.5, 40.25)));
    }

    #[test]
    fn raw_noise_then_frames_decode() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));
        writer.send_raw(&[0xde, 0xad, 0xbe]).unwrap();
        writer.send(&Reading::new(1.0, 2.0)).unwrap();
        writer.send(&Reading::new(-3.5, 0.0)).unwrap();

        let mut sync = FrameSynchronizer::new(ReadSource::new(Cursor::new(written(writer))));
        let readings: Vec<_> = sync.readings().map(|r| r.unwrap()).collect();

        assert_eq!(
            readings,
            vec![Reading::new(1.0, 2.0), Reading::new(-3.5, 0.0)]
        );
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = FrameWriter::new(sink);

        writer.send(&Reading::new(0.5, 0.5)).unwrap();

        assert!(flag.load(Ordering::SeqCst));
        assert_eq!(writer.get_ref().data.len(), FRAME_LEN);
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = FrameWriter::new(Cursor::new(Vec::<u8>::new()));

        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut writer = FrameWriter::new(FailFirstWriter {
            kind: ErrorKind::Interrupted,
            wrote_once: false,
            flushed_once: false,
            data: Vec::new(),
        });
        writer.send(&Reading::new(1.0, 2.0)).unwrap();

        assert_eq!(writer.into_inner().data.len(), FRAME_LEN);
    }

    #[test]
    fn handles_would_block_write_and_flush() {
        let mut writer = FrameWriter::new(FailFirstWriter {
            kind: ErrorKind::WouldBlock,
            wrote_once: false,
            flushed_once: false,
            data: Vec::new(),
        });
        writer.send(&Reading::new(1.0, 2.0)).unwrap();

        assert_eq!(writer.into_inner().data.len(), FRAME_LEN);
    }

    #[test]
    fn closed_when_write_returns_zero() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(&Reading::new(1.0, 2.0)).unwrap_err();
        assert!(matches!(err, FrameError::Closed));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailFirstWriter {
        kind: ErrorKind,
        wrote_once: bool,
        flushed_once: bool,
        data: Vec<u8>,
    }

    impl Write for FailFirstWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(self.kind));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flushed_once {
                self.flushed_once = true;
                return Err(std::io::Error::from(self.kind));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
