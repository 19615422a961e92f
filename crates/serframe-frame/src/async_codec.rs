use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::aligner::{AlignerStats, FrameAligner};
use crate::codec::{encode_frame, Reading};
use crate::error::FrameError;

/// `tokio_util` codec with the same byte-at-a-time resync as
/// [`FrameSynchronizer`](crate::FrameSynchronizer).
#[derive(Debug, Clone, Default)]
pub struct ReadingCodec {
    aligner: FrameAligner,
}

impl ReadingCodec {
    /// Create a codec with an empty alignment window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lifetime alignment counters.
    pub fn stats(&self) -> AlignerStats {
        self.aligner.stats()
    }
}

impl Decoder for ReadingCodec {
    type Item = Reading;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            if let Some(reading) = self.aligner.push(src.get_u8()) {
                return Ok(Some(reading));
            }
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // A partially filled window at end-of-stream is dropped, not an error.
        self.decode(src)
    }
}

impl Encoder<Reading> for ReadingCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Reading, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;
    use crate::codec::frame_bytes;

    #[test]
    fn decode_consumes_only_up_to_frame() {
        let mut codec = ReadingCodec::new();
        let mut buf = BytesMut::new();
        encode_frame(&Reading::new(1.0, 2.0), &mut buf);
        encode_frame(&Reading::new(3.0, 4.0), &mut buf);

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Reading::new(1.0, 2.0)));
        assert_eq!(buf.len(), 9);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Reading::new(3.0, 4.0)));
        assert!(buf.is_empty());
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn decode_keeps_window_across_calls() {
        let mut codec = ReadingCodec::new();
        let frame = frame_bytes(&Reading::new(1.0, 2.0));

        let mut head = BytesMut::from(&frame[..4]);
        assert_eq!(codec.decode(&mut head).unwrap(), None);
        assert!(head.is_empty());

        let mut tail = BytesMut::from(&frame[4..]);
        assert_eq!(codec.decode(&mut tail).unwrap(), Some(Reading::new(1.0, 2.0)));
    }

    #[test]
    fn decode_eof_drops_partial_window() {
        let mut codec = ReadingCodec::new();
        let mut buf = BytesMut::from(&[0x01u8, 0x02, 0x03][..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn encode_writes_wire_frame() {
        let mut codec = ReadingCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Reading::new(1.0, 2.0), &mut buf).unwrap();

        assert_eq!(&buf[..], &frame_bytes(&Reading::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn framed_read_resyncs_over_noise() {
        let mut wire = vec![0xde, 0xad, 0xbe, 0xef];
        wire.extend_from_slice(&frame_bytes(&Reading::new(1.0, 2.0)));
        wire.extend_from_slice(&frame_bytes(&Reading::new(21.5, 40.25)));

        let mut framed = FramedRead::new(&wire[..], ReadingCodec::new());
        let mut readings = Vec::new();
        while let Some(reading) = framed.next().await {
            readings.push(reading.unwrap());
        }

        assert_eq!(
            readings,
            vec![Reading::new(1.0, 2.0), Reading::new(21.5, 40.25)]
        );
        assert_eq!(framed.decoder().stats().bytes_discarded, 4);
    }
}
