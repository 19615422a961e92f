//! Decode instrument frames from an async stream with `FramedRead`.
//!
//! Run with:
//!   cargo run -p serframe --example async-capture --features async,logging

use futures_util::StreamExt;
use serframe::frame::{frame_bytes, Reading, ReadingCodec};
use serframe::logging::{init_logging, LogFormat, LogLevel};
use tokio::io::AsyncWriteExt;
use tokio_util::codec::FramedRead;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::Text, LogLevel::Debug);

    let (mut device, host) = tokio::io::duplex(64);

    let instrument = tokio::spawn(async move {
        for i in 0..8u8 {
            if i % 3 == 0 {
                device.write_all(&[0x55, i]).await?;
            }
            let reading = Reading::new(f32::from(i), 100.0 - f32::from(i));
            device.write_all(&frame_bytes(&reading)).await?;
        }
        device.shutdown().await
    });

    let mut frames = FramedRead::new(host, ReadingCodec::new());
    while let Some(reading) = frames.next().await {
        let reading = reading?;
        tracing::info!(field_1 = reading.field_1, field_2 = reading.field_2, "reading");
    }

    instrument.await??;
    tracing::info!(stats = ?frames.decoder().stats(), "stream ended");
    Ok(())
}
