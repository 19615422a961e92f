//! Simulated instrument on a socket pair, decoded by a capture session.
//!
//! The fake instrument starts with a burst of queued frames (the backlog a
//! USB-serial bridge accumulates), then sends one reading every 200 ms with
//! line noise and the occasional corrupted checksum mixed in.
//!
//! Run with:
//!   cargo run -p serframe --example noisy-instrument --features logging
//!
//! Set `SERFRAME_LOG_LEVEL=debug` to watch resynchronization.

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Duration;

    use serframe::frame::{
        frame_bytes, CaptureSession, FrameWriter, PayloadSink, Reading, Sample, SessionConfig,
        SystemClock,
    };
    use serframe::logging::{init_logging, LogFormat, LogLevel};
    use serframe::transport::{ReadSource, SourceConfig};

    struct LogSink;

    impl PayloadSink for LogSink {
        fn accept(&mut self, sample: Sample) -> std::io::Result<()> {
            tracing::info!(
                timestamp = sample.unix_seconds(),
                temp_c = sample.reading.field_1,
                humidity = sample.reading.field_2,
                "sample"
            );
            Ok(())
        }
    }

    let level = std::env::var("SERFRAME_LOG_LEVEL")
        .ok()
        .map(|value| value.parse::<LogLevel>())
        .transpose()?
        .unwrap_or(LogLevel::Info);
    init_logging(LogFormat::Text, level);

    let (device, host) = UnixStream::pair()?;

    let instrument = thread::spawn(move || -> serframe::frame::Result<()> {
        let mut writer = FrameWriter::new(device);

        for i in 0..5 {
            writer.send(&Reading::new(20.0 + i as f32 * 0.01, 45.0))?;
        }

        for i in 0..10u8 {
            thread::sleep(Duration::from_millis(200));
            let reading = Reading::new(21.0 + f32::from(i) * 0.1, 44.0 - f32::from(i) * 0.2);
            match i % 4 {
                1 => writer.send_raw(&[0xde, 0xad, i])?,
                2 => {
                    let mut corrupted = frame_bytes(&reading);
                    corrupted[8] ^= 0xff;
                    writer.send_raw(&corrupted)?;
                    continue;
                }
                _ => {}
            }
            writer.send(&reading)?;
        }
        Ok(())
    });

    let config = SourceConfig {
        read_timeout: Some(Duration::from_secs(2)),
        ..SourceConfig::default()
    };
    let source = ReadSource::with_config_unix(host, config)?;
    let mut session = CaptureSession::new(source, SystemClock, SessionConfig::default());
    let summary = session.run(&mut LogSink)?;

    instrument
        .join()
        .map_err(|_| "instrument thread panicked")??;

    tracing::info!(
        delivered = summary.samples_delivered,
        backlog_dropped = summary.backlog_dropped,
        bytes_discarded = summary.alignment.bytes_discarded,
        "done"
    );
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("noisy-instrument needs Unix domain sockets");
}
