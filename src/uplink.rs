//! Uplink forwarder — the outbound boundary of the sensor pipeline.
//!
//! Drains the reading channel, encodes each reading with postcard, and
//! hands the frame to an [`UplinkSink`]. The mesh adapter implements the
//! sink on target; [`LogSink`] serves host runs and bring-up. The
//! forwarder must drain promptly: the scheduler task blocks indefinitely
//! on a full reading channel.

use core::fmt;

use log::{info, warn};

use crate::sensorif::channels::ReadingChannel;
use crate::sensorif::driver::Reading;

/// Errors an uplink sink can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UplinkError {
    /// No route to the collector (mesh not formed, root lost).
    NotConnected,
    /// The transport refused or failed to take the frame.
    Io,
}

impl fmt::Display for UplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "uplink not connected"),
            Self::Io => write!(f, "uplink I/O error"),
        }
    }
}

/// Where encoded reading frames go. Adapters decide the transport.
pub trait UplinkSink {
    fn forward(&mut self, frame: &[u8]) -> Result<(), UplinkError>;
}

/// Sink that logs every frame to the serial console.
#[derive(Debug, Default)]
pub struct LogSink;

impl LogSink {
    pub fn new() -> Self {
        Self
    }
}

impl UplinkSink for LogSink {
    fn forward(&mut self, frame: &[u8]) -> Result<(), UplinkError> {
        info!("uplink: frame of {} bytes ready for mesh", frame.len());
        Ok(())
    }
}

/// Decode a frame produced by the forwarder. The mesh collector side of
/// the wire uses the same layout.
pub fn decode_frame(frame: &[u8]) -> postcard::Result<Reading> {
    postcard::from_bytes(frame)
}

/// Drain the reading channel forever, forwarding each frame.
///
/// Encode and sink failures are logged and the reading dropped; the
/// next sweep pass regenerates the data, so nothing is retried here.
pub async fn run(readings: &ReadingChannel, mut sink: impl UplinkSink) {
    loop {
        let reading = readings.receive().await;
        match postcard::to_allocvec(&reading) {
            Ok(frame) => {
                if let Err(e) = sink.forward(&frame) {
                    warn!("uplink: forward failed ({e}), reading dropped");
                }
            }
            Err(e) => warn!("uplink: encode failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_roundtrip() {
        let reading = Reading::from_samples(&[2150, 4870]).unwrap();
        let frame = postcard::to_allocvec(&reading).unwrap();
        assert_eq!(decode_frame(&frame).unwrap(), reading);
    }
}
