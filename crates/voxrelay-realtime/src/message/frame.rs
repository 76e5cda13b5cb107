//! Fixed-size PCM audio frame contract.
//!
//! One binary message carries 20 ms of 8 kHz mono audio as 160 signed
//! 16-bit little-endian samples.

use bytes::Bytes;

use voxrelay_core::error::AppError;

/// Sample rate of the relayed audio.
pub const SAMPLE_RATE_HZ: u32 = 8_000;
/// Duration covered by one frame.
pub const FRAME_DURATION_MS: u32 = 20;
/// Samples per frame.
pub const SAMPLES_PER_FRAME: usize = (SAMPLE_RATE_HZ * FRAME_DURATION_MS / 1_000) as usize;
/// Bytes per 16-bit sample.
pub const BYTES_PER_SAMPLE: usize = 2;
/// Exact byte length of a valid frame.
pub const FRAME_SIZE: usize = SAMPLES_PER_FRAME * BYTES_PER_SAMPLE;

/// A binary payload that satisfies the frame contract.
///
/// Cloning is cheap; every listener shares the same buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFrame(Bytes);

impl AudioFrame {
    /// The raw frame bytes, forwarded verbatim.
    pub fn as_bytes(&self) -> &Bytes {
        &self.0
    }
}

impl TryFrom<Bytes> for AudioFrame {
    type Error = AppError;

    fn try_from(payload: Bytes) -> Result<Self, Self::Error> {
        if payload.len() != FRAME_SIZE {
            return Err(AppError::protocol(format!(
                "Frame must be exactly {FRAME_SIZE} bytes, got {}",
                payload.len()
            )));
        }
        Ok(Self(payload))
    }
}
