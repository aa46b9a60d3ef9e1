use serde::{Deserialize, Serialize};

/// Sample rate of the mix bus in Hz.
pub const SAMPLE_RATE: u32 = 48_000;
/// Number of interleaved channels on the bus.
pub const NUM_CHANNELS: usize = 2;
/// Bytes per 16-bit PCM sample.
pub const BYTES_PER_SAMPLE: usize = 2;
/// Duration of one frame in milliseconds.
pub const FRAME_DURATION_MS: u64 = 20;
/// Samples per channel in one frame: 48000 Hz * 0.02 s = 960.
pub const SAMPLES_PER_CHANNEL: usize =
    (SAMPLE_RATE as usize / 1000) * FRAME_DURATION_MS as usize;
/// Interleaved samples in one frame (both channels).
pub const SAMPLES_PER_FRAME: usize = SAMPLES_PER_CHANNEL * NUM_CHANNELS;
/// Wire size of one frame in bytes: 960 * 2 channels * 2 bytes = 3840.
pub const FRAME_SIZE_BYTES: usize = SAMPLES_PER_FRAME * BYTES_PER_SAMPLE;

/// One fixed-size unit of PCM audio on the wire.
///
/// Always exactly [`FRAME_SIZE_BYTES`] bytes of 16-bit signed little-endian
/// samples, 2 interleaved channels at 48 kHz, covering 20 ms. The size is an
/// invariant of the transport protocol and never varies within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Box<[u8; FRAME_SIZE_BYTES]>,
}

impl Frame {
    /// Encode exactly one frame's worth of f32 samples as 16-bit PCM.
    ///
    /// Samples outside `[-1.0, 1.0]` are clamped.
    ///
    /// # Panics
    /// Panics if `samples.len() != SAMPLES_PER_FRAME`; callers slice the bus
    /// output into whole frames before constructing one.
    pub fn from_samples(samples: &[f32]) -> Self {
        assert_eq!(samples.len(), SAMPLES_PER_FRAME, "partial frame");

        let mut data = Box::new([0u8; FRAME_SIZE_BYTES]);
        for (i, &sample) in samples.iter().enumerate() {
            let clamped = sample.clamp(-1.0, 1.0);
            let value = (clamped * i16::MAX as f32) as i16;
            data[i * 2..i * 2 + 2].copy_from_slice(&value.to_le_bytes());
        }
        Self { data }
    }

    /// A frame of pure silence.
    pub fn silence() -> Self {
        Self {
            data: Box::new([0u8; FRAME_SIZE_BYTES]),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data.to_vec()
    }
}

/// Buffering mode for frame delivery, fixed for the session's lifetime.
///
/// Trades delivery smoothness against latency: `LowLatency` hands each frame
/// to the transport as soon as it exists, `Throughput` allows up to a second
/// of frames to smooth over socket jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamingMode {
    LowLatency,
    Throughput,
}

impl StreamingMode {
    /// Number of frames the delivery queue holds in this mode.
    pub fn frame_capacity(&self) -> usize {
        match self {
            Self::LowLatency => 1,
            Self::Throughput => 50, // 50 * 20ms = 1s
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_constants() {
        assert_eq!(SAMPLES_PER_CHANNEL, 960);
        assert_eq!(SAMPLES_PER_FRAME, 1920);
        assert_eq!(FRAME_SIZE_BYTES, 3840);
    }

    #[test]
    fn frame_is_always_3840_bytes() {
        let silence = Frame::silence();
        assert_eq!(silence.as_bytes().len(), FRAME_SIZE_BYTES);

        let loud = Frame::from_samples(&[1.0; SAMPLES_PER_FRAME]);
        assert_eq!(loud.as_bytes().len(), FRAME_SIZE_BYTES);
        assert_eq!(loud.into_bytes().len(), FRAME_SIZE_BYTES);
    }

    #[test]
    fn encodes_little_endian_i16() {
        let mut samples = [0.0f32; SAMPLES_PER_FRAME];
        samples[0] = 1.0;
        samples[1] = -1.0;
        samples[2] = 2.0; // clamped

        let frame = Frame::from_samples(&samples);
        let bytes = frame.as_bytes();

        assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[2], bytes[3]]), -i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[4], bytes[5]]), i16::MAX);
        assert_eq!(i16::from_le_bytes([bytes[6], bytes[7]]), 0);
    }

    #[test]
    #[should_panic(expected = "partial frame")]
    fn rejects_partial_frames() {
        Frame::from_samples(&[0.0; 10]);
    }

    #[test]
    fn mode_capacities() {
        assert_eq!(StreamingMode::LowLatency.frame_capacity(), 1);
        assert_eq!(StreamingMode::Throughput.frame_capacity(), 50);
    }
}
