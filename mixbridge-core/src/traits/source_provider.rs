use crate::models::error::EngineError;

/// Processing constraints for a device capture request.
///
/// The mix bus must carry the raw signal unmodified for downstream encoding,
/// so external captures disable every browser-style enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl DeviceConstraints {
    /// Raw, unprocessed audio with all enhancements off.
    pub fn raw() -> Self {
        Self {
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
        }
    }
}

/// A live audio stream owned by the source registry.
///
/// Delivers interleaved stereo f32 samples at the bus rate. `read` is called
/// from the mix tick and must not block.
pub trait SourceStream: Send {
    /// Pull up to `out.len()` interleaved samples into `out`.
    ///
    /// Returns the number of samples written; fewer than requested means the
    /// stream has no more audio ready and the gap is treated as silence.
    fn read(&mut self, out: &mut [f32]) -> usize;

    /// Whether the underlying stream has ended (e.g. its surface went away).
    /// Ended streams are removed from the bus during the next mix pass.
    fn has_ended(&self) -> bool;

    /// Stop all underlying tracks and release the device.
    ///
    /// Called on detach; after this returns no audio from the stream may
    /// reach the bus, even if native cleanup finishes later in the background.
    fn stop(&mut self);
}

/// Host-supplied factory for capture streams.
///
/// Implementations wrap whatever capture API the host has (tab capture,
/// `getUserMedia`-style device capture). Both calls may block for arbitrary
/// time on permission prompts or device negotiation, so the engine invokes
/// them from worker threads, never from the mix tick.
pub trait SourceProvider: Send + Sync {
    /// Open a capture stream for a surface, identified by the correlation
    /// token the orchestrator resolved for it.
    fn open_surface(&self, media_source_id: &str) -> Result<Box<dyn SourceStream>, EngineError>;

    /// Open a capture stream for an external input device.
    fn open_device(
        &self,
        device_id: &str,
        constraints: DeviceConstraints,
    ) -> Result<Box<dyn SourceStream>, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_constraints_disable_everything() {
        let c = DeviceConstraints::raw();
        assert!(!c.echo_cancellation);
        assert!(!c.noise_suppression);
        assert!(!c.auto_gain_control);
    }
}
