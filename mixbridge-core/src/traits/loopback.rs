/// Local audible playback of the mix bus.
///
/// Host-supplied; the engine renders every mixed block into it whenever
/// loopback is enabled, independent of whether frames are being streamed.
/// Called from the mix tick, so implementations must not block; buffer and
/// hand off to the playback device instead.
pub trait LoopbackOutput: Send {
    /// Render a block of interleaved stereo f32 samples at the bus rate.
    fn render(&mut self, samples: &[f32]);
}
