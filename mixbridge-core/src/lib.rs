//! # mixbridge-core
//!
//! Platform-agnostic capture core.
//!
//! Provides the source registry and mix bus, fixed-size PCM frame encoding,
//! the enumerated control protocol, and the signaling state machine. Host
//! integrations supply the capture, playback, transport, and encoder-control
//! backends by implementing the traits in [`traits`] and plug into the
//! runtime in `mixbridge-engine`.
//!
//! ## Architecture
//!
//! ```text
//! mixbridge-core (this crate)
//! ├── traits/       ← SourceProvider, LoopbackOutput, FrameSink, EncoderControl
//! ├── models/       ← EngineError, Frame, StreamingMode, SignalingState, EngineConfig
//! ├── processing/   ← MixBus, FrameChunker, FrameQueue
//! └── protocol/     ← CaptureCommand, EngineEvent
//! ```

pub mod models;
pub mod processing;
pub mod protocol;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::EngineConfig;
pub use models::error::EngineError;
pub use models::frame::{Frame, StreamingMode, FRAME_SIZE_BYTES, SAMPLES_PER_FRAME};
pub use models::signaling::SignalingState;
pub use processing::frame_chunker::FrameChunker;
pub use processing::frame_queue::FrameQueue;
pub use processing::mix_bus::{MixBus, SourceId};
pub use protocol::messages::{CaptureCommand, EngineEvent};
pub use traits::encoder_control::{EncoderControl, EncoderSession};
pub use traits::frame_sink::FrameSink;
pub use traits::loopback::LoopbackOutput;
pub use traits::source_provider::{DeviceConstraints, SourceProvider, SourceStream};
