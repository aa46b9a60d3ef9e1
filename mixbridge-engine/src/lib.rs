//! # mixbridge-engine
//!
//! Capture engine runtime.
//!
//! Two isolated contexts connected only by typed channels: the
//! [`Orchestrator`](orchestrator::Orchestrator) (control commands, signaling,
//! fatal-error fan-out) and the [`CaptureEngine`](engine::CaptureEngine)
//! (mixing graph, 20 ms frame production, WebSocket frame transport). Hosts
//! supply capture and playback backends via the `mixbridge-core` traits.
//!
//! ## Usage
//! ```ignore
//! use mixbridge_core::{EngineConfig, StreamingMode};
//! use mixbridge_engine::{CaptureEngine, Orchestrator};
//!
//! let config = EngineConfig::new(StreamingMode::LowLatency, encoder_port);
//! let engine = CaptureEngine::spawn(config, provider, Some(loopback))?;
//! let orchestrator = Orchestrator::new(&engine, resolver, encoder);
//! orchestrator.start_surface_capture(view_id)?;
//! ```

pub mod engine;
pub mod orchestrator;
pub mod signaling;
pub mod transport;

pub use engine::{CaptureEngine, EngineHandle};
pub use orchestrator::{ErrorTopic, Orchestrator, SurfaceResolver};
pub use signaling::SignalingClient;
pub use transport::{FrameTransport, WsSink};
