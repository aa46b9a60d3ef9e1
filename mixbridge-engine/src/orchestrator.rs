use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use mixbridge_core::{
    CaptureCommand, EncoderControl, EngineError, EngineEvent, SignalingState,
};

use crate::engine::EngineHandle;
use crate::signaling::SignalingClient;

/// Resolves a surface id to the capture correlation token the provider needs.
///
/// The orchestrator holds only ids, never live capture handles; this is the
/// one piece of host knowledge it carries.
pub trait SurfaceResolver: Send + Sync {
    fn media_source_id(&self, surface_id: u32) -> Option<String>;
}

/// Process-wide fatal-error broadcast.
///
/// Signaling and stream-start failures affect the whole session, so they are
/// published to every subscriber rather than answered to one caller; there is
/// no partial-failure isolation at this layer. Subscribers whose receiver is
/// gone are pruned on publish.
pub struct ErrorTopic {
    subscribers: Mutex<Vec<Sender<String>>>,
}

impl ErrorTopic {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<String> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn publish(&self, message: &str) {
        log::error!("fatal: {message}");
        self.subscribers
            .lock()
            .retain(|tx| tx.send(message.to_string()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl Default for ErrorTopic {
    fn default() -> Self {
        Self::new()
    }
}

/// Controller context: bridges external control commands to the capture
/// engine and the signaling client.
///
/// Stateless with respect to audio. The engine owns the mixing graph; the
/// orchestrator only forwards enumerated commands over the control channel
/// and fans failures out.
pub struct Orchestrator {
    commands: Sender<CaptureCommand>,
    events: Receiver<EngineEvent>,
    resolver: Arc<dyn SurfaceResolver>,
    signaling: SignalingClient,
    fatal_errors: ErrorTopic,
}

impl Orchestrator {
    pub fn new(
        engine: &EngineHandle,
        resolver: Arc<dyn SurfaceResolver>,
        encoder: Arc<dyn EncoderControl>,
    ) -> Self {
        Self {
            commands: engine.commands(),
            events: engine.events(),
            resolver,
            signaling: SignalingClient::new(encoder),
            fatal_errors: ErrorTopic::new(),
        }
    }

    /// Begin capturing a surface's audio.
    ///
    /// Resolves the surface to a capture token first; an unknown surface is
    /// the caller's error and nothing is sent to the engine.
    pub fn start_surface_capture(&self, surface_id: u32) -> Result<(), EngineError> {
        let media_source_id = self
            .resolver
            .media_source_id(surface_id)
            .ok_or(EngineError::UnknownSurface(surface_id))?;
        self.send(CaptureCommand::StartSurface {
            surface_id,
            media_source_id,
        })
    }

    pub fn stop_surface_capture(&self, surface_id: u32) -> Result<(), EngineError> {
        self.send(CaptureCommand::StopSurface { surface_id })
    }

    pub fn set_surface_muted(&self, surface_id: u32, muted: bool) -> Result<(), EngineError> {
        self.send(CaptureCommand::SetMuted { surface_id, muted })
    }

    pub fn set_loopback(&self, enabled: bool) -> Result<(), EngineError> {
        self.send(CaptureCommand::SetLoopback { enabled })
    }

    pub fn start_external_capture(&self, device_id: &str) -> Result<(), EngineError> {
        self.send(CaptureCommand::StartExternal {
            device_id: device_id.to_string(),
        })
    }

    pub fn stop_external_capture(&self, device_id: &str) -> Result<(), EngineError> {
        self.send(CaptureCommand::StopExternal {
            device_id: device_id.to_string(),
        })
    }

    /// Stop all sources and tear the engine down; also closes any signaling
    /// session.
    pub fn shutdown(&self) -> Result<(), EngineError> {
        self.signaling.close();
        self.send(CaptureCommand::Shutdown)
    }

    /// Perform the offer/answer handshake with the external encoder.
    ///
    /// A failure is terminal for the session and broadcast to every
    /// fatal-error subscriber in addition to being returned.
    pub fn signal(&self, offer: &str) -> Result<String, EngineError> {
        self.signaling.signal(offer).map_err(|err| {
            self.fatal_errors.publish(&err.to_string());
            err
        })
    }

    /// Ask the encoder to start streaming the established session.
    pub fn start_stream(&self) -> Result<(), EngineError> {
        self.signaling.start_stream().map_err(|err| {
            self.fatal_errors.publish(&err.to_string());
            err
        })
    }

    pub fn signaling_state(&self) -> SignalingState {
        self.signaling.state()
    }

    /// Subscribe to fatal-error broadcasts (one receiver per observer).
    pub fn subscribe_fatal_errors(&self) -> Receiver<String> {
        self.fatal_errors.subscribe()
    }

    /// Drain the engine's non-fatal error reports accumulated so far.
    pub fn drain_engine_errors(&self) -> Vec<String> {
        self.events
            .try_iter()
            .map(|EngineEvent::Error { message }| message)
            .collect()
    }

    fn send(&self, command: CaptureCommand) -> Result<(), EngineError> {
        self.commands
            .send(command)
            .map_err(|_| EngineError::EngineStopped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_broadcasts_to_every_subscriber() {
        let topic = ErrorTopic::new();
        let a = topic.subscribe();
        let b = topic.subscribe();

        topic.publish("encoder failure");

        assert_eq!(a.recv().unwrap(), "encoder failure");
        assert_eq!(b.recv().unwrap(), "encoder failure");
    }

    #[test]
    fn topic_prunes_dead_subscribers() {
        let topic = ErrorTopic::new();
        let keep = topic.subscribe();
        drop(topic.subscribe());

        topic.publish("first");
        assert_eq!(topic.subscriber_count(), 1);
        assert_eq!(keep.recv().unwrap(), "first");
    }

    #[test]
    fn topic_with_no_subscribers_is_fine() {
        let topic = ErrorTopic::new();
        topic.publish("nobody listening");
    }
}
