use super::frame::StreamingMode;

/// Configuration for a capture engine instance.
///
/// The transport port is obtained from the orchestrator before the engine
/// starts; the streaming mode is fixed for the engine's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Frame buffering mode (default: low latency).
    pub mode: StreamingMode,

    /// Local port of the external encoder's frame socket.
    pub transport_port: u16,

    /// Whether the mix is audible through local playback at startup.
    pub loopback: bool,
}

impl EngineConfig {
    pub fn new(mode: StreamingMode, transport_port: u16) -> Self {
        Self {
            mode,
            transport_port,
            loopback: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.transport_port == 0 {
            return Err("transport port must be non-zero".into());
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: StreamingMode::LowLatency,
            transport_port: 0,
            loopback: false,
        }
    }
}
