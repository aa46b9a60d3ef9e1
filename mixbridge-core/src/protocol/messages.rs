use serde::{Deserialize, Serialize};

/// Commands the orchestrator sends to the capture engine.
///
/// The control channel is typed and ordered; every payload is an owned value
/// (the contexts share nothing by reference). The serde envelope lets a host
/// that splits the contexts across processes move these as JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum CaptureCommand {
    /// Begin capturing a surface. The orchestrator has already resolved the
    /// surface id to the capture token the provider needs.
    #[serde(rename = "capture/start-surface")]
    StartSurface {
        surface_id: u32,
        media_source_id: String,
    },

    /// Stop capturing a surface. No-op if it is not attached.
    #[serde(rename = "capture/stop-surface")]
    StopSurface { surface_id: u32 },

    /// Mute or unmute one surface's contribution to the bus.
    #[serde(rename = "capture/set-muted")]
    SetMuted { surface_id: u32, muted: bool },

    /// Toggle local audible playback of the mix.
    #[serde(rename = "capture/set-loopback")]
    SetLoopback { enabled: bool },

    /// Attach an external input device (raw, unprocessed audio).
    #[serde(rename = "capture/start-external")]
    StartExternal { device_id: String },

    /// Detach an external input device. No-op if it is not attached.
    #[serde(rename = "capture/stop-external")]
    StopExternal { device_id: String },

    /// Stop all sources and tear the engine down.
    #[serde(rename = "capture/shutdown")]
    Shutdown,
}

/// Events the capture engine reports back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    /// Non-fatal transport or device error; mixing continues.
    #[serde(rename = "engine/error")]
    Error { message: String },
}
