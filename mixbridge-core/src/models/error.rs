use thiserror::Error;

/// Errors that can occur while capturing, mixing, or streaming audio.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("signaling error: {0}")]
    Signaling(String),

    #[error("signaling request already in flight")]
    SignalingBusy,

    #[error("no signaling session established")]
    NoSession,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture engine stopped")]
    EngineStopped,

    #[error("unknown surface: {0}")]
    UnknownSurface(u32),
}
