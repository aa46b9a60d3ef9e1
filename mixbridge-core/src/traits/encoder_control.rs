use crate::models::error::EngineError;

/// Control boundary to the external encoding engine.
///
/// Each `signal` handshake operates on a fresh session obtained from
/// `open_session`; the encoder's internals are opaque to this crate.
pub trait EncoderControl: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn EncoderSession>, EngineError>;
}

/// One media session with the external encoder.
///
/// Offer and answer payloads are opaque SDP-like strings; this crate never
/// parses them.
pub trait EncoderSession: Send {
    /// Submit an offer, returning the encoder's answer.
    fn signal(&mut self, offer: &str) -> Result<String, EngineError>;

    /// Ask the encoder to begin producing the media stream for this session.
    ///
    /// The encoder may tolerate a start request before the answer round-trip
    /// completes; that is its call, not enforced here.
    fn start_stream(&mut self) -> Result<(), EngineError>;
}
