use crate::models::error::EngineError;
use crate::models::frame::Frame;

/// Byte-stream connection that carries frames to the external encoder.
///
/// Frames go on the wire as raw binary payloads with no additional framing;
/// the connection's own message boundary delimits them. An error from `send`
/// means the link has closed; the transport reports it once and stops, and
/// never reconnects on its own.
pub trait FrameSink: Send {
    fn send(&mut self, frame: Frame) -> Result<(), EngineError>;

    /// Close the connection. Errors during close are ignored.
    fn close(&mut self);
}
