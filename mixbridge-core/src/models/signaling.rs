/// Signaling session state machine.
///
/// State transitions:
/// ```text
/// uninitialized → offered → answered → streaming
///                     ↓          ↓         ↓
///                  failed     failed    failed
///                                          ↓
///                                       closed
/// ```
///
/// `Failed` and `Closed` are terminal: any signaling or stream-start error
/// ends the session and is reported, never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    /// No session object exists yet.
    Uninitialized,
    /// A session exists and an offer has been submitted, awaiting answer.
    Offered,
    /// Answer received and returned to the caller; media not yet flowing.
    Answered,
    /// A stream-start request has been issued against this session.
    Streaming,
    /// Session ended normally.
    Closed,
    /// Session ended with an error.
    Failed,
}

impl SignalingState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Whether a new offer may be submitted right now.
    ///
    /// Only an in-flight offer blocks a new one; a fresh `signal` call after a
    /// completed or terminated session opens a new session.
    pub fn can_signal(&self) -> bool {
        !matches!(self, Self::Offered)
    }

    /// Whether a session object exists to start a stream against.
    pub fn has_session(&self) -> bool {
        matches!(self, Self::Offered | Self::Answered | Self::Streaming)
    }
}
