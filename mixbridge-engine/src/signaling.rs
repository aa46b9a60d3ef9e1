use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use mixbridge_core::{EncoderControl, EncoderSession, EngineError, SignalingState};

struct Inner {
    state: SignalingState,
    session: Option<Arc<Mutex<Box<dyn EncoderSession>>>>,
    session_id: Option<Uuid>,
}

/// Offer/answer signaling with the external encoding engine.
///
/// Performs exactly one handshake per session: each `signal` call opens a
/// fresh encoder session, and at most one offer may be in flight at a time.
/// A second concurrent call is a caller error, not a queued renegotiation.
/// Any encoder failure is terminal for the session; the caller escalates it,
/// this client never retries.
pub struct SignalingClient {
    control: Arc<dyn EncoderControl>,
    inner: Mutex<Inner>,
}

impl SignalingClient {
    pub fn new(control: Arc<dyn EncoderControl>) -> Self {
        Self {
            control,
            inner: Mutex::new(Inner {
                state: SignalingState::Uninitialized,
                session: None,
                session_id: None,
            }),
        }
    }

    pub fn state(&self) -> SignalingState {
        self.inner.lock().state
    }

    /// Submit `offer` to the encoder and return its answer.
    ///
    /// The session is created and published under the state lock, so from the
    /// moment the state reads as in flight a session object exists. Only the
    /// offer round-trip itself runs unlocked; a second `signal` call during
    /// it fails with `SignalingBusy`.
    pub fn signal(&self, offer: &str) -> Result<String, EngineError> {
        let session = {
            let mut inner = self.inner.lock();
            if !inner.state.can_signal() {
                return Err(EngineError::SignalingBusy);
            }
            match self.control.open_session() {
                Ok(session) => {
                    let session = Arc::new(Mutex::new(session));
                    inner.state = SignalingState::Offered;
                    inner.session = Some(Arc::clone(&session));
                    inner.session_id = Some(Uuid::new_v4());
                    session
                }
                Err(err) => {
                    log::error!("signaling failed: {err}");
                    inner.session = None;
                    inner.state = SignalingState::Failed;
                    return Err(err);
                }
            }
        };

        let result = session.lock().signal(offer);

        let mut inner = self.inner.lock();
        // The session may have been closed or replaced during the round-trip;
        // in that case the state is no longer ours to advance.
        let current = inner
            .session
            .as_ref()
            .is_some_and(|s| Arc::ptr_eq(s, &session));
        match result {
            Ok(answer) => {
                if current && inner.state == SignalingState::Offered {
                    if let Some(id) = inner.session_id {
                        log::info!("signaling session {id} answered");
                    }
                    inner.state = SignalingState::Answered;
                }
                Ok(answer)
            }
            Err(err) => {
                log::error!("signaling failed: {err}");
                if current {
                    inner.session = None;
                    inner.state = SignalingState::Failed;
                }
                Err(err)
            }
        }
    }

    /// Ask the encoder to start the media stream for the current session.
    ///
    /// A start issued while an offer is still in flight waits behind the
    /// round-trip and lands once the answer does. Whether starting that early
    /// is acceptable is the encoder's call.
    pub fn start_stream(&self) -> Result<(), EngineError> {
        let session = {
            let inner = self.inner.lock();
            if !inner.state.has_session() {
                return Err(EngineError::NoSession);
            }
            match inner.session.as_ref() {
                Some(session) => Arc::clone(session),
                None => return Err(EngineError::NoSession),
            }
        };

        let result = session.lock().start_stream();

        let mut inner = self.inner.lock();
        let current = inner
            .session
            .as_ref()
            .is_some_and(|s| Arc::ptr_eq(s, &session));
        match result {
            Ok(()) => {
                if current {
                    inner.state = SignalingState::Streaming;
                    if let Some(id) = inner.session_id {
                        log::info!("signaling session {id} streaming");
                    }
                }
                Ok(())
            }
            Err(err) => {
                log::error!("stream start failed: {err}");
                if current {
                    inner.session = None;
                    inner.state = SignalingState::Failed;
                }
                Err(err)
            }
        }
    }

    /// End the current session, if any. Normal teardown, not an error.
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        if inner.session.take().is_some() {
            inner.state = SignalingState::Closed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::{bounded, Sender};
    use std::thread;

    struct FakeSession {
        answer: Result<String, EngineError>,
        stream_result: Result<(), EngineError>,
    }

    impl EncoderSession for FakeSession {
        fn signal(&mut self, _offer: &str) -> Result<String, EngineError> {
            self.answer.clone()
        }

        fn start_stream(&mut self) -> Result<(), EngineError> {
            self.stream_result.clone()
        }
    }

    struct FakeControl {
        answer: Result<String, EngineError>,
        stream_result: Result<(), EngineError>,
    }

    impl EncoderControl for FakeControl {
        fn open_session(&self) -> Result<Box<dyn EncoderSession>, EngineError> {
            Ok(Box::new(FakeSession {
                answer: self.answer.clone(),
                stream_result: self.stream_result.clone(),
            }))
        }
    }

    fn working_control() -> Arc<dyn EncoderControl> {
        Arc::new(FakeControl {
            answer: Ok("answer-A".into()),
            stream_result: Ok(()),
        })
    }

    #[test]
    fn signal_then_stream() {
        let client = SignalingClient::new(working_control());

        let answer = client.signal("offer-A").unwrap();
        assert_eq!(answer, "answer-A");
        assert_eq!(client.state(), SignalingState::Answered);

        client.start_stream().unwrap();
        assert_eq!(client.state(), SignalingState::Streaming);
    }

    #[test]
    fn stream_without_session_is_rejected() {
        let client = SignalingClient::new(working_control());
        assert_eq!(client.start_stream(), Err(EngineError::NoSession));
        assert_eq!(client.state(), SignalingState::Uninitialized);
    }

    #[test]
    fn signaling_failure_is_terminal() {
        let client = SignalingClient::new(Arc::new(FakeControl {
            answer: Err(EngineError::Signaling("encoder rejected offer".into())),
            stream_result: Ok(()),
        }));

        let err = client.signal("offer-A").unwrap_err();
        assert!(matches!(err, EngineError::Signaling(_)));
        assert_eq!(client.state(), SignalingState::Failed);

        // Terminal for the session: no stream start against it.
        assert_eq!(client.start_stream(), Err(EngineError::NoSession));
    }

    #[test]
    fn stream_failure_is_terminal() {
        let client = SignalingClient::new(Arc::new(FakeControl {
            answer: Ok("answer-A".into()),
            stream_result: Err(EngineError::Signaling("no transport".into())),
        }));

        client.signal("offer-A").unwrap();
        assert!(client.start_stream().is_err());
        assert_eq!(client.state(), SignalingState::Failed);
    }

    #[test]
    fn fresh_signal_after_close_opens_new_session() {
        let client = SignalingClient::new(working_control());
        client.signal("offer-A").unwrap();
        client.close();
        assert_eq!(client.state(), SignalingState::Closed);

        let answer = client.signal("offer-B").unwrap();
        assert_eq!(answer, "answer-A");
        assert_eq!(client.state(), SignalingState::Answered);
    }

    /// Control whose signal round-trip blocks until released, to model an
    /// in-flight offer.
    struct BlockingSession {
        release: crossbeam_channel::Receiver<()>,
    }

    impl EncoderSession for BlockingSession {
        fn signal(&mut self, _offer: &str) -> Result<String, EngineError> {
            let _ = self.release.recv();
            Ok("late-answer".into())
        }

        fn start_stream(&mut self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    struct BlockingControl {
        release_tx: Mutex<Option<Sender<()>>>,
        release_rx: crossbeam_channel::Receiver<()>,
    }

    impl EncoderControl for BlockingControl {
        fn open_session(&self) -> Result<Box<dyn EncoderSession>, EngineError> {
            Ok(Box::new(BlockingSession {
                release: self.release_rx.clone(),
            }))
        }
    }

    #[test]
    fn second_signal_while_in_flight_is_busy() {
        let (release_tx, release_rx) = bounded(1);
        let control = Arc::new(BlockingControl {
            release_tx: Mutex::new(Some(release_tx)),
            release_rx,
        });
        let client = Arc::new(SignalingClient::new(control.clone()));

        let first = {
            let client = Arc::clone(&client);
            thread::spawn(move || client.signal("offer-A"))
        };

        // Wait until the first call has marked the session in flight.
        while client.state() != SignalingState::Offered {
            thread::sleep(std::time::Duration::from_millis(1));
        }

        assert_eq!(
            client.signal("offer-B").unwrap_err(),
            EngineError::SignalingBusy
        );

        control.release_tx.lock().take();
        assert_eq!(first.join().unwrap().unwrap(), "late-answer");
        assert_eq!(client.state(), SignalingState::Answered);
    }

    #[test]
    fn early_stream_start_waits_for_in_flight_answer() {
        let (release_tx, release_rx) = bounded(1);
        let control = Arc::new(BlockingControl {
            release_tx: Mutex::new(Some(release_tx)),
            release_rx,
        });
        let client = Arc::new(SignalingClient::new(control.clone()));

        let signaler = {
            let client = Arc::clone(&client);
            thread::spawn(move || client.signal("offer-A"))
        };
        while client.state() != SignalingState::Offered {
            thread::sleep(std::time::Duration::from_millis(1));
        }

        // A session exists from the moment the offer is in flight, so an
        // early start is accepted rather than rejected as session-less.
        let starter = {
            let client = Arc::clone(&client);
            thread::spawn(move || client.start_stream())
        };

        thread::sleep(std::time::Duration::from_millis(10));
        control.release_tx.lock().take();

        assert_eq!(signaler.join().unwrap().unwrap(), "late-answer");
        starter.join().unwrap().unwrap();
        assert_eq!(client.state(), SignalingState::Streaming);
    }
}
