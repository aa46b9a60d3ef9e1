use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Sender;
use parking_lot::{Condvar, Mutex};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use mixbridge_core::{EngineError, EngineEvent, Frame, FrameQueue, FrameSink, StreamingMode};

/// WebSocket link to the external encoder's frame socket.
///
/// Each frame travels as one binary message with no additional header; the
/// message boundary is the framing.
pub struct WsSink {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
}

impl WsSink {
    /// Connect to the encoder's local socket on `port`.
    pub fn connect(port: u16) -> Result<Self, EngineError> {
        let url = format!("ws://127.0.0.1:{port}");
        let (socket, _response) = tungstenite::connect(url.as_str())
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        log::info!("frame transport connected to {url}");
        Ok(Self { socket })
    }
}

impl FrameSink for WsSink {
    fn send(&mut self, frame: Frame) -> Result<(), EngineError> {
        self.socket
            .send(Message::Binary(frame.into_bytes()))
            .map_err(|e| EngineError::Transport(e.to_string()))
    }

    fn close(&mut self) {
        let _ = self.socket.close(None);
    }
}

struct Shared {
    queue: Mutex<FrameQueue>,
    ready: Condvar,
    open: AtomicBool,
    running: AtomicBool,
}

/// Delivery path from the mix tick to the encoder socket.
///
/// Completed frames are queued (bounded by the streaming mode) and drained by
/// a dedicated sender thread, keeping socket writes off the audio path. Once
/// the link closes, whether from the remote side or a write error, exactly
/// one error event is reported. Queued frames are then discarded and every
/// later frame is dropped. Reconnecting is the caller's decision, never this
/// component's.
pub struct FrameTransport {
    shared: Arc<Shared>,
    sender: Option<thread::JoinHandle<()>>,
}

impl FrameTransport {
    /// Start draining frames into an established link.
    pub fn start(
        sink: Box<dyn FrameSink>,
        mode: StreamingMode,
        events: Sender<EngineEvent>,
    ) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(FrameQueue::new(mode)),
            ready: Condvar::new(),
            open: AtomicBool::new(true),
            running: AtomicBool::new(true),
        });

        let handle = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("frame-transport".into())
                .spawn(move || drain_loop(&shared, sink, &events))
                .expect("failed to spawn transport thread")
        };

        Self {
            shared,
            sender: Some(handle),
        }
    }

    /// A transport whose link never came up; every offered frame is dropped.
    pub fn unconnected() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(FrameQueue::new(StreamingMode::LowLatency)),
                ready: Condvar::new(),
                open: AtomicBool::new(false),
                running: AtomicBool::new(false),
            }),
            sender: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    /// Offer a completed frame for delivery. Fire-and-forget: never blocks.
    ///
    /// If the link is not open the frame is discarded rather than buffered;
    /// the engine does not accumulate unsent audio.
    pub fn offer(&self, frame: Frame) {
        if !self.is_open() {
            return;
        }
        {
            let mut queue = self.shared.queue.lock();
            if queue.push(frame).is_some() {
                // Only reachable when the sink stalls for a full queue's worth
                // of audio; the newest frames win.
                log::warn!("frame queue overflow, dropped oldest frame");
            }
        }
        self.shared.ready.notify_one();
    }

    /// Frames currently queued for delivery.
    pub fn queued(&self) -> usize {
        self.shared.queue.lock().len()
    }
}

impl Drop for FrameTransport {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.ready.notify_all();
        if let Some(handle) = self.sender.take() {
            let _ = handle.join();
        }
    }
}

fn drain_loop(shared: &Shared, mut sink: Box<dyn FrameSink>, events: &Sender<EngineEvent>) {
    loop {
        let frame = {
            let mut queue = shared.queue.lock();
            loop {
                if !shared.running.load(Ordering::SeqCst) {
                    break None;
                }
                if let Some(frame) = queue.pop() {
                    break Some(frame);
                }
                shared.ready.wait(&mut queue);
            }
        };

        let Some(frame) = frame else {
            break;
        };

        if let Err(err) = sink.send(frame) {
            shared.open.store(false, Ordering::SeqCst);
            shared.queue.lock().clear();
            log::warn!("frame link closed: {err}");
            let _ = events.send(EngineEvent::Error {
                message: format!("frame link closed: {err}"),
            });
            return; // one report per closure, no reconnect
        }
    }

    sink.close();
}
