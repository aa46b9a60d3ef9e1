use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{select, tick, unbounded, Receiver, Sender};

use mixbridge_core::models::frame::FRAME_DURATION_MS;
use mixbridge_core::{
    CaptureCommand, DeviceConstraints, EngineConfig, EngineError, EngineEvent, FrameChunker,
    FrameSink, LoopbackOutput, MixBus, SourceId, SourceProvider, SourceStream, SAMPLES_PER_FRAME,
};

use crate::transport::{FrameTransport, WsSink};

/// Handle to a running capture engine.
///
/// The engine runs on its own thread; this is the orchestrator side of the
/// control channel. `shutdown` (or dropping the handle) tears the engine down
/// and waits for its thread to finish.
pub struct EngineHandle {
    commands: Sender<CaptureCommand>,
    events: Receiver<EngineEvent>,
    thread: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    /// Sender half of the control channel.
    pub fn commands(&self) -> Sender<CaptureCommand> {
        self.commands.clone()
    }

    /// Receiver for the engine's non-fatal error reports.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.events.clone()
    }

    /// Request teardown and wait for the engine thread to finish.
    pub fn shutdown(mut self) {
        let _ = self.commands.send(CaptureCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(CaptureCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// How a pending attach acquires its stream.
enum AttachRequest {
    Surface(String),
    Device(String),
}

/// Outcome of a worker-thread capture request, tagged with the epoch it was
/// issued under so stale resolutions can be discarded.
struct AttachResolution {
    id: SourceId,
    epoch: u64,
    result: Result<Box<dyn SourceStream>, EngineError>,
}

/// The capture engine context.
///
/// Owns the live mixing graph and frame production. Runs a dedicated thread
/// that multiplexes the control channel, capture resolutions, and a 20 ms mix
/// tick; nothing here is shared by reference with the orchestrator side.
pub struct CaptureEngine;

impl CaptureEngine {
    /// Start the engine, connecting the frame transport to the encoder port
    /// in `config`.
    ///
    /// A transport that fails to connect is reported as a non-fatal error;
    /// the engine still runs and drops frames until torn down.
    pub fn spawn(
        config: EngineConfig,
        provider: Arc<dyn SourceProvider>,
        loopback: Option<Box<dyn LoopbackOutput>>,
    ) -> Result<EngineHandle, EngineError> {
        config.validate().map_err(EngineError::ConfigurationFailed)?;
        let sink = match WsSink::connect(config.transport_port) {
            Ok(sink) => Some(Box::new(sink) as Box<dyn FrameSink>),
            Err(err) => {
                log::warn!("frame transport unavailable: {err}");
                None
            }
        };
        Self::spawn_with_sink(config, provider, loopback, sink)
    }

    /// Start the engine with a caller-supplied frame sink (`None` for a link
    /// that never came up).
    pub fn spawn_with_sink(
        config: EngineConfig,
        provider: Arc<dyn SourceProvider>,
        loopback: Option<Box<dyn LoopbackOutput>>,
        sink: Option<Box<dyn FrameSink>>,
    ) -> Result<EngineHandle, EngineError> {
        let (commands_tx, commands_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();

        let transport = match sink {
            Some(sink) => FrameTransport::start(sink, config.mode, events_tx.clone()),
            None => {
                let _ = events_tx.send(EngineEvent::Error {
                    message: "frame transport not connected".into(),
                });
                FrameTransport::unconnected()
            }
        };

        let thread = thread::Builder::new()
            .name("capture-engine".into())
            .spawn(move || {
                let (resolutions_tx, resolutions_rx) = unbounded();
                let mut runtime = EngineRuntime {
                    bus: MixBus::new(),
                    chunker: FrameChunker::new(),
                    transport,
                    provider,
                    loopback,
                    loopback_enabled: config.loopback,
                    pending: HashMap::new(),
                    next_epoch: 0,
                    resolutions_tx,
                };
                runtime.run(&commands_rx, &resolutions_rx);
            })
            .map_err(|e| EngineError::CaptureFailed(format!("engine thread: {e}")))?;

        Ok(EngineHandle {
            commands: commands_tx,
            events: events_rx,
            thread: Some(thread),
        })
    }
}

struct EngineRuntime {
    bus: MixBus,
    chunker: FrameChunker,
    transport: FrameTransport,
    provider: Arc<dyn SourceProvider>,
    loopback: Option<Box<dyn LoopbackOutput>>,
    loopback_enabled: bool,
    /// Current epoch per source id with an attach in flight. A resolution is
    /// applied only if its epoch is still the one recorded here; anything
    /// else was detached (or replaced) while pending and gets discarded.
    pending: HashMap<SourceId, u64>,
    next_epoch: u64,
    resolutions_tx: Sender<AttachResolution>,
}

impl EngineRuntime {
    fn run(
        &mut self,
        commands: &Receiver<CaptureCommand>,
        resolutions: &Receiver<AttachResolution>,
    ) {
        let ticker = tick(Duration::from_millis(FRAME_DURATION_MS));

        loop {
            select! {
                recv(commands) -> msg => match msg {
                    Ok(command) => {
                        if self.handle_command(command) {
                            break;
                        }
                    }
                    // Orchestrator side is gone; tear down.
                    Err(_) => break,
                },
                recv(resolutions) -> msg => {
                    if let Ok(resolution) = msg {
                        self.handle_resolution(resolution);
                    }
                },
                recv(ticker) -> _ => self.mix_tick(),
            }
        }

        self.bus.clear();
        log::info!("capture engine stopped");
    }

    /// Apply one control command. Returns true on shutdown.
    fn handle_command(&mut self, command: CaptureCommand) -> bool {
        match command {
            CaptureCommand::StartSurface {
                surface_id,
                media_source_id,
            } => {
                self.begin_attach(
                    SourceId::Surface(surface_id),
                    AttachRequest::Surface(media_source_id),
                );
            }
            CaptureCommand::StopSurface { surface_id } => {
                self.detach(SourceId::Surface(surface_id));
            }
            CaptureCommand::SetMuted { surface_id, muted } => {
                self.bus.set_muted(&SourceId::Surface(surface_id), muted);
            }
            CaptureCommand::SetLoopback { enabled } => {
                self.loopback_enabled = enabled;
            }
            CaptureCommand::StartExternal { device_id } => {
                self.begin_attach(
                    SourceId::External(device_id.clone()),
                    AttachRequest::Device(device_id),
                );
            }
            CaptureCommand::StopExternal { device_id } => {
                self.detach(SourceId::External(device_id));
            }
            CaptureCommand::Shutdown => return true,
        }
        false
    }

    /// Kick off a capture request on a worker thread.
    ///
    /// Provider calls may block arbitrarily long (permission prompts, device
    /// negotiation) and must never stall the mix tick.
    fn begin_attach(&mut self, id: SourceId, request: AttachRequest) {
        self.next_epoch += 1;
        let epoch = self.next_epoch;
        self.pending.insert(id.clone(), epoch);

        let provider = Arc::clone(&self.provider);
        let resolutions = self.resolutions_tx.clone();
        let spawned = thread::Builder::new()
            .name("source-attach".into())
            .spawn(move || {
                let result = match request {
                    AttachRequest::Surface(token) => provider.open_surface(&token),
                    AttachRequest::Device(device_id) => {
                        provider.open_device(&device_id, DeviceConstraints::raw())
                    }
                };
                let _ = resolutions.send(AttachResolution { id, epoch, result });
            });

        if let Err(e) = spawned {
            log::error!("unable to spawn attach worker: {e}");
        }
    }

    fn detach(&mut self, id: SourceId) {
        // Invalidate any attach still in flight for this id; its resolution
        // will arrive with a stale epoch and be discarded.
        self.pending.remove(&id);
        self.bus.detach(&id);
    }

    fn handle_resolution(&mut self, resolution: AttachResolution) {
        let current = self.pending.get(&resolution.id).copied();
        if current != Some(resolution.epoch) {
            // Detached (or re-attached) while the capture request was pending.
            if let Ok(mut stream) = resolution.result {
                log::debug!("discarding stale capture for {}", resolution.id);
                stream.stop();
            }
            return;
        }

        self.pending.remove(&resolution.id);
        match resolution.result {
            Ok(stream) => {
                log::info!("source {} attached", resolution.id);
                self.bus.attach(resolution.id, stream);
            }
            Err(err) => {
                // Transient device failure: the bus is left unaffected and
                // the rest of the session keeps running.
                log::warn!("unable to start capture for {}: {err}", resolution.id);
            }
        }
    }

    /// Produce one frame's worth of bus audio: mix, loopback, encode, offer.
    fn mix_tick(&mut self) {
        let mut block = [0.0f32; SAMPLES_PER_FRAME];
        self.bus.mix_into(&mut block);

        if self.loopback_enabled {
            if let Some(loopback) = self.loopback.as_mut() {
                loopback.render(&block);
            }
        }

        for frame in self.chunker.push(&block) {
            self.transport.offer(frame);
        }
    }
}
