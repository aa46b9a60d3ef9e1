use std::collections::HashMap;

use crate::traits::source_provider::SourceStream;

/// Identifier for an attached audio source.
///
/// Surface sources come from capturable tab-like renderers (keyed by the
/// host's integer view id); external sources come from system input devices
/// (keyed by a stable device id string).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceId {
    Surface(u32),
    External(String),
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Surface(id) => write!(f, "surface:{id}"),
            Self::External(id) => write!(f, "device:{id}"),
        }
    }
}

struct Source {
    stream: Box<dyn SourceStream>,
    /// Per-source volume multiplier. Mute is binary: 0.0 or 1.0, no memory
    /// of any prior level.
    gain: f32,
}

/// Source registry and summing bus.
///
/// Sole owner of every attached source's stream and gain; callers elsewhere
/// hold only [`SourceId`]s. The bus output at any instant is the gain-weighted
/// sum of exactly the currently attached set.
pub struct MixBus {
    sources: HashMap<SourceId, Source>,
    scratch: Vec<f32>,
}

impl MixBus {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            scratch: Vec::new(),
        }
    }

    /// Attach a stream under `id` at full gain.
    ///
    /// If `id` is already attached the prior source is detached first, so
    /// re-attach is idempotent and never leaves two streams under one id.
    pub fn attach(&mut self, id: SourceId, stream: Box<dyn SourceStream>) {
        if self.detach(&id) {
            log::debug!("replacing already-attached source {id}");
        }
        self.sources.insert(id, Source { stream, gain: 1.0 });
    }

    /// Detach `id`, stopping its underlying tracks before the entry is gone.
    ///
    /// Returns whether a source was removed; an absent id is a silent no-op
    /// (a detach may legitimately race ahead of an attach resolving).
    pub fn detach(&mut self, id: &SourceId) -> bool {
        match self.sources.remove(id) {
            Some(mut source) => {
                source.stream.stop();
                true
            }
            None => false,
        }
    }

    /// Set the source's gain to 0 (muted) or 1 (unmuted).
    ///
    /// No-op if `id` is not attached.
    pub fn set_muted(&mut self, id: &SourceId, muted: bool) {
        if let Some(source) = self.sources.get_mut(id) {
            source.gain = if muted { 0.0 } else { 1.0 };
        }
    }

    pub fn contains(&self, id: &SourceId) -> bool {
        self.sources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Ids of every currently attached source, in no particular order.
    pub fn ids(&self) -> Vec<SourceId> {
        self.sources.keys().cloned().collect()
    }

    /// Detach everything, stopping all underlying tracks.
    pub fn clear(&mut self) {
        for (_, mut source) in self.sources.drain() {
            source.stream.stop();
        }
    }

    /// Fill `out` with the gain-weighted sum of all attached sources.
    ///
    /// A source that delivers fewer samples than requested contributes
    /// silence for the gap. Sources whose stream has ended are stopped and
    /// removed during the pass.
    pub fn mix_into(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        self.scratch.resize(out.len(), 0.0);

        let mut ended = Vec::new();
        for (id, source) in self.sources.iter_mut() {
            if source.stream.has_ended() {
                ended.push(id.clone());
                continue;
            }
            let n = source.stream.read(&mut self.scratch);
            if source.gain == 0.0 {
                continue;
            }
            for (dst, &src) in out[..n].iter_mut().zip(&self.scratch[..n]) {
                *dst += src * source.gain;
            }
        }

        for id in ended {
            log::debug!("source {id} ended, removing from bus");
            self.detach(&id);
        }
    }
}

impl Default for MixBus {
    fn default() -> Self {
        Self::new()
    }
}
