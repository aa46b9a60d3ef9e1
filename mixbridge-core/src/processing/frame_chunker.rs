use crate::models::frame::{Frame, SAMPLES_PER_FRAME};

/// Slices the continuous mix-bus output into fixed-size frames.
///
/// Samples are pushed in arbitrary block sizes; complete frames come out in
/// production order and any remainder is carried into the next push. The
/// chunker never pads; a frame is emitted only once 20 ms of audio exists.
pub struct FrameChunker {
    pending: Vec<f32>,
}

impl FrameChunker {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(SAMPLES_PER_FRAME * 2),
        }
    }

    /// Append bus samples and return every frame completed by them.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Frame> {
        self.pending.extend_from_slice(samples);

        let complete = self.pending.len() / SAMPLES_PER_FRAME;
        if complete == 0 {
            return Vec::new();
        }

        let mut frames = Vec::with_capacity(complete);
        for chunk in self.pending[..complete * SAMPLES_PER_FRAME].chunks_exact(SAMPLES_PER_FRAME) {
            frames.push(Frame::from_samples(chunk));
        }
        self.pending.drain(..complete * SAMPLES_PER_FRAME);
        frames
    }

    /// Interleaved samples buffered but not yet forming a whole frame.
    pub fn pending_samples(&self) -> usize {
        self.pending.len()
    }

    pub fn reset(&mut self) {
        self.pending.clear();
    }
}

impl Default for FrameChunker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::FRAME_SIZE_BYTES;

    #[test]
    fn emits_nothing_until_a_full_frame() {
        let mut chunker = FrameChunker::new();
        assert!(chunker.push(&[0.0; SAMPLES_PER_FRAME - 1]).is_empty());
        assert_eq!(chunker.pending_samples(), SAMPLES_PER_FRAME - 1);
    }

    #[test]
    fn emits_whole_frames_and_keeps_remainder() {
        let mut chunker = FrameChunker::new();
        let frames = chunker.push(&vec![0.1; SAMPLES_PER_FRAME * 2 + 100]);

        assert_eq!(frames.len(), 2);
        assert_eq!(chunker.pending_samples(), 100);
        for frame in &frames {
            assert_eq!(frame.as_bytes().len(), FRAME_SIZE_BYTES);
        }
    }

    #[test]
    fn frames_come_out_in_production_order() {
        let mut chunker = FrameChunker::new();

        let mut samples = vec![0.0f32; SAMPLES_PER_FRAME * 2];
        samples[..SAMPLES_PER_FRAME].fill(0.25);
        samples[SAMPLES_PER_FRAME..].fill(0.75);

        let frames = chunker.push(&samples);
        assert_eq!(frames.len(), 2);

        let first = i16::from_le_bytes([frames[0].as_bytes()[0], frames[0].as_bytes()[1]]);
        let second = i16::from_le_bytes([frames[1].as_bytes()[0], frames[1].as_bytes()[1]]);
        assert!(first < second);
    }

    #[test]
    fn remainder_completes_on_next_push() {
        let mut chunker = FrameChunker::new();
        assert!(chunker.push(&vec![0.0; SAMPLES_PER_FRAME / 2]).is_empty());
        let frames = chunker.push(&vec![0.0; SAMPLES_PER_FRAME / 2]);
        assert_eq!(frames.len(), 1);
        assert_eq!(chunker.pending_samples(), 0);
    }

    #[test]
    fn reset_discards_partial_audio() {
        let mut chunker = FrameChunker::new();
        chunker.push(&[0.5; 500]);
        chunker.reset();
        assert_eq!(chunker.pending_samples(), 0);
    }
}
