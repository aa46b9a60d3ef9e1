use std::collections::VecDeque;

use crate::models::frame::{Frame, StreamingMode};

/// Bounded FIFO of frames awaiting delivery to the transport.
///
/// Capacity is fixed by the streaming mode for the session's lifetime: one
/// frame in low-latency mode, fifty (one second) in throughput mode. Frames
/// keep strict production order; on overflow the oldest frame is evicted and
/// returned so the caller can account for it.
#[derive(Debug)]
pub struct FrameQueue {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameQueue {
    pub fn new(mode: StreamingMode) -> Self {
        let capacity = mode.frame_capacity();
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Enqueue a frame, returning the evicted oldest frame if full.
    pub fn push(&mut self, frame: Frame) -> Option<Frame> {
        let evicted = if self.frames.len() == self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(frame);
        evicted
    }

    /// Dequeue the oldest frame.
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::SAMPLES_PER_FRAME;

    fn frame_with_level(level: f32) -> Frame {
        Frame::from_samples(&vec![level; SAMPLES_PER_FRAME])
    }

    fn first_sample(frame: &Frame) -> i16 {
        i16::from_le_bytes([frame.as_bytes()[0], frame.as_bytes()[1]])
    }

    #[test]
    fn fifo_order() {
        let mut queue = FrameQueue::new(StreamingMode::Throughput);
        queue.push(frame_with_level(0.1));
        queue.push(frame_with_level(0.2));
        queue.push(frame_with_level(0.3));

        let a = first_sample(&queue.pop().unwrap());
        let b = first_sample(&queue.pop().unwrap());
        let c = first_sample(&queue.pop().unwrap());
        assert!(a < b && b < c);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn low_latency_holds_exactly_one_frame() {
        let mut queue = FrameQueue::new(StreamingMode::LowLatency);
        assert_eq!(queue.capacity(), 1);

        assert!(queue.push(frame_with_level(0.1)).is_none());
        let evicted = queue.push(frame_with_level(0.2));
        assert!(evicted.is_some());
        assert_eq!(queue.len(), 1);

        // The newest frame survives.
        let kept = queue.pop().unwrap();
        assert_eq!(first_sample(&kept), first_sample(&frame_with_level(0.2)));
    }

    #[test]
    fn throughput_capacity_is_one_second() {
        let mut queue = FrameQueue::new(StreamingMode::Throughput);
        assert_eq!(queue.capacity(), 50);

        for _ in 0..50 {
            assert!(queue.push(Frame::silence()).is_none());
        }
        assert!(queue.push(Frame::silence()).is_some());
        assert_eq!(queue.len(), 50);
    }

    #[test]
    fn clear_empties_queue() {
        let mut queue = FrameQueue::new(StreamingMode::Throughput);
        queue.push(Frame::silence());
        queue.push(Frame::silence());
        queue.clear();
        assert!(queue.is_empty());
    }
}
