//! A fixed pool of frames shuttled between two lock-free rings.
//!
//! ```text
//!            ┌──────────── free ring ◀───────────┐
//!            ▼                                   │
//!   PipeWriter: acquire_writable          PipeReader: release_readable
//!            │                                   ▲
//!            └─ publish_writable ──▶ full ring ──┘ acquire_readable
//! ```
//!
//! Both rings hold the whole pool, so a push never fails and no frame is
//! ever dropped or allocated after `pipe` returns. Each end is `Send` and can
//! live on a different thread.

use rtrb::{Consumer, Producer, RingBuffer};

use super::{BlockReader, BlockWriter, Frame};

/// Create a pipe of `frames` frames holding `capacity` samples each.
pub fn pipe(frames: usize, capacity: usize) -> (PipeWriter, PipeReader) {
    let (mut free_tx, free_rx) = RingBuffer::<Frame>::new(frames);
    let (full_tx, full_rx) = RingBuffer::<Frame>::new(frames);
    for _ in 0..frames {
        let _ = free_tx.push(Frame::new(capacity));
    }

    let writer = PipeWriter {
        free: free_rx,
        full: full_tx,
        held: None,
        capacity,
    };
    let reader = PipeReader {
        full: full_rx,
        free: free_tx,
        held: None,
    };
    (writer, reader)
}

/// Filling end: takes empty frames, publishes full ones.
pub struct PipeWriter {
    free: Consumer<Frame>,
    full: Producer<Frame>,
    held: Option<Frame>,
    capacity: usize,
}

impl PipeWriter {
    /// Samples per frame.
    pub fn frame_capacity(&self) -> usize {
        self.capacity
    }

    /// Publish every free frame as silence. Returns how many were sent.
    ///
    /// Priming the output side of a processor this way makes it run one
    /// frame behind its input instead of starving on the first cycles.
    pub fn prime_silence(&mut self) -> usize {
        let mut primed = 0;
        while let Ok(mut frame) = self.free.pop() {
            frame.fill_silence();
            let _ = self.full.push(frame);
            primed += 1;
        }
        primed
    }
}

impl BlockWriter for PipeWriter {
    fn writable(&self) -> usize {
        usize::from(self.held.is_some()) + self.free.slots()
    }

    fn acquire_writable(&mut self) -> Option<&mut Frame> {
        if self.held.is_none() {
            self.held = self.free.pop().ok();
        }
        self.held.as_mut()
    }

    fn publish_writable(&mut self, len: usize) {
        if let Some(mut frame) = self.held.take() {
            frame.set_len(len);
            let _ = self.full.push(frame);
        }
    }
}

/// Draining end: takes full frames, returns them empty.
pub struct PipeReader {
    full: Consumer<Frame>,
    free: Producer<Frame>,
    held: Option<Frame>,
}

impl BlockReader for PipeReader {
    fn readable(&self) -> usize {
        usize::from(self.held.is_some()) + self.full.slots()
    }

    fn acquire_readable(&mut self) -> Option<&Frame> {
        if self.held.is_none() {
            self.held = self.full.pop().ok();
        }
        self.held.as_ref()
    }

    fn release_readable(&mut self) {
        if let Some(mut frame) = self.held.take() {
            frame.clear();
            let _ = self.free.push(frame);
        }
    }
}
