//! Head-padded history with an explicit carry step.
//!
//! ```text
//! index:  0 .. depth-1 | depth .. depth+block-1
//!         carried tail | samples of this block
//! ```
//!
//! Taps are plain `cursor - 1 - offset` indexing into one contiguous slice.
//! At the end of each block the trailing `depth` samples are copied back to
//! the head so the next block starts with its history in place.

use super::history::History;

pub struct CarryWindow {
    buffer: Vec<f32>,
    /// Next write index; everything below it is committed
    cursor: usize,
    pending: usize,
    depth: usize,
}

impl CarryWindow {
    /// Copy the last `depth` committed samples to the head of the buffer and
    /// restart the cursor right after them.
    ///
    /// # Panics
    /// If fewer than `depth` samples are committed.
    pub fn carry_tail(&mut self, depth: usize) {
        assert!(
            depth <= self.cursor,
            "cannot carry {} samples, only {} committed",
            depth,
            self.cursor
        );
        self.buffer.copy_within(self.cursor - depth..self.cursor, 0);
        self.cursor = depth;
        self.pending = 0;
    }

    /// Committed samples, oldest first, including the carried head.
    pub fn committed(&self) -> &[f32] {
        &self.buffer[..self.cursor]
    }
}

impl History for CarryWindow {
    fn with_depth(depth: usize, block_capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; depth + block_capacity.max(1)],
            cursor: depth,
            pending: 0,
            depth,
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn append(&mut self, block: &[f32]) {
        let start = self.cursor + self.pending;
        assert!(
            start + block.len() <= self.buffer.len(),
            "block of {} samples overruns window of {}",
            block.len(),
            self.buffer.len()
        );
        self.buffer[start..start + block.len()].copy_from_slice(block);
        self.pending += block.len();
    }

    fn advance(&mut self, count: usize) {
        self.cursor = (self.cursor + count).min(self.buffer.len());
        self.pending = self.pending.saturating_sub(count);
    }

    #[inline]
    fn push(&mut self, sample: f32) {
        debug_assert_eq!(self.pending, 0, "push over staged samples");
        self.buffer[self.cursor] = sample;
        self.advance(1);
    }

    #[inline]
    fn tap_at(&self, offset: usize) -> f32 {
        debug_assert!(
            offset < self.cursor,
            "tap {} beyond window history {}",
            offset,
            self.cursor
        );
        self.buffer[self.cursor - 1 - offset]
    }

    fn available(&self) -> usize {
        self.cursor
    }

    fn end_block(&mut self) {
        self.carry_tail(self.depth);
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.cursor = self.depth;
        self.pending = 0;
    }
}
