//! History lines: the memory a filter needs to look back across blocks.
//!
//! A filter with taps at `i - 2` or `i - 44100` needs samples that arrived in
//! earlier blocks. Every history line keeps `depth` samples from before the
//! block currently being processed, so a tap reaching `offset` samples back
//! from the most recent committed sample is valid while
//! `offset < depth + committed_this_block`.
//!
//! Two layouts satisfy that contract:
//!
//! ```text
//! HistoryRing (circular)             CarryWindow (carry-copy)
//!
//!   write_pos ─┐                       [ carried D | block samples ]
//!  [ . . . . . x . . . . . ]                       ▲ cursor
//!   wraps at D + block_capacity        tail copied to head at block end
//! ```
//!
//! The filter chain is generic over the layout and both produce the same
//! samples; the ring never moves data, the window keeps taps contiguous.

use std::fmt;

/// A line of past samples a filter stage can tap into.
pub trait History: Send {
    /// Allocate a silent line keeping `depth` samples from before each block
    /// of at most `block_capacity` samples.
    fn with_depth(depth: usize, block_capacity: usize) -> Self
    where
        Self: Sized;

    fn depth(&self) -> usize;

    /// Stage a block at the current write position without committing it.
    ///
    /// # Panics
    /// If the block does not fit in the space reserved for one block.
    fn append(&mut self, block: &[f32]);

    /// Commit `count` samples, moving the write position forward.
    fn advance(&mut self, count: usize);

    /// Write one sample and commit it. Not to be mixed with a staged block.
    fn push(&mut self, sample: f32);

    /// Sample `offset` positions before the most recent committed one.
    ///
    /// Offsets beyond [`History::available`] are a configuration bug; they
    /// trip a debug assertion and read an unrelated slot in release builds.
    fn tap_at(&self, offset: usize) -> f32;

    /// Number of offsets `tap_at` can currently serve.
    fn available(&self) -> usize;

    /// Called once every sample of the current block has been committed.
    fn end_block(&mut self);

    /// Back to silence.
    fn reset(&mut self);

    fn try_tap_at(&self, offset: usize) -> Result<f32, HistoryError> {
        let available = self.available();
        if offset < available {
            Ok(self.tap_at(offset))
        } else {
            Err(HistoryError::TapOutOfRange { offset, available })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// Tap reaches further back than the line retains
    TapOutOfRange { offset: usize, available: usize },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::TapOutOfRange { offset, available } => write!(
                f,
                "tap {} samples back exceeds the {} samples held in history",
                offset, available
            ),
        }
    }
}

impl std::error::Error for HistoryError {}

/// Circular history addressed by `(write_pos - 1 - offset) mod capacity`.
pub struct HistoryRing {
    buffer: Vec<f32>,
    write_pos: usize,
    /// Staged by `append` but not yet committed
    pending: usize,
    depth: usize,
}

impl HistoryRing {
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

impl History for HistoryRing {
    fn with_depth(depth: usize, block_capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; depth + block_capacity.max(1)],
            write_pos: 0,
            pending: 0,
            depth,
        }
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn append(&mut self, block: &[f32]) {
        let capacity = self.buffer.len();
        assert!(
            self.pending + block.len() <= capacity - self.depth,
            "block of {} samples does not fit in a ring of {} with depth {}",
            block.len(),
            capacity,
            self.depth
        );

        let start = self.write_pos + self.pending;
        for (i, &sample) in block.iter().enumerate() {
            self.buffer[(start + i) % capacity] = sample;
        }
        self.pending += block.len();
    }

    fn advance(&mut self, count: usize) {
        self.write_pos = (self.write_pos + count) % self.buffer.len();
        self.pending = self.pending.saturating_sub(count);
    }

    #[inline]
    fn push(&mut self, sample: f32) {
        debug_assert_eq!(self.pending, 0, "push over staged samples");
        self.buffer[self.write_pos] = sample;
        self.advance(1);
    }

    #[inline]
    fn tap_at(&self, offset: usize) -> f32 {
        debug_assert!(
            offset < self.available(),
            "tap {} beyond ring history {}",
            offset,
            self.available()
        );
        let capacity = self.buffer.len();
        self.buffer[(self.write_pos + capacity - 1 - offset) % capacity]
    }

    fn available(&self) -> usize {
        self.buffer.len() - self.pending
    }

    fn end_block(&mut self) {
        // The cursor already sits after the newest sample
        self.pending = 0;
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.pending = 0;
    }
}
