//! Block exchange with whatever hosts the processor.
//!
//! The processor never owns audio buffers. Each cycle it borrows one full
//! frame from a [`BlockReader`] and one empty frame from a [`BlockWriter`],
//! then hands both back. Anything that can lend frames this way can drive it:
//! the rtrb-backed [`pipe`] used by the live runner, or a test double.
//!
//! ```text
//!   producer ──▶ [ full frames ] ──▶ reader ──▶ run_cycle ──▶ writer ──▶ [ full frames ] ──▶ consumer
//!                    ▲                  │                        ▲
//!                    └── free frames ◀──┘                        └── free frames
//! ```

/// Fixed-capacity PCM frame.
pub mod frame;
/// Per-cycle errors and where they get reported.
pub mod log;
/// Frame pool moving between two rtrb rings.
#[cfg(feature = "rtrb")]
pub mod pipe;

pub use frame::Frame;
pub use log::{CycleError, ErrorReporter};
#[cfg(feature = "rtrb")]
pub use pipe::{pipe, PipeReader, PipeWriter};

/// Source of full input frames.
pub trait BlockReader {
    /// Full frames ready to be acquired, counting one already held.
    fn readable(&self) -> usize;

    /// Borrow the next full frame. Repeated calls before
    /// [`release_readable`](BlockReader::release_readable) return the same frame.
    fn acquire_readable(&mut self) -> Option<&Frame>;

    /// Give the held frame back to be refilled.
    fn release_readable(&mut self);
}

/// Sink taking filled output frames.
pub trait BlockWriter {
    /// Empty frames ready to be acquired, counting one already held.
    fn writable(&self) -> usize;

    /// Borrow an empty frame to write into.
    fn acquire_writable(&mut self) -> Option<&mut Frame>;

    /// Send the held frame on with `len` valid samples.
    fn publish_writable(&mut self, len: usize);
}
