use std::fmt;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use crate::params::KnobId;

/// Non-fatal problems found during one processing cycle.
///
/// A cycle that hits one of these is skipped or partially applied and the
/// next cycle starts fresh; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    /// No full input frame was waiting
    NoReaderFrame,
    /// No empty output frame was available
    NoWriterFrame,
    /// A control message carried a value outside the knob's range
    RejectedKnob { knob: KnobId, value: i32 },
    /// The output frame was shorter than the input; the tail was not filtered
    Truncated { dropped: usize },
}

impl CycleError {
    /// Stable numeric code for logs that only carry integers.
    pub fn code(&self) -> u32 {
        match self {
            CycleError::NoReaderFrame => 1,
            CycleError::NoWriterFrame => 2,
            CycleError::RejectedKnob { .. } => 3,
            CycleError::Truncated { .. } => 4,
        }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleError::NoReaderFrame => write!(f, "no reader frame"),
            CycleError::NoWriterFrame => write!(f, "no writer frame"),
            CycleError::RejectedKnob { knob, value } => {
                write!(f, "rejected {} = {} from control queue", knob, value)
            }
            CycleError::Truncated { dropped } => {
                write!(f, "output frame too small, dropped {} samples", dropped)
            }
        }
    }
}

impl std::error::Error for CycleError {}

/// Where a cycle reports its errors.
///
/// Implementations called from the audio thread must not block or allocate.
pub trait ErrorReporter {
    fn log_error(&mut self, error: CycleError);
}

/// Collects errors in order, for offline runs and tests.
impl ErrorReporter for Vec<CycleError> {
    fn log_error(&mut self, error: CycleError) {
        self.push(error);
    }
}

/// Realtime reporter. Errors are dropped when the ring is full.
#[cfg(feature = "rtrb")]
impl ErrorReporter for Producer<CycleError> {
    fn log_error(&mut self, error: CycleError) {
        let _ = self.push(error);
    }
}

/// Ring for moving errors off the audio thread; drain the consumer elsewhere.
#[cfg(feature = "rtrb")]
pub fn error_channel(capacity: usize) -> (Producer<CycleError>, Consumer<CycleError>) {
    RingBuffer::new(capacity)
}
