use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, RingBuffer};

use super::{KnobId, ParamError};
#[cfg(feature = "rtrb")]
use super::ParamStore;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlMessage {
    SetKnob { knob: KnobId, value: i32 },
    /// Silence every history line and stage memory
    ResetHistory,
}

pub trait ControlReceiver: Send {
    fn pop(&mut self) -> Option<ControlMessage>;
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

impl ControlReceiver for VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}

/// Sending side of the control channel, held by a non-realtime thread.
///
/// Ranges are checked here so out-of-range values never reach the audio
/// thread.
#[cfg(feature = "rtrb")]
pub struct ParamHandle {
    tx: Producer<ControlMessage>,
    ranges: [(i32, i32); KnobId::COUNT],
}

#[cfg(feature = "rtrb")]
impl ParamHandle {
    /// Create a channel whose handle validates against `store`'s ranges.
    pub fn channel(store: &ParamStore, capacity: usize) -> (Self, Consumer<ControlMessage>) {
        let (tx, rx) = RingBuffer::<ControlMessage>::new(capacity);
        let ranges = KnobId::ALL.map(|id| {
            let range = store.range(id);
            (*range.start(), *range.end())
        });
        (Self { tx, ranges }, rx)
    }

    pub fn set(&mut self, knob: KnobId, value: i32) -> Result<(), ParamError> {
        let (min, max) = self.ranges[knob.index()];
        if value < min || value > max {
            return Err(ParamError::OutOfRange {
                knob,
                value,
                min,
                max,
            });
        }
        self.send(ControlMessage::SetKnob { knob, value })
    }

    pub fn reset_history(&mut self) -> Result<(), ParamError> {
        self.send(ControlMessage::ResetHistory)
    }

    fn send(&mut self, msg: ControlMessage) -> Result<(), ParamError> {
        self.tx.push(msg).map_err(|_| ParamError::QueueFull)
    }
}
