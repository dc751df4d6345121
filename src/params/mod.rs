//! Control knobs and the dirty tracking that gates coefficient updates.
//!
//! Knobs are integer "cursor" positions moved by an external control
//! surface. Stages turn them into coefficients, which can involve `powf`,
//! `sqrt` and divisions, so a stage recomputes only when one of its knobs
//! has moved since the last recompute.
//!
//! Each knob is a two-state machine:
//!
//! ```text
//!            set(v != previous)
//!   Clean ───────────────────────▶ Dirty
//!     ▲                              │
//!     └──────── settle() ◀───────────┘
//!        (start of a cycle, after stages recompute)
//! ```
//!
//! Setting a knob back to its previous value before the cycle starts returns
//! it to Clean. Knobs start Dirty so the first cycle computes everything.

use std::fmt;
use std::ops::RangeInclusive;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Control messages from non-realtime threads.
pub mod message;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnobId {
    /// Low shelf gain, 0-10, 5 is flat
    BassGain,
    /// High shelf gain, 0-10, 5 is flat
    TrebleGain,
    /// Mid peak gain, 0-10, 5 is flat
    MidGain,
    /// Wet proportion (alpha) in tenths
    Mix,
    /// Feedback coefficient (lambda) in tenths
    Feedback,
    /// Echo delay in fifths of a second
    Delay,
    /// Modulation period of the variable delay
    ModulationPeriod,
    /// Modulation depth of the variable delay, in samples
    ModulationDepth,
}

impl KnobId {
    pub const COUNT: usize = 8;

    pub const ALL: [KnobId; KnobId::COUNT] = [
        KnobId::BassGain,
        KnobId::TrebleGain,
        KnobId::MidGain,
        KnobId::Mix,
        KnobId::Feedback,
        KnobId::Delay,
        KnobId::ModulationPeriod,
        KnobId::ModulationDepth,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            KnobId::BassGain => "bass",
            KnobId::TrebleGain => "treble",
            KnobId::MidGain => "mid",
            KnobId::Mix => "mix",
            KnobId::Feedback => "feedback",
            KnobId::Delay => "delay",
            KnobId::ModulationPeriod => "period",
            KnobId::ModulationDepth => "depth",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|knob| knob.name() == name)
    }

    fn default_range(self) -> (i32, i32) {
        match self {
            KnobId::BassGain | KnobId::TrebleGain | KnobId::MidGain => (0, 10),
            KnobId::Mix => (0, 10),
            KnobId::Feedback => (-9, 9),
            KnobId::Delay => (0, 5),
            KnobId::ModulationPeriod => (1, 20),
            KnobId::ModulationDepth => (0, 40),
        }
    }

    fn default_value(self) -> i32 {
        match self {
            KnobId::BassGain | KnobId::TrebleGain | KnobId::MidGain => 5,
            KnobId::ModulationPeriod => 10,
            _ => 0,
        }
    }
}

impl fmt::Display for KnobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Knob position in tenths, as used for mix and feedback.
#[inline]
pub fn ratio(value: i32) -> f32 {
    value as f32 / 10.0
}

/// Delay length selected by a `Delay` knob: `2·Fe·knob/10` samples.
#[inline]
pub fn delay_samples(value: i32, sample_rate: usize) -> usize {
    2 * sample_rate * value.max(0) as usize / 10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamState {
    /// Coefficients match the current value
    Clean,
    /// Moved since the last recompute
    Dirty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Knob {
    value: i32,
    /// Value the dependent coefficients were last computed from
    previous: i32,
    min: i32,
    max: i32,
    state: ParamState,
}

impl Knob {
    fn for_id(id: KnobId) -> Self {
        let (min, max) = id.default_range();
        let value = id.default_value();
        Self {
            value,
            previous: value,
            min,
            max,
            state: ParamState::Dirty,
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn previous(&self) -> i32 {
        self.previous
    }

    pub fn range(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }

    pub fn state(&self) -> ParamState {
        self.state
    }
}

/// Every knob the filters can read, indexed by [`KnobId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamStore {
    knobs: [Knob; KnobId::COUNT],
}

impl ParamStore {
    pub fn new() -> Self {
        Self {
            knobs: KnobId::ALL.map(Knob::for_id),
        }
    }

    #[inline]
    pub fn get(&self, id: KnobId) -> i32 {
        self.knobs[id.index()].value
    }

    pub fn knob(&self, id: KnobId) -> &Knob {
        &self.knobs[id.index()]
    }

    pub fn range(&self, id: KnobId) -> RangeInclusive<i32> {
        self.knobs[id.index()].range()
    }

    pub fn set(&mut self, id: KnobId, value: i32) -> Result<(), ParamError> {
        let knob = &mut self.knobs[id.index()];
        if value < knob.min || value > knob.max {
            return Err(ParamError::OutOfRange {
                knob: id,
                value,
                min: knob.min,
                max: knob.max,
            });
        }

        knob.value = value;
        knob.state = if value == knob.previous {
            ParamState::Clean
        } else {
            ParamState::Dirty
        };
        Ok(())
    }

    /// Narrow or widen a knob's travel. A value outside the new range is
    /// pulled to the nearest end.
    pub fn set_range(&mut self, id: KnobId, range: RangeInclusive<i32>) -> Result<(), ParamError> {
        let (min, max) = (*range.start(), *range.end());
        if min > max {
            return Err(ParamError::EmptyRange { knob: id, min, max });
        }

        let knob = &mut self.knobs[id.index()];
        knob.min = min;
        knob.max = max;
        let clamped = knob.value.clamp(min, max);
        self.set(id, clamped)
    }

    #[inline]
    pub fn is_dirty(&self, id: KnobId) -> bool {
        self.knobs[id.index()].state == ParamState::Dirty
    }

    pub fn any_dirty(&self, ids: &[KnobId]) -> bool {
        ids.iter().any(|&id| self.is_dirty(id))
    }

    /// Dirty -> Clean for every knob, recording the applied values.
    pub fn settle(&mut self) {
        for knob in &mut self.knobs {
            knob.previous = knob.value;
            knob.state = ParamState::Clean;
        }
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// Value outside the knob's travel
    OutOfRange {
        knob: KnobId,
        value: i32,
        min: i32,
        max: i32,
    },
    /// Range with min above max
    EmptyRange { knob: KnobId, min: i32, max: i32 },
    /// Control channel to the realtime thread is full
    QueueFull,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::OutOfRange {
                knob,
                value,
                min,
                max,
            } => write!(
                f,
                "knob {} cannot be set to {} (range {}..={})",
                knob, value, min, max
            ),
            ParamError::EmptyRange { knob, min, max } => {
                write!(f, "knob {} given empty range {}..={}", knob, min, max)
            }
            ParamError::QueueFull => write!(f, "control queue is full, change dropped"),
        }
    }
}

impl std::error::Error for ParamError {}
