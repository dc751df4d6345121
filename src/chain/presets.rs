use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::KnobId;
use crate::stage::{BassShelf, CombEcho, FilterStage, Flanger, MidPeak, MovingAverage, TrebleShelf};

/// Stage layouts the processor can be built from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    /// Four-tap averager, no knobs
    MovingAverage,
    /// Bass shelf → treble shelf → mid peak
    #[default]
    GraphicEq,
    /// Feedback comb reading its own output
    Echo,
    /// Recirculating delay line
    Flanger,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::MovingAverage,
        Preset::GraphicEq,
        Preset::Echo,
        Preset::Flanger,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::MovingAverage => "average",
            Preset::GraphicEq => "eq",
            Preset::Echo => "echo",
            Preset::Flanger => "flanger",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|preset| preset.name() == name)
    }

    /// Knobs the preset's stages respond to.
    pub fn knobs(self) -> &'static [KnobId] {
        match self {
            Preset::MovingAverage => &[],
            Preset::GraphicEq => &[KnobId::BassGain, KnobId::TrebleGain, KnobId::MidGain],
            Preset::Echo | Preset::Flanger => &[KnobId::Mix, KnobId::Feedback, KnobId::Delay],
        }
    }

    /// Fresh stages in processing order. `max_delay` bounds the delay lines
    /// of the echo and flanger.
    pub fn stages(self, sample_rate: usize, max_delay: usize) -> Vec<Box<dyn FilterStage>> {
        let fs = sample_rate as f32;
        match self {
            Preset::MovingAverage => vec![Box::new(MovingAverage::new())],
            Preset::GraphicEq => vec![
                Box::new(BassShelf::new(fs)),
                Box::new(TrebleShelf::new(fs)),
                Box::new(MidPeak::new(fs)),
            ],
            Preset::Echo => vec![Box::new(CombEcho::new(sample_rate, max_delay))],
            Preset::Flanger => vec![Box::new(Flanger::new(sample_rate, max_delay))],
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
