//! Filter stages: one recursion each, composed in series by the chain.
//!
//! A stage reads its taps through [`StageIo`] and caches whatever
//! coefficients its knobs imply. It never owns the lines it reads from;
//! the [`FilterChain`](crate::chain::FilterChain) sizes those from each
//! stage's declared `input_depth` and `output_depth`.

/// Four-tap moving average over even offsets.
pub mod average;
/// Feedback/feedforward comb producing an echo.
pub mod comb;
/// Recirculating delay with a private circular line.
pub mod flanger;
/// Stage trait, tap view and configuration errors.
pub mod node;
/// Bass shelf, treble shelf and mid peak of the graphic equalizer.
pub mod shelving;
/// Fixed and modulated delay taps with a pluggable blend.
pub mod vibrato;

pub use average::MovingAverage;
pub use comb::CombEcho;
pub use flanger::Flanger;
pub use node::{ConfigError, FilterStage, StageIo};
pub use shelving::{BassShelf, MidPeak, TrebleShelf};
pub use vibrato::{DelayModulator, TapCombiner, VibratoStage};
