use std::fmt;

use crate::dsp::History;
use crate::params::{delay_samples, KnobId, ParamError, ParamStore};

/// What a stage sees while computing one sample.
///
/// `input` is the line feeding the stage (the chain input or the previous
/// stage's output) with the current sample already committed. `output` is
/// the stage's own output line, not yet holding the sample being computed.
pub struct StageIo<'a> {
    input: &'a dyn History,
    output: &'a dyn History,
}

impl<'a> StageIo<'a> {
    pub fn new(input: &'a dyn History, output: &'a dyn History) -> Self {
        Self { input, output }
    }

    /// `x[i - offset]`; `x(0)` is the sample being processed.
    #[inline]
    pub fn x(&self, offset: usize) -> f32 {
        self.input.tap_at(offset)
    }

    /// `y[i - offset]` for `offset >= 1`.
    #[inline]
    pub fn y(&self, offset: usize) -> f32 {
        debug_assert!(offset > 0, "y(0) is the sample being computed");
        self.output.tap_at(offset - 1)
    }
}

/// Core trait for one filter computation in a chain.
///
/// Stages are pure recursions over their taps plus cached coefficients.
/// The chain owns the history lines, decides when coefficients are stale
/// and threads samples from one stage to the next.
pub trait FilterStage: Send {
    fn name(&self) -> &'static str;

    /// Deepest `x` offset read by `compute_sample`.
    fn input_depth(&self) -> usize {
        0
    }

    /// Deepest `y` offset read by `compute_sample`.
    fn output_depth(&self) -> usize {
        0
    }

    /// Knobs the coefficients depend on.
    fn knobs(&self) -> &'static [KnobId] {
        &[]
    }

    /// Reject knob ranges that could address taps outside the allocated
    /// history. Runs once when the chain is built.
    fn validate(&self, _params: &ParamStore) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Rebuild cached coefficients. Only called when one of [`knobs`] is
    /// dirty (and once before the first cycle).
    ///
    /// [`knobs`]: FilterStage::knobs
    fn recompute_coefficients(&mut self, params: &ParamStore);

    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32;

    /// Clear stage-local memory.
    fn reset(&mut self) {}
}

/// Allow boxed stages to be wrapped like concrete ones
impl FilterStage for Box<dyn FilterStage> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn input_depth(&self) -> usize {
        (**self).input_depth()
    }

    fn output_depth(&self) -> usize {
        (**self).output_depth()
    }

    fn knobs(&self) -> &'static [KnobId] {
        (**self).knobs()
    }

    fn validate(&self, params: &ParamStore) -> Result<(), ConfigError> {
        (**self).validate(params)
    }

    fn recompute_coefficients(&mut self, params: &ParamStore) {
        (**self).recompute_coefficients(params)
    }

    fn compute_sample(&mut self, io: &StageIo<'_>) -> f32 {
        (**self).compute_sample(io)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Check that the largest `Delay` knob position stays within `limit` samples.
pub(crate) fn check_delay_knob(
    stage: &'static str,
    params: &ParamStore,
    sample_rate: usize,
    limit: usize,
) -> Result<usize, ConfigError> {
    let max_knob = *params.range(KnobId::Delay).end();
    let delay = delay_samples(max_knob, sample_rate);
    if delay > limit {
        return Err(ConfigError::DelayExceedsHistory {
            stage,
            knob: KnobId::Delay,
            delay,
            capacity: limit,
        });
    }
    Ok(delay)
}

/// Errors that can occur when building a processor or chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Block size of zero
    ZeroBlockSize,
    /// Sample rate of zero
    ZeroSampleRate,
    /// Chain without stages
    EmptyChain,
    /// A knob can select a delay deeper than the history allocated for it
    DelayExceedsHistory {
        stage: &'static str,
        knob: KnobId,
        delay: usize,
        capacity: usize,
    },
    /// Initial knob setting rejected
    Param(ParamError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroBlockSize => write!(f, "block size must be at least one frame"),
            ConfigError::ZeroSampleRate => write!(f, "sample rate must be positive"),
            ConfigError::EmptyChain => write!(f, "filter chain needs at least one stage"),
            ConfigError::DelayExceedsHistory {
                stage,
                knob,
                delay,
                capacity,
            } => write!(
                f,
                "{}: knob {} reaches a delay of {} samples but only {} are held",
                stage, knob, delay, capacity
            ),
            ConfigError::Param(err) => write!(f, "invalid knob setting: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Param(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParamError> for ConfigError {
    fn from(err: ParamError) -> Self {
        ConfigError::Param(err)
    }
}
