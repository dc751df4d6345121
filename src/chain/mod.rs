use crate::dsp::{History, HistoryRing};
use crate::params::ParamStore;
use crate::stage::{ConfigError, FilterStage, StageIo};

/// Ready-made chains for each filter design.
pub mod presets;

pub use presets::Preset;

/*
Filter Chain
============

Stages run in series. Every connection between two stages is a history
line, so each stage can look back at the signal it receives and at what it
produced itself:

  line 0          line 1            line 2            line 3
  (input) ──→ [ stage 0 ] ──→ [ stage 1 ] ──→ [ stage 2 ] ──→ output

  stage k reads x from line k and y from line k+1

A line is shared by the stage writing it and the stage reading it, so its
depth is the larger of the two requirements. The treble shelf of the
graphic EQ, for instance, reads `x[i-2]` from the bass shelf's output line,
which the bass shelf also reads back as its own `y[i-2]`. Reordering the
stages changes which signal each recursion sees.

Per block:

  1. update()      dirty knobs → recompute the stages that read them
  2. append        stage the block on line 0
  3. per sample    advance line 0, run every stage, push each result
  4. end_block     every line keeps its depth for the next block

The update is the only place coefficients change, so a knob moved while a
block is in flight takes effect on the next block, never halfway through.

The line layout is a type parameter: `HistoryRing` by default, or
`CarryWindow` for the carry-copy arrays. Both give the same samples.
*/

pub struct FilterChain<H: History = HistoryRing> {
    stages: Vec<Box<dyn FilterStage>>,
    lines: Vec<H>,
    block_capacity: usize,
    /// Coefficients computed at least once
    primed: bool,
}

impl FilterChain {
    /// Build a chain over circular history lines.
    pub fn new(
        stages: Vec<Box<dyn FilterStage>>,
        params: &ParamStore,
        block_capacity: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_history(stages, params, block_capacity)
    }
}

impl<H: History> FilterChain<H> {
    /// Build a chain with lines of type `H`, each able to take
    /// `block_capacity` samples per block.
    ///
    /// Every stage validates the knob ranges in `params` first, so a delay
    /// knob that could reach past its line fails here instead of reading
    /// stale samples later.
    pub fn with_history(
        stages: Vec<Box<dyn FilterStage>>,
        params: &ParamStore,
        block_capacity: usize,
    ) -> Result<Self, ConfigError> {
        if block_capacity == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if stages.is_empty() {
            return Err(ConfigError::EmptyChain);
        }
        for stage in &stages {
            stage.validate(params)?;
        }

        let lines = (0..=stages.len())
            .map(|line| {
                let reader = stages.get(line).map_or(0, |stage| stage.input_depth());
                let writer = line
                    .checked_sub(1)
                    .map_or(0, |prev| stages[prev].output_depth());
                H::with_depth(reader.max(writer), block_capacity)
            })
            .collect();

        Ok(Self {
            stages,
            lines,
            block_capacity,
            primed: false,
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Depth of each line, input first.
    pub fn line_depths(&self) -> Vec<usize> {
        self.lines.iter().map(|line| line.depth()).collect()
    }

    /// Recompute stages whose knobs are dirty, then mark every knob clean.
    ///
    /// Returns how many stages recomputed. The first call recomputes all of
    /// them, including stages without knobs.
    pub fn update(&mut self, params: &mut ParamStore) -> usize {
        let mut recomputed = 0;
        for stage in &mut self.stages {
            if !self.primed || params.any_dirty(stage.knobs()) {
                stage.recompute_coefficients(params);
                recomputed += 1;
            }
        }
        self.primed = true;
        params.settle();
        recomputed
    }

    /// Filter `input` into `output`, returning the number of samples written
    /// (the shorter of the two).
    ///
    /// Inputs longer than the block capacity are split; the result is the
    /// same as feeding the pieces one call at a time.
    pub fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        let len = input.len().min(output.len());
        let capacity = self.block_capacity;

        for (block, out) in input[..len]
            .chunks(capacity)
            .zip(output[..len].chunks_mut(capacity))
        {
            self.lines[0].append(block);
            for slot in out.iter_mut() {
                self.lines[0].advance(1);
                *slot = self.run_stages();
            }
            for line in &mut self.lines {
                line.end_block();
            }
        }
        len
    }

    /// Filter a single sample.
    pub fn process(&mut self, sample: f32) -> f32 {
        let mut out = [0.0];
        self.process_block(&[sample], &mut out);
        out[0]
    }

    /// Silence every line and every stage's private memory.
    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.reset();
        }
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    #[inline]
    fn run_stages(&mut self) -> f32 {
        let mut sample = 0.0;
        for (k, stage) in self.stages.iter_mut().enumerate() {
            let (read, write) = self.lines.split_at_mut(k + 1);
            sample = stage.compute_sample(&StageIo::new(&read[k], &write[0]));
            write[0].push(sample);
        }
        sample
    }
}
