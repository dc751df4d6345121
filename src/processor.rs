#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::chain::{FilterChain, Preset};
use crate::dsp::convert::{denormalize_block, normalize_block};
use crate::dsp::{History, HistoryRing};
use crate::io::{BlockReader, BlockWriter, CycleError, ErrorReporter};
use crate::params::message::{ControlMessage, ControlReceiver};
#[cfg(feature = "rtrb")]
use crate::params::message::ParamHandle;
use crate::params::{KnobId, ParamError, ParamStore};
use crate::stage::{ConfigError, FilterStage};
use crate::{BLOCK_SIZE, SAMPLE_RATE};

/*
Streaming Block Processor
=========================

One call to `run_cycle` handles exactly one frame pair:

  1. drain control    knob changes queued by other threads
  2. preconditions    a full input frame and an empty output frame, or
                      log the missing one and skip the cycle
  3. convert          i16 → f32 into the working input block
  4. update           dirty knobs → coefficients (once, before any sample)
  5. compute          the chain appends to its lines and filters
  6. carry            every line keeps its tail for the next cycle
  7. publish          f32 → i16 with saturation, same length as the input

Skipped cycles are not retried; the next call checks again from scratch.
Nothing here allocates or locks after construction, so `run_cycle` can be
called directly from an audio callback.

An input frame larger than the configured block size is filtered in
block-sized pieces; the output is identical to feeding it in separate
cycles. If the output frame is smaller than the input, only what fits is
filtered and published, and the number of dropped samples is logged.
Empty input frames and output frames without capacity count as missing.
*/

/// Initial position of one knob.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobSetting {
    pub knob: KnobId,
    pub value: i32,
}

/// Travel override for one knob.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnobRange {
    pub knob: KnobId,
    pub min: i32,
    pub max: i32,
}

/// Everything needed to build a processor.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub preset: Preset,
    /// Largest frame filtered in one pass
    pub block_size: usize,
    pub sample_rate: usize,
    /// Deepest delay line, in samples, for presets with a Delay knob
    pub max_delay: usize,
    /// Applied before `knobs`
    pub ranges: Vec<KnobRange>,
    pub knobs: Vec<KnobSetting>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preset: Preset::GraphicEq,
            block_size: BLOCK_SIZE,
            sample_rate: SAMPLE_RATE,
            max_delay: SAMPLE_RATE,
            ranges: Vec::new(),
            knobs: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn with_preset(preset: Preset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    pub fn knob(mut self, knob: KnobId, value: i32) -> Self {
        self.knobs.push(KnobSetting { knob, value });
        self
    }

    pub fn range(mut self, knob: KnobId, min: i32, max: i32) -> Self {
        self.ranges.push(KnobRange { knob, min, max });
        self
    }

    /// Knob store with the overrides applied.
    pub fn params(&self) -> Result<ParamStore, ParamError> {
        let mut params = ParamStore::new();
        for range in &self.ranges {
            params.set_range(range.knob, range.min..=range.max)?;
        }
        for setting in &self.knobs {
            params.set(setting.knob, setting.value)?;
        }
        Ok(params)
    }
}

pub struct BlockProcessor<H: History = HistoryRing> {
    chain: FilterChain<H>,
    params: ParamStore,
    control: Option<Box<dyn ControlReceiver>>,
    input: Vec<f32>,
    output: Vec<f32>,
}

impl BlockProcessor {
    /// Build the configured preset over circular history lines.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        Self::with_history(config)
    }

    /// Build from explicit stages over circular history lines.
    pub fn new(
        stages: Vec<Box<dyn FilterStage>>,
        params: ParamStore,
        block_size: usize,
    ) -> Result<Self, ConfigError> {
        Self::with_stages(stages, params, block_size)
    }
}

impl<H: History> BlockProcessor<H> {
    /// Build the configured preset with history lines of type `H`.
    pub fn with_history(config: &EngineConfig) -> Result<Self, ConfigError> {
        if config.sample_rate == 0 {
            return Err(ConfigError::ZeroSampleRate);
        }
        let params = config.params()?;
        let stages = config.preset.stages(config.sample_rate, config.max_delay);
        Self::with_stages(stages, params, config.block_size)
    }

    pub fn with_stages(
        stages: Vec<Box<dyn FilterStage>>,
        params: ParamStore,
        block_size: usize,
    ) -> Result<Self, ConfigError> {
        let chain = FilterChain::with_history(stages, &params, block_size)?;
        Ok(Self {
            chain,
            params,
            control: None,
            input: vec![0.0; block_size],
            output: vec![0.0; block_size],
        })
    }

    pub fn block_size(&self) -> usize {
        self.input.len()
    }

    pub fn params(&self) -> &ParamStore {
        &self.params
    }

    pub fn chain(&self) -> &FilterChain<H> {
        &self.chain
    }

    /// Move a knob directly. Takes effect at the start of the next cycle.
    pub fn set_knob(&mut self, knob: KnobId, value: i32) -> Result<(), ParamError> {
        self.params.set(knob, value)
    }

    /// Attach a source of control messages, drained at the start of each cycle.
    pub fn set_control<C: ControlReceiver + 'static>(&mut self, control: C) {
        self.control = Some(Box::new(control));
    }

    /// Open a control channel to this processor and return the sending side.
    #[cfg(feature = "rtrb")]
    pub fn control_channel(&mut self, capacity: usize) -> ParamHandle {
        let (handle, rx) = ParamHandle::channel(&self.params, capacity);
        self.set_control(rx);
        handle
    }

    /// Process one frame pair. Returns the number of samples published.
    ///
    /// A missing frame on either side is logged through `log` and returned
    /// as the error. An empty input frame counts as missing and is released;
    /// an output frame with no capacity counts as missing and the input
    /// stays queued. When the output frame is shorter than the input, what
    /// fits is published and the rest is logged as `Truncated`.
    pub fn run_cycle<R, W, L>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
        log: &mut L,
    ) -> Result<usize, CycleError>
    where
        R: BlockReader + ?Sized,
        W: BlockWriter + ?Sized,
        L: ErrorReporter + ?Sized,
    {
        self.drain_control(log);

        if reader.readable() == 0 {
            log.log_error(CycleError::NoReaderFrame);
            return Err(CycleError::NoReaderFrame);
        }
        if writer.writable() == 0 {
            log.log_error(CycleError::NoWriterFrame);
            return Err(CycleError::NoWriterFrame);
        }

        let Some(input) = reader.acquire_readable() else {
            log.log_error(CycleError::NoReaderFrame);
            return Err(CycleError::NoReaderFrame);
        };
        if input.is_empty() {
            // Nothing to filter; hand the frame back so the queue moves on
            reader.release_readable();
            log.log_error(CycleError::NoReaderFrame);
            return Err(CycleError::NoReaderFrame);
        }
        let Some(output) = writer.acquire_writable() else {
            log.log_error(CycleError::NoWriterFrame);
            return Err(CycleError::NoWriterFrame);
        };
        if output.capacity() == 0 {
            log.log_error(CycleError::NoWriterFrame);
            return Err(CycleError::NoWriterFrame);
        }

        let len = input.len().min(output.capacity());
        if len < input.len() {
            log.log_error(CycleError::Truncated {
                dropped: input.len() - len,
            });
        }
        self.chain.update(&mut self.params);
        self.filter_pcm(&input.as_slice()[..len], &mut output.buffer_mut()[..len]);

        writer.publish_writable(len);
        reader.release_readable();
        Ok(len)
    }

    /// Filter PCM samples without a buffer exchange. Returns the number of
    /// samples written (the shorter of the two slices).
    pub fn process_block(&mut self, input: &[i16], output: &mut [i16]) -> usize {
        let len = input.len().min(output.len());
        self.chain.update(&mut self.params);
        self.filter_pcm(&input[..len], &mut output[..len]);
        len
    }

    /// Filter normalized samples, skipping conversion and saturation.
    pub fn process_normalized(&mut self, input: &[f32], output: &mut [f32]) -> usize {
        self.chain.update(&mut self.params);
        self.chain.process_block(input, output)
    }

    /// Silence every history line and stage memory. Knobs are kept.
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    fn filter_pcm(&mut self, input: &[i16], output: &mut [i16]) {
        let block = self.input.len();
        for (src, dst) in input.chunks(block).zip(output.chunks_mut(block)) {
            let n = src.len();
            normalize_block(src, &mut self.input[..n]);
            self.chain
                .process_block(&self.input[..n], &mut self.output[..n]);
            denormalize_block(&self.output[..n], dst);
        }
    }

    fn drain_control<L: ErrorReporter + ?Sized>(&mut self, log: &mut L) {
        let Some(control) = self.control.as_mut() else {
            return;
        };
        while let Some(msg) = control.pop() {
            match msg {
                ControlMessage::SetKnob { knob, value } => {
                    if self.params.set(knob, value).is_err() {
                        log.log_error(CycleError::RejectedKnob { knob, value });
                    }
                }
                ControlMessage::ResetHistory => self.chain.reset(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Frame;
    use std::collections::VecDeque;

    /// Reader over a fixed list of frames.
    struct Frames {
        queue: VecDeque<Frame>,
        released: usize,
    }

    impl Frames {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                queue: frames.into(),
                released: 0,
            }
        }
    }

    impl BlockReader for Frames {
        fn readable(&self) -> usize {
            self.queue.len()
        }

        fn acquire_readable(&mut self) -> Option<&Frame> {
            self.queue.front()
        }

        fn release_readable(&mut self) {
            self.queue.pop_front();
            self.released += 1;
        }
    }

    /// Writer handing out `slots` frames and keeping what was published.
    struct Sink {
        slots: usize,
        capacity: usize,
        held: Option<Frame>,
        published: Vec<Vec<i16>>,
    }

    impl Sink {
        fn new(slots: usize, capacity: usize) -> Self {
            Self {
                slots,
                capacity,
                held: None,
                published: Vec::new(),
            }
        }
    }

    impl BlockWriter for Sink {
        fn writable(&self) -> usize {
            self.slots
        }

        fn acquire_writable(&mut self) -> Option<&mut Frame> {
            if self.slots == 0 {
                return None;
            }
            let capacity = self.capacity;
            Some(self.held.get_or_insert_with(|| Frame::new(capacity)))
        }

        fn publish_writable(&mut self, len: usize) {
            if let Some(mut frame) = self.held.take() {
                frame.set_len(len);
                self.published.push(frame.as_slice().to_vec());
                self.slots -= 1;
            }
        }
    }

    fn averager() -> BlockProcessor {
        BlockProcessor::from_config(&EngineConfig {
            block_size: 4,
            ..EngineConfig::with_preset(Preset::MovingAverage)
        })
        .unwrap()
    }

    #[test]
    fn test_missing_reader_frame_is_logged() {
        let mut processor = averager();
        let mut reader = Frames::new(Vec::new());
        let mut writer = Sink::new(1, 4);
        let mut log = Vec::new();

        let result = processor.run_cycle(&mut reader, &mut writer, &mut log);
        assert_eq!(result, Err(CycleError::NoReaderFrame));
        assert_eq!(log, vec![CycleError::NoReaderFrame]);
        assert!(writer.held.is_none(), "nothing acquired on failure");
    }

    #[test]
    fn test_missing_writer_frame_leaves_input_queued() {
        let mut processor = averager();
        let mut reader = Frames::new(vec![Frame::from_samples(&[100; 4])]);
        let mut writer = Sink::new(0, 4);
        let mut log = Vec::new();

        let result = processor.run_cycle(&mut reader, &mut writer, &mut log);
        assert_eq!(result, Err(CycleError::NoWriterFrame));
        assert_eq!(log, vec![CycleError::NoWriterFrame]);
        assert_eq!(reader.readable(), 1);
        assert_eq!(reader.released, 0);
    }

    #[test]
    fn test_cycle_publishes_input_length() {
        let mut processor = averager();
        let mut reader = Frames::new(vec![
            Frame::from_samples(&[4_000, 4_000, 4_000]),
            Frame::from_samples(&[4_000; 4]),
        ]);
        let mut writer = Sink::new(2, 4);
        let mut log = Vec::new();

        assert_eq!(processor.run_cycle(&mut reader, &mut writer, &mut log), Ok(3));
        assert_eq!(processor.run_cycle(&mut reader, &mut writer, &mut log), Ok(4));
        assert!(log.is_empty());

        assert_eq!(writer.published[0], vec![1_000, 1_000, 2_000]);
        assert_eq!(writer.published[1], vec![2_000, 3_000, 3_000, 4_000]);
        assert_eq!(reader.released, 2);
    }

    #[test]
    fn test_empty_input_frame_is_logged_and_released() {
        let mut processor = averager();
        let mut reader = Frames::new(vec![
            Frame::from_samples(&[]),
            Frame::from_samples(&[4_000; 4]),
        ]);
        let mut writer = Sink::new(2, 4);
        let mut log = Vec::new();

        let result = processor.run_cycle(&mut reader, &mut writer, &mut log);
        assert_eq!(result, Err(CycleError::NoReaderFrame));
        assert_eq!(log, vec![CycleError::NoReaderFrame]);
        assert!(writer.published.is_empty(), "nothing published");
        assert_eq!(reader.released, 1);

        // The next frame is processed normally
        assert_eq!(processor.run_cycle(&mut reader, &mut writer, &mut log), Ok(4));
        assert_eq!(writer.published, vec![vec![1_000, 1_000, 2_000, 2_000]]);
    }

    #[test]
    fn test_zero_capacity_output_is_logged() {
        let mut processor = averager();
        let mut reader = Frames::new(vec![Frame::from_samples(&[4_000; 4])]);
        let mut writer = Sink::new(1, 0);
        let mut log = Vec::new();

        let result = processor.run_cycle(&mut reader, &mut writer, &mut log);
        assert_eq!(result, Err(CycleError::NoWriterFrame));
        assert_eq!(log, vec![CycleError::NoWriterFrame]);
        assert!(writer.published.is_empty(), "nothing published");
        assert_eq!(reader.readable(), 1, "input stays queued");
        assert_eq!(reader.released, 0);
    }

    #[test]
    fn test_short_output_frame_logs_dropped_samples() {
        let mut processor = averager();
        let mut reader = Frames::new(vec![Frame::from_samples(&[4_000; 4])]);
        let mut writer = Sink::new(1, 2);
        let mut log = Vec::new();

        assert_eq!(processor.run_cycle(&mut reader, &mut writer, &mut log), Ok(2));
        assert_eq!(log, vec![CycleError::Truncated { dropped: 2 }]);
        assert_eq!(writer.published, vec![vec![1_000, 1_000]]);
        assert_eq!(reader.released, 1);
    }

    #[test]
    fn test_output_saturates() {
        let mut processor = BlockProcessor::from_config(
            &EngineConfig::with_preset(Preset::GraphicEq).knob(KnobId::BassGain, 10),
        )
        .unwrap();

        let input = [i16::MAX; 2_000];
        let mut output = [0i16; 2_000];
        processor.process_block(&input, &mut output);

        // DC gain of 10 on a full-scale input clips
        assert_eq!(output[1_999], i16::MAX);
    }

    #[test]
    fn test_control_messages_apply_before_processing() {
        let mut processor = averager();
        let queue: VecDeque<ControlMessage> = vec![
            ControlMessage::SetKnob {
                knob: KnobId::Mix,
                value: 4,
            },
            ControlMessage::SetKnob {
                knob: KnobId::Mix,
                value: 40,
            },
        ]
        .into();
        processor.set_control(queue);

        let mut reader = Frames::new(vec![Frame::from_samples(&[0; 4])]);
        let mut writer = Sink::new(1, 4);
        let mut log = Vec::new();
        processor.run_cycle(&mut reader, &mut writer, &mut log).unwrap();

        assert_eq!(processor.params().get(KnobId::Mix), 4);
        assert_eq!(
            log,
            vec![CycleError::RejectedKnob {
                knob: KnobId::Mix,
                value: 40
            }]
        );
    }

    #[test]
    fn test_config_errors_surface() {
        let zero_block = EngineConfig {
            block_size: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            BlockProcessor::from_config(&zero_block),
            Err(ConfigError::ZeroBlockSize)
        ));

        let zero_rate = EngineConfig {
            sample_rate: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            BlockProcessor::from_config(&zero_rate),
            Err(ConfigError::ZeroSampleRate)
        ));

        let bad_knob = EngineConfig::default().knob(KnobId::BassGain, 12);
        assert!(matches!(
            BlockProcessor::from_config(&bad_knob),
            Err(ConfigError::Param(ParamError::OutOfRange { .. }))
        ));

        let short_line = EngineConfig {
            max_delay: 1_000,
            ..EngineConfig::with_preset(Preset::Echo)
        };
        assert!(matches!(
            BlockProcessor::from_config(&short_line),
            Err(ConfigError::DelayExceedsHistory { .. })
        ));
    }

    #[test]
    fn test_narrowed_delay_range_fits_short_line() {
        let config = EngineConfig {
            max_delay: 8_820,
            ..EngineConfig::with_preset(Preset::Echo)
        }
        .range(KnobId::Delay, 0, 1)
        .knob(KnobId::Delay, 1);

        let processor = BlockProcessor::from_config(&config).unwrap();
        assert_eq!(processor.chain().line_depths(), vec![8_820, 8_820]);
    }
}
