//! Live runner - wires the processor between two cpal streams

use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, StreamConfig};
use rtrb::Producer;

use blockdsp::dsp::convert::{to_integer, to_normalized};
use blockdsp::io::log::error_channel;
use blockdsp::io::{pipe, BlockReader, BlockWriter, CycleError, PipeReader, PipeWriter};
use blockdsp::params::{delay_samples, KnobId, ParamStore};
use blockdsp::{BlockProcessor, EngineConfig, Preset};

/// Frames per pipe. Two matches classic double buffering: one being
/// filled while the other is processed.
const PIPE_FRAMES: usize = 2;
const CONTROL_CAPACITY: usize = 64;
const ERROR_CAPACITY: usize = 256;

pub struct LiveRunner {
    config: EngineConfig,
}

impl LiveRunner {
    pub fn new(preset: Preset) -> Self {
        Self {
            config: EngineConfig::with_preset(preset),
        }
    }

    pub fn knob(mut self, knob: KnobId, value: i32) -> Self {
        self.config = self.config.knob(knob, value);
        self
    }

    /// Run until `quit` or end of input.
    pub fn run(mut self) -> EyreResult<()> {
        let host = cpal::default_host();
        let output = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let input = host
            .default_input_device()
            .ok_or_else(|| eyre!("no default input device available"))?;

        let supported = output
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;
        require_f32("output", supported.sample_format())?;
        let supported_input = input
            .default_input_config()
            .wrap_err("failed to fetch default input config")?;
        require_f32("input", supported_input.sample_format())?;
        let input_channels = supported_input.channels();

        let sample_rate = supported.sample_rate();
        let output_channels = supported.channels() as usize;
        let output_config = StreamConfig {
            channels: supported.channels(),
            sample_rate,
            buffer_size: BufferSize::Default,
        };
        let input_config = StreamConfig {
            channels: input_channels,
            ..output_config.clone()
        };

        // Size delay lines for the whole Delay knob travel at the device rate
        let delay_travel = *ParamStore::new().range(KnobId::Delay).end();
        self.config.sample_rate = sample_rate.0 as usize;
        self.config.max_delay = delay_samples(delay_travel, self.config.sample_rate);

        let mut processor = BlockProcessor::from_config(&self.config)
            .wrap_err("invalid engine configuration")?;
        let mut control = processor.control_channel(CONTROL_CAPACITY);
        let (errors_tx, mut errors_rx) = error_channel(ERROR_CAPACITY);

        let block_size = self.config.block_size;
        let (capture_writer, cycle_reader) = pipe(PIPE_FRAMES, block_size);
        let (mut cycle_writer, playback_reader) = pipe(PIPE_FRAMES, block_size);
        // Output starts one block behind input
        cycle_writer.prime_silence();

        println!("=== blockdsp ===");
        println!("Preset: {}", self.config.preset);
        println!("Sample rate: {} Hz", self.config.sample_rate);
        println!("Block: {} frames", block_size);
        println!("Channels: {} in, {} out", input_channels, output_channels);
        println!();
        print_help(self.config.preset);

        let mut capture = Capture {
            writer: capture_writer,
            channels: input_channels as usize,
        };
        let input_stream = input.build_input_stream(
            &input_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| capture.push(data),
            |err| eprintln!("Input stream error: {}", err),
            None,
        )?;

        let mut engine = Engine {
            processor,
            input: cycle_reader,
            output: cycle_writer,
            playback: playback_reader,
            position: 0,
            errors: errors_tx,
        };
        let output_stream = output.build_output_stream(
            &output_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                engine.render(data, output_channels)
            },
            |err| eprintln!("Output stream error: {}", err),
            None,
        )?;

        output_stream.play()?;
        input_stream.play()?;

        // Cycle errors are reported from here, never from the audio thread
        let running = Arc::new(AtomicBool::new(true));
        let reporter = {
            let running = running.clone();
            thread::spawn(move || {
                while running.load(Ordering::Relaxed) {
                    while let Ok(err) = errors_rx.pop() {
                        eprintln!("cycle error {}: {}", err.code(), err);
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            })
        };

        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line.wrap_err("failed to read stdin")?;
            match parse_command(&line) {
                Ok(Command::Set(knob, value)) => {
                    if let Err(err) = control.set(knob, value) {
                        eprintln!("{}", err);
                    }
                }
                Ok(Command::Reset) => {
                    if let Err(err) = control.reset_history() {
                        eprintln!("{}", err);
                    }
                }
                Ok(Command::Help) => print_help(self.config.preset),
                Ok(Command::Quit) => break,
                Ok(Command::Nothing) => {}
                Err(err) => eprintln!("{}", err),
            }
        }

        running.store(false, Ordering::Relaxed);
        reporter
            .join()
            .map_err(|_| eyre!("error reporter thread panicked"))?;
        Ok(())
    }
}

/// Both callbacks are written for f32 samples.
fn require_f32(side: &str, format: SampleFormat) -> EyreResult<()> {
    if format != SampleFormat::F32 {
        return Err(eyre!(
            "{} device uses {:?} samples, only f32 is supported",
            side,
            format
        ));
    }
    Ok(())
}

/// Input side: downmix to mono and fill capture frames.
struct Capture {
    writer: PipeWriter,
    channels: usize,
}

impl Capture {
    fn push(&mut self, data: &[f32]) {
        for frame in data.chunks(self.channels.max(1)) {
            let mono = frame.iter().sum::<f32>() / frame.len() as f32;
            // No free frame means the processor is behind; drop the sample
            let Some(block) = self.writer.acquire_writable() else {
                return;
            };
            block.extend_from(&[to_integer(mono)]);
            if block.is_full() {
                let len = block.len();
                self.writer.publish_writable(len);
            }
        }
    }
}

/// Output side: runs cycles as capture frames arrive and plays the results.
struct Engine {
    processor: BlockProcessor,
    input: PipeReader,
    output: PipeWriter,
    playback: PipeReader,
    /// Next sample of the held playback frame
    position: usize,
    errors: Producer<CycleError>,
}

impl Engine {
    fn render(&mut self, data: &mut [f32], channels: usize) {
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = self.next_sample();
            frame.fill(sample);
        }
    }

    fn next_sample(&mut self) -> f32 {
        loop {
            match self.playback.acquire_readable() {
                Some(frame) if self.position < frame.len() => {
                    let sample = to_normalized(frame.as_slice()[self.position]);
                    self.position += 1;
                    return sample;
                }
                Some(_) => {
                    self.playback.release_readable();
                    self.position = 0;
                    self.pump();
                }
                None => {
                    self.pump();
                    if self.playback.readable() == 0 {
                        // Underrun
                        return 0.0;
                    }
                }
            }
        }
    }

    /// Process every capture frame that has an output frame to go to.
    fn pump(&mut self) {
        while self.input.readable() > 0 && self.output.writable() > 0 {
            let cycle = self
                .processor
                .run_cycle(&mut self.input, &mut self.output, &mut self.errors);
            if cycle.is_err() {
                break;
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Set(KnobId, i32),
    Reset,
    Help,
    Quit,
    Nothing,
}

fn parse_command(line: &str) -> EyreResult<Command> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(Command::Nothing);
    };

    match first {
        "quit" | "exit" => Ok(Command::Quit),
        "reset" => Ok(Command::Reset),
        "help" => Ok(Command::Help),
        name => {
            let knob = KnobId::from_name(name)
                .ok_or_else(|| eyre!("unknown command or knob '{}', try 'help'", name))?;
            let value = words
                .next()
                .ok_or_else(|| eyre!("missing value for {}", knob))?
                .parse()
                .wrap_err_with(|| format!("invalid value for {}", knob))?;
            Ok(Command::Set(knob, value))
        }
    }
}

fn print_help(preset: Preset) {
    let knobs: Vec<&str> = preset.knobs().iter().map(|knob| knob.name()).collect();
    if knobs.is_empty() {
        println!("This preset has no knobs.");
    } else {
        println!("Knobs: {}", knobs.join(", "));
        println!("Set one with '<knob> <value>', e.g. '{} 7'.", knobs[0]);
    }
    println!("Other commands: reset, help, quit");
    println!();
}
