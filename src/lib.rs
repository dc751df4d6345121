pub mod analysis; // Frequency-response measurement
pub mod chain; // Series composition of filter stages
pub mod dsp;
pub mod io; // Block exchange with the host runtime
pub mod params; // Control knobs and dirty tracking
pub mod processor;
pub mod stage; // Filter stage variants

pub use chain::{FilterChain, Preset};
pub use processor::{BlockProcessor, EngineConfig, KnobRange, KnobSetting};
pub use stage::ConfigError;

/// Frames exchanged per processing cycle.
pub const BLOCK_SIZE: usize = 128;
/// Sample rate assumed by every time-scaled delay.
pub const SAMPLE_RATE: usize = 44_100;
