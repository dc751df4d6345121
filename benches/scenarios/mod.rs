//! Real-world scenario benchmarks.
//!
//! These run the preset chains the live runner uses, with the same block
//! sizes and knob settings a user would pick.

mod cycle;
mod presets;

pub use cycle::bench_cycle;
pub use presets::bench_presets;
