//! Benchmarks for low-level primitives.

mod convert;
mod history;
mod stages;

pub use convert::bench_convert;
pub use history::bench_history;
pub use stages::bench_stages;
