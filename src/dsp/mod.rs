//! Low-level DSP primitives used by the filter stages.
//!
//! These components are allocation-free once constructed and realtime-safe.
//! They stay focused on sample math and memory layout so the stages in
//! [`crate::stage`] can layer the filter recursions on top.

/// PCM <-> normalized float conversion with saturation.
pub mod convert;
/// Shelving and peaking coefficient math for the graphic equalizer.
pub mod eq;
/// History line trait and the circular implementation.
pub mod history;
/// Fixed head-padded history that carries its tail between blocks.
pub mod window;

pub use history::{History, HistoryError, HistoryRing};
pub use window::CarryWindow;
