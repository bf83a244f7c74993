//! WASM bridge for `stommel_core`.
//!
//! Exposes a steppable model for interactive phase portraits, one-shot
//! equilibrium analysis and trajectory integration, and a stepped `lambda`
//! sweep that a renderer can drive in batches.
mod analysis;
mod shared;
mod sweep;
mod system;

pub use analysis::{analyze_equilibria, integrate_phase_portrait, integrate_trajectory};
pub use sweep::WasmBifurcationSweepRunner;
pub use system::WasmStommelSystem;
