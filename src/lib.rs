// src/lib.rs
//! Libra
//!
//! Weighs a list of pros against a list of cons and shows the result as a 2-D
//! physics balance: a pivoting beam with a pan on each side, and one falling
//! weight per item, sized by its importance.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod ledger;
pub mod model;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::LibraApp;
pub use config::ScaleConfig;
pub use error::{LibraError, Result};
pub use model::{Side, Tally, WeightedItem};
pub use simulation::Visualization;

/// Creates a Libra application with the default configuration
pub fn default() -> anyhow::Result<LibraApp> {
    LibraApp::new(ScaleConfig::default())
}
