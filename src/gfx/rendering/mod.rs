// src/gfx/rendering/mod.rs
//! GPU rendering
//!
//! Window surface management and the instanced shape pipeline.

pub mod render_engine;
pub mod shape_pipeline;

pub use render_engine::RenderEngine;
pub use shape_pipeline::{ShapeInstanceData, ShapePipeline, ViewportUniform};
