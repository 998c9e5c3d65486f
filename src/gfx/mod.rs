//! # Graphics Module
//!
//! Everything between a simulated world and pixels.
//!
//! - **Palette** ([`palette`]) - colours for apparatus parts and weight shades
//! - **Frames** ([`frame`]) - world snapshots turned into styled shape lists
//! - **Surfaces** ([`surface`]) - where frames go; [`HeadlessSurface`] keeps them in memory
//! - **Rendering** ([`rendering`]) - wgpu window surface drawing frames with instanced shapes
//!
//! ```no_run
//! use libra::gfx::{HeadlessSurface, Renderer, palette::Palette};
//! use libra::config::ScaleConfig;
//! use libra::simulation::World;
//!
//! let config = ScaleConfig::default();
//! let world = World::new(&config.physics);
//! let renderer = Renderer::bind(&world, Palette::default(), config.canvas.clone());
//! let mut surface = HeadlessSurface::new();
//! renderer.draw(&world, &mut surface).unwrap();
//! ```

pub mod frame;
pub mod palette;
pub mod rendering;
pub mod surface;

pub use frame::{Frame, Renderer, ShapeInstance, ShapeKind};
pub use rendering::RenderEngine;
pub use surface::{DrawSurface, HeadlessSurface};
