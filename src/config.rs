//! Tunable constants for the balance scale
//!
//! Every value has a default tuned so the beam answers a change within about a
//! second without oscillating chaotically. A TOML file may override any subset
//! of fields:
//!
//! ```toml
//! [physics]
//! gravity = 600.0
//!
//! [weights]
//! columns = 4
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gfx::palette::{Palette, Rgba};
use crate::model::{Side, MAX_WEIGHT};

/// Complete configuration for one visualization instance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub canvas: Canvas,
    pub physics: PhysicsConfig,
    pub rig: RigConfig,
    pub weights: WeightLayout,
    pub palette: Palette,
    pub render: RenderConfig,
}

impl ScaleConfig {
    /// Parse a configuration from TOML, filling missing fields with defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        log::info!("Loaded scale configuration from {}", path.as_ref().display());
        Ok(config)
    }
}

/// The bounded drawing region, in logical units with y pointing down
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
    /// Neutral colour of the host region behind the transparent canvas
    pub host_background: Rgba,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 400.0,
            host_background: Rgba::rgb8(0xf8, 0xf9, 0xfa),
        }
    }
}

impl Canvas {
    pub fn center_x(&self) -> f32 {
        self.width * 0.5
    }
}

/// World and stepping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in canvas units per second squared
    pub gravity: f32,
    /// Fixed physics tick in seconds
    pub timestep: f32,
    /// Upper bound on physics steps run by a single `advance`
    pub max_steps_per_advance: u32,
    /// Multiplier applied to wall-clock time before it reaches the accumulator
    pub time_scale: f32,
    /// Typical object size, used by the solver to scale its tolerances
    pub length_unit: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 800.0,
            timestep: 1.0 / 60.0,
            max_steps_per_advance: 8,
            time_scale: 1.0,
            length_unit: 50.0,
        }
    }
}

/// Geometry and joint tuning of the fixed apparatus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub ground_center_y: f32,
    pub ground_height: f32,
    /// Thickness of the walls standing just outside the left and right canvas edges
    pub boundary_thickness: f32,
    pub post_width: f32,
    /// y of the pivot point at the top of the post
    pub post_top: f32,
    pub post_bottom: f32,
    pub beam_width: f32,
    pub beam_height: f32,
    /// Distance the beam's centre hangs below the pivot; positive keeps the empty scale level
    pub pivot_drop: f32,
    /// Horizontal distance from the beam centre to each tether anchor
    pub arm_length: f32,
    /// Largest beam rotation either way, in radians
    pub tilt_limit: f32,
    pub beam_angular_damping: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    /// Height of the rim at each end of a platform, above its top face
    pub platform_rim_height: f32,
    pub platform_rim_thickness: f32,
    pub platform_damping: f32,
    pub tether_length: f32,
    pub tether_stiffness: f32,
    pub tether_damping: f32,
    pub density: f32,
    pub friction: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            ground_center_y: 380.0,
            ground_height: 20.0,
            boundary_thickness: 20.0,
            post_width: 8.0,
            post_top: 210.0,
            post_bottom: 390.0,
            beam_width: 200.0,
            beam_height: 6.0,
            pivot_drop: 10.0,
            arm_length: 90.0,
            tilt_limit: 0.35,
            beam_angular_damping: 2.0,
            platform_width: 124.0,
            platform_height: 8.0,
            platform_rim_height: 20.0,
            platform_rim_thickness: 4.0,
            platform_damping: 1.0,
            tether_length: 40.0,
            tether_stiffness: 1000.0,
            tether_damping: 50.0,
            density: 1.0,
            friction: 0.8,
        }
    }
}

impl RigConfig {
    /// y of the ground's top face
    pub fn ground_top(&self) -> f32 {
        self.ground_center_y - self.ground_height * 0.5
    }
}

/// Sizing and grid placement of weight objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightLayout {
    pub min_size: f32,
    pub size_scale: f32,
    pub columns: usize,
    pub col_spacing: f32,
    pub row_spacing: f32,
    pub pro_base_x: f32,
    pub con_base_x: f32,
    pub base_y: f32,
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
    pub angular_damping: f32,
}

impl Default for WeightLayout {
    fn default() -> Self {
        Self {
            min_size: 6.0,
            size_scale: 1.5,
            columns: 3,
            col_spacing: 32.0,
            row_spacing: 32.0,
            pro_base_x: 128.0,
            con_base_x: 308.0,
            base_y: 100.0,
            restitution: 0.1,
            friction: 0.9,
            density: 1.0,
            angular_damping: 1.0,
        }
    }
}

impl WeightLayout {
    /// Radius of the weight object for an item of the given weight
    pub fn size(&self, weight: u8) -> f32 {
        (f32::from(weight) * self.size_scale).max(self.min_size)
    }

    /// Horizontal distance between spawn columns, never less than the widest object
    pub fn col_pitch(&self) -> f32 {
        self.col_spacing.max(self.max_diameter())
    }

    /// Vertical distance between spawn rows, never less than the widest object
    pub fn row_pitch(&self) -> f32 {
        self.row_spacing.max(self.max_diameter())
    }

    fn max_diameter(&self) -> f32 {
        2.0 * self.size(MAX_WEIGHT)
    }

    /// Spawn position of the `index`-th item on `side`, filling rows of `columns`
    /// upward from `base_y`
    pub fn grid_position(&self, side: Side, index: usize) -> [f32; 2] {
        let columns = self.columns.max(1);
        let base_x = match side {
            Side::Pro => self.pro_base_x,
            Side::Con => self.con_base_x,
        };
        let column = (index % columns) as f32;
        let row = (index / columns) as f32;
        [
            base_x + column * self.col_pitch(),
            self.base_y - row * self.row_pitch(),
        ]
    }
}

/// Render loop tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Cap on frames per second; `None` draws on every advance
    pub max_fps: Option<f32>,
    /// Initial capacity of the GPU instance buffer
    pub initial_shape_capacity: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_fps: None,
            initial_shape_capacity: 64,
        }
    }
}
