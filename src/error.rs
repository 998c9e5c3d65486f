//! Error types for the balance visualization
//!
//! The core has almost no recoverable failures: inputs are validated upstream and
//! reconciliation cannot fail. What remains is setup (surface acquisition,
//! configuration) and teardown reporting.

use thiserror::Error;

use crate::simulation::{BodyKey, JointKey, WorldId};

/// Errors raised by the visualization core and its drawing surfaces
#[derive(Debug, Error)]
pub enum LibraError {
    /// No drawing surface could be acquired from the host
    #[error("drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// The surface has already been detached from its host
    #[error("drawing surface is detached")]
    SurfaceDetached,

    /// A frame could not be presented
    #[error("failed to present frame: {0}")]
    Present(String),

    /// `start` was called on a visualization that is already mounted
    #[error("visualization is already running")]
    AlreadyRunning,

    /// A constraint was inserted before one of the bodies it binds
    #[error("constraint {joint:?} references body {body:?}, which is not in the world")]
    MissingBody { joint: JointKey, body: BodyKey },

    /// A renderer was handed a world other than the one it was bound to
    #[error("renderer bound to world {expected} was asked to draw world {actual}")]
    ForeignWorld { expected: WorldId, actual: WorldId },

    /// The configuration file could not be read
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`crate::config::ScaleConfig`]
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = LibraError> = std::result::Result<T, E>;
