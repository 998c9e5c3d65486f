//! Places frames can be drawn to

use super::frame::Frame;
use crate::error::{LibraError, Result};

/// A drawing surface owned by a host region
///
/// `detach` releases the surface from its host. It must be safe to call more
/// than once; presenting after detaching is an error.
pub trait DrawSurface {
    fn present(&mut self, frame: &Frame) -> Result<()>;

    fn detach(&mut self) -> Result<()>;

    fn is_attached(&self) -> bool;
}

/// Surface that keeps the most recent frame in memory
#[derive(Debug)]
pub struct HeadlessSurface {
    attached: bool,
    last_frame: Option<Frame>,
    frames_presented: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self {
            attached: true,
            last_frame: None,
            frames_presented: 0,
        }
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last_frame.as_ref()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSurface for HeadlessSurface {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        if !self.attached {
            return Err(LibraError::SurfaceDetached);
        }
        self.last_frame = Some(frame.clone());
        self.frames_presented += 1;
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        self.attached = false;
        self.last_frame = None;
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}
