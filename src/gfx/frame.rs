//! Turning a world into a draw list
//!
//! A [`Frame`] is the complete, surface-independent description of one picture
//! of the balance. [`Renderer`] builds frames for the one world it was bound to
//! and hands them to a [`DrawSurface`].

use cgmath::{Basis2, Rad, Rotation, Rotation2, Vector2};

use super::palette::{Palette, Rgba, Style};
use super::surface::DrawSurface;
use crate::config::Canvas;
use crate::error::{LibraError, Result};
use crate::simulation::{BodyKey, BodyRole, RigPart, Shape, World, WorldId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rect,
    Circle,
}

/// One body, ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeInstance {
    pub key: BodyKey,
    pub kind: ShapeKind,
    /// Centre in canvas units
    pub center: Vector2<f32>,
    pub half_extents: Vector2<f32>,
    /// Clockwise rotation on screen, in radians
    pub angle: f32,
    pub style: Style,
}

/// Draw list for one picture of the canvas, back to front
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub world: WorldId,
    pub width: f32,
    pub height: f32,
    /// Canvas background; transparent so the host background shows through
    pub background: Rgba,
    pub shapes: Vec<ShapeInstance>,
    /// Simulated time at capture
    pub elapsed: f32,
}

impl Frame {
    /// Snapshot every body of `world`, styled by role
    ///
    /// A tray becomes one rect per panel, so a body may contribute several shapes.
    pub fn capture(world: &World, palette: &Palette, canvas: &Canvas) -> Self {
        let mut shapes = Vec::with_capacity(world.body_count());
        for body in world.bodies() {
            let style = style_for(palette, body.role);
            if let Shape::Circle { radius } = body.shape {
                shapes.push(ShapeInstance {
                    key: body.key,
                    kind: ShapeKind::Circle,
                    center: body.position,
                    half_extents: Vector2::new(radius, radius),
                    angle: body.angle,
                    style,
                });
                continue;
            }

            let rotation: Basis2<f32> = Rotation2::from_angle(Rad(body.angle));
            for panel in body.shape.panels() {
                shapes.push(ShapeInstance {
                    key: body.key,
                    kind: ShapeKind::Rect,
                    center: body.position + rotation.rotate_vector(panel.offset),
                    half_extents: panel.half_extents,
                    angle: body.angle,
                    style,
                });
            }
        }

        Self {
            world: world.id(),
            width: canvas.width,
            height: canvas.height,
            background: Rgba::TRANSPARENT,
            shapes,
            elapsed: world.elapsed(),
        }
    }

    pub fn count(&self, kind: ShapeKind) -> usize {
        self.shapes.iter().filter(|s| s.kind == kind).count()
    }
}

fn style_for(palette: &Palette, role: BodyRole) -> Style {
    match role {
        BodyRole::Apparatus(part) => Palette::solid(match part {
            RigPart::Ground => palette.ground,
            RigPart::Post => palette.post,
            RigPart::Beam => palette.beam,
            RigPart::LeftPlatform | RigPart::RightPlatform => palette.platform,
        }),
        BodyRole::Weight { side, weight } => palette.weight_style(side, weight),
    }
}

/// Draws one world, and only that world, onto surfaces
#[derive(Debug, Clone)]
pub struct Renderer {
    world: WorldId,
    palette: Palette,
    canvas: Canvas,
}

impl Renderer {
    pub fn bind(world: &World, palette: Palette, canvas: Canvas) -> Self {
        log::debug!("Renderer bound to world {}", world.id());
        Self {
            world: world.id(),
            palette,
            canvas,
        }
    }

    pub fn world_id(&self) -> WorldId {
        self.world
    }

    pub fn capture(&self, world: &World) -> Result<Frame> {
        if world.id() != self.world {
            return Err(LibraError::ForeignWorld {
                expected: self.world,
                actual: world.id(),
            });
        }
        Ok(Frame::capture(world, &self.palette, &self.canvas))
    }

    /// Capture `world` and present it on `surface`
    pub fn draw<S: DrawSurface + ?Sized>(&self, world: &World, surface: &mut S) -> Result<()> {
        let frame = self.capture(world)?;
        surface.present(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhysicsConfig, RigConfig, WeightLayout};
    use crate::gfx::surface::HeadlessSurface;
    use crate::model::{Side, WeightedItem};
    use crate::simulation::{DatasetSynchronizer, Rig};

    fn populated_world() -> World {
        let mut world = World::new(&PhysicsConfig::default());
        world
            .insert_rig(&Rig::build(&Canvas::default(), &RigConfig::default()))
            .unwrap();
        let mut sync = DatasetSynchronizer::new(WeightLayout::default());
        sync.reconcile(
            &mut world,
            &[WeightedItem::new(1, "a", 10)],
            &[WeightedItem::new(2, "b", 1), WeightedItem::new(3, "c", 4)],
        );
        world
    }

    #[test]
    fn test_capture_covers_every_body() {
        let world = populated_world();
        let frame = Frame::capture(&world, &Palette::default(), &Canvas::default());
        // Ground and both platforms are trays of three panels each
        assert_eq!(frame.shapes.len(), 14);
        assert_eq!(frame.count(ShapeKind::Rect), 11);
        assert_eq!(frame.count(ShapeKind::Circle), 3);
        assert_eq!(frame.background, Rgba::TRANSPARENT);
        assert_eq!((frame.width, frame.height), (500.0, 400.0));
    }

    #[test]
    fn test_styles_follow_roles() {
        let palette = Palette::default();
        let world = populated_world();
        let frame = Frame::capture(&world, &palette, &Canvas::default());

        for shape in &frame.shapes {
            match shape.key {
                BodyKey::Rig(RigPart::Beam) => assert_eq!(shape.style.fill, palette.beam),
                BodyKey::Rig(RigPart::LeftPlatform) => {
                    assert_eq!(shape.style.fill, palette.platform)
                }
                BodyKey::Weight {
                    side: Side::Pro, ..
                } => assert_eq!(shape.style, palette.weight_style(Side::Pro, 10)),
                BodyKey::Weight {
                    side: Side::Con, ..
                } => assert!(palette.con_shades.contains(&shape.style.fill)),
                _ => {}
            }
        }
    }

    #[test]
    fn test_weights_draw_above_apparatus() {
        let world = populated_world();
        let frame = Frame::capture(&world, &Palette::default(), &Canvas::default());
        let first_weight = frame.shapes.iter().position(|s| s.key.is_weight()).unwrap();
        assert!(frame.shapes[first_weight..].iter().all(|s| s.key.is_weight()));
    }

    #[test]
    fn test_platform_draws_floor_and_rims() {
        let world = populated_world();
        let frame = Frame::capture(&world, &Palette::default(), &Canvas::default());
        let key = BodyKey::Rig(RigPart::LeftPlatform);
        let platform = world.body(key).unwrap();
        let parts: Vec<&ShapeInstance> = frame.shapes.iter().filter(|s| s.key == key).collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].center, platform.position);
        assert!(parts[1].center.x < platform.position.x);
        assert!(parts[2].center.x > platform.position.x);
        for rim in &parts[1..] {
            assert!(rim.center.y < platform.position.y);
            assert!(rim.half_extents.y > rim.half_extents.x);
        }
    }

    #[test]
    fn test_renderer_rejects_foreign_world() {
        let bound = populated_world();
        let other = World::new(&PhysicsConfig::default());
        let renderer = Renderer::bind(&bound, Palette::default(), Canvas::default());

        let mut surface = HeadlessSurface::new();
        renderer.draw(&bound, &mut surface).unwrap();
        assert_eq!(surface.frames_presented(), 1);

        let err = renderer.draw(&other, &mut surface).unwrap_err();
        assert!(matches!(err, LibraError::ForeignWorld { .. }));
        assert_eq!(surface.frames_presented(), 1);
    }
}
