//! Engine-independent descriptions of bodies and constraints
//!
//! The rig and the synchronizer describe what they want in the world with these
//! plain values; [`World`](super::world::World) turns them into physics objects.

use cgmath::Vector2;

use crate::model::Side;

/// Parts of the fixed apparatus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RigPart {
    Ground,
    Post,
    Beam,
    LeftPlatform,
    RightPlatform,
}

impl RigPart {
    pub const ALL: [RigPart; 5] = [
        RigPart::Ground,
        RigPart::Post,
        RigPart::Beam,
        RigPart::LeftPlatform,
        RigPart::RightPlatform,
    ];
}

/// Stable identity of a body inside one world
///
/// Apparatus keys sort before weight keys, which keeps the apparatus at the
/// back when bodies are drawn in key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BodyKey {
    Rig(RigPart),
    /// A weight object; `serial` is never reused by the synchronizer that issued it
    Weight { side: Side, serial: u64 },
}

impl BodyKey {
    pub fn is_weight(&self) -> bool {
        matches!(self, BodyKey::Weight { .. })
    }
}

/// Stable identity of a rig constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointKey {
    BeamToPost,
    LeftPlatformToBeam,
    RightPlatformToBeam,
}

/// What a body stands for, used to pick its drawing style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRole {
    Apparatus(RigPart),
    Weight { side: Side, weight: u8 },
}

/// Collision shape, sized in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect {
        width: f32,
        height: f32,
    },
    Circle {
        radius: f32,
    },
    /// A floor centred on the body with a wall rising from each end, open at the top
    Tray {
        width: f32,
        height: f32,
        wall_thickness: f32,
        /// Height of each wall above the floor's top face
        wall_height: f32,
    },
}

/// One box of a rectangular shape, in the body's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Panel {
    pub offset: Vector2<f32>,
    pub half_extents: Vector2<f32>,
}

impl Shape {
    /// Boxes a rect or tray is made of, floor first; empty for a circle
    pub fn panels(&self) -> Vec<Panel> {
        match *self {
            Shape::Rect { width, height } => vec![Panel {
                offset: Vector2::new(0.0, 0.0),
                half_extents: Vector2::new(width * 0.5, height * 0.5),
            }],
            Shape::Circle { .. } => Vec::new(),
            Shape::Tray {
                width,
                height,
                wall_thickness,
                wall_height,
            } => {
                let wall_x = (width - wall_thickness) * 0.5;
                let wall_y = -(height + wall_height) * 0.5;
                let wall = |x: f32| Panel {
                    offset: Vector2::new(x, wall_y),
                    half_extents: Vector2::new(wall_thickness * 0.5, wall_height * 0.5),
                };
                vec![
                    Panel {
                        offset: Vector2::new(0.0, 0.0),
                        half_extents: Vector2::new(width * 0.5, height * 0.5),
                    },
                    wall(-wall_x),
                    wall(wall_x),
                ]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Fixed,
    Dynamic,
}

/// Which bodies a body touches
///
/// Frame parts (post and beam) touch nothing, so weights fall past the beam onto
/// the pans. Platforms catch weights and can rest on the ground. Weights touch
/// everything except the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionClass {
    Ground,
    Frame,
    Platform,
    Weight,
}

/// Everything needed to create one rigid body with a single collider
#[derive(Debug, Clone, PartialEq)]
pub struct BodySpec {
    pub key: BodyKey,
    pub role: BodyRole,
    pub shape: Shape,
    /// Centre of the body, in canvas units
    pub position: Vector2<f32>,
    pub motion: Motion,
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub lock_rotation: bool,
    pub collision: CollisionClass,
}

/// How a constraint lets its two bodies move relative to each other
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstraintKind {
    /// Rigid pin at zero rest length; free rotation within `±tilt_limit` radians
    Pivot { tilt_limit: f32 },
    /// Damped spring holding the anchors about `rest_length` apart
    Tether {
        rest_length: f32,
        stiffness: f32,
        damping: f32,
    },
}

/// A joint between two bodies, anchored in each body's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintSpec {
    pub key: JointKey,
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub anchor_a: Vector2<f32>,
    pub anchor_b: Vector2<f32>,
    pub kind: ConstraintKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_has_no_panels() {
        assert!(Shape::Circle { radius: 4.0 }.panels().is_empty());
    }

    #[test]
    fn test_tray_walls_stand_on_floor_ends() {
        let tray = Shape::Tray {
            width: 100.0,
            height: 10.0,
            wall_thickness: 4.0,
            wall_height: 20.0,
        };
        let panels = tray.panels();
        assert_eq!(panels.len(), 3);
        assert_eq!(panels[0].half_extents, Vector2::new(50.0, 5.0));

        for (wall, side) in panels[1..].iter().zip([-1.0, 1.0]) {
            // Outer face flush with the floor's end
            assert_eq!(wall.offset.x + side * wall.half_extents.x, side * 50.0);
            // Bottom on the floor's top face, top `wall_height` above it
            assert_eq!(wall.offset.y + wall.half_extents.y, -5.0);
            assert_eq!(wall.offset.y - wall.half_extents.y, -25.0);
        }
    }
}
