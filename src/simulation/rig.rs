//! The fixed apparatus: ground, post, pivoting beam and two hanging pans
//!
//! Building a rig is pure geometry. Nothing is inserted into a world here; see
//! [`World::insert_rig`](super::world::World::insert_rig).

use cgmath::Vector2;

use super::body::{
    BodyKey, BodyRole, BodySpec, CollisionClass, ConstraintKind, ConstraintSpec, JointKey, Motion,
    RigPart, Shape,
};
use crate::config::{Canvas, RigConfig};

/// Bodies and constraints of the apparatus, in a fixed order
///
/// Bodies are `[ground, post, beam, left platform, right platform]` and
/// constraints are `[beam to post, left platform to beam, right platform to beam]`.
///
/// The ground is a tray whose walls stand just outside the left and right
/// canvas edges and reach a canvas height above its top, so weight objects that
/// miss a platform still come to rest inside the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Rig {
    bodies: Vec<BodySpec>,
    constraints: Vec<ConstraintSpec>,
}

impl Rig {
    pub fn build(canvas: &Canvas, config: &RigConfig) -> Self {
        let cx = canvas.center_x();
        let post_height = config.post_bottom - config.post_top;
        let post_center_y = config.post_top + post_height * 0.5;
        let beam_y = config.post_top + config.pivot_drop;
        let platform_y = beam_y + config.tether_length;

        let apparatus = |part: RigPart, shape: Shape, position: Vector2<f32>| BodySpec {
            key: BodyKey::Rig(part),
            role: BodyRole::Apparatus(part),
            shape,
            position,
            motion: Motion::Fixed,
            density: config.density,
            friction: config.friction,
            restitution: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            lock_rotation: false,
            collision: CollisionClass::Frame,
        };

        let ground = BodySpec {
            collision: CollisionClass::Ground,
            ..apparatus(
                RigPart::Ground,
                Shape::Tray {
                    width: canvas.width + 2.0 * config.boundary_thickness,
                    height: config.ground_height,
                    wall_thickness: config.boundary_thickness,
                    wall_height: config.ground_top() + canvas.height,
                },
                Vector2::new(cx, config.ground_center_y),
            )
        };

        let post = apparatus(
            RigPart::Post,
            Shape::Rect {
                width: config.post_width,
                height: post_height,
            },
            Vector2::new(cx, post_center_y),
        );

        let beam = BodySpec {
            motion: Motion::Dynamic,
            angular_damping: config.beam_angular_damping,
            ..apparatus(
                RigPart::Beam,
                Shape::Rect {
                    width: config.beam_width,
                    height: config.beam_height,
                },
                Vector2::new(cx, beam_y),
            )
        };

        let platform = |part: RigPart, x: f32| BodySpec {
            motion: Motion::Dynamic,
            linear_damping: config.platform_damping,
            lock_rotation: true,
            collision: CollisionClass::Platform,
            ..apparatus(
                part,
                Shape::Tray {
                    width: config.platform_width,
                    height: config.platform_height,
                    wall_thickness: config.platform_rim_thickness,
                    wall_height: config.platform_rim_height,
                },
                Vector2::new(x, platform_y),
            )
        };
        let left = platform(RigPart::LeftPlatform, cx - config.arm_length);
        let right = platform(RigPart::RightPlatform, cx + config.arm_length);

        let pivot = ConstraintSpec {
            key: JointKey::BeamToPost,
            body_a: BodyKey::Rig(RigPart::Post),
            body_b: BodyKey::Rig(RigPart::Beam),
            anchor_a: Vector2::new(0.0, config.post_top - post_center_y),
            anchor_b: Vector2::new(0.0, -config.pivot_drop),
            kind: ConstraintKind::Pivot {
                tilt_limit: config.tilt_limit,
            },
        };

        let tether = |key: JointKey, part: RigPart, arm: f32| ConstraintSpec {
            key,
            body_a: BodyKey::Rig(RigPart::Beam),
            body_b: BodyKey::Rig(part),
            anchor_a: Vector2::new(arm, 0.0),
            anchor_b: Vector2::new(0.0, 0.0),
            kind: ConstraintKind::Tether {
                rest_length: config.tether_length,
                stiffness: config.tether_stiffness,
                damping: config.tether_damping,
            },
        };

        Self {
            bodies: vec![ground, post, beam, left, right],
            constraints: vec![
                pivot,
                tether(
                    JointKey::LeftPlatformToBeam,
                    RigPart::LeftPlatform,
                    -config.arm_length,
                ),
                tether(
                    JointKey::RightPlatformToBeam,
                    RigPart::RightPlatform,
                    config.arm_length,
                ),
            ],
        }
    }

    pub fn bodies(&self) -> &[BodySpec] {
        &self.bodies
    }

    pub fn constraints(&self) -> &[ConstraintSpec] {
        &self.constraints
    }

    pub fn body(&self, part: RigPart) -> Option<&BodySpec> {
        self.bodies.iter().find(|b| b.key == BodyKey::Rig(part))
    }

    pub fn constraint(&self, key: JointKey) -> Option<&ConstraintSpec> {
        self.constraints.iter().find(|c| c.key == key)
    }

    /// World-space point the beam turns about
    pub fn pivot(&self) -> Option<Vector2<f32>> {
        let constraint = self.constraint(JointKey::BeamToPost)?;
        let post = self.body(RigPart::Post)?;
        Some(post.position + constraint.anchor_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    fn default_rig() -> Rig {
        Rig::build(&Canvas::default(), &RigConfig::default())
    }

    fn part(rig: &Rig, part: RigPart) -> &BodySpec {
        rig.body(part).unwrap()
    }

    fn spec_position(rig: &Rig, key: BodyKey) -> Vector2<f32> {
        rig.bodies().iter().find(|b| b.key == key).unwrap().position
    }

    #[test]
    fn test_rig_order_and_counts() {
        let rig = default_rig();
        let keys: Vec<BodyKey> = rig.bodies().iter().map(|b| b.key).collect();
        let expected: Vec<BodyKey> = RigPart::ALL.iter().map(|p| BodyKey::Rig(*p)).collect();
        assert_eq!(keys, expected);

        let joints: Vec<JointKey> = rig.constraints().iter().map(|c| c.key).collect();
        assert_eq!(
            joints,
            vec![
                JointKey::BeamToPost,
                JointKey::LeftPlatformToBeam,
                JointKey::RightPlatformToBeam
            ]
        );
    }

    #[test]
    fn test_only_ground_and_post_are_fixed() {
        let rig = default_rig();
        for body in rig.bodies() {
            let fixed = matches!(body.key, BodyKey::Rig(RigPart::Ground | RigPart::Post));
            assert_eq!(body.motion == Motion::Fixed, fixed, "{:?}", body.key);
        }
    }

    #[test]
    fn test_geometry_is_symmetric() {
        let rig = default_rig();
        let cx = Canvas::default().center_x();
        let left = part(&rig, RigPart::LeftPlatform).position;
        let right = part(&rig, RigPart::RightPlatform).position;
        assert_eq!(left.y, right.y);
        assert!((cx - left.x - (right.x - cx)).abs() < 1e-4);
        assert_eq!(part(&rig, RigPart::Beam).position.x, cx);
        assert_eq!(part(&rig, RigPart::Ground).position.y, 380.0);
    }

    #[test]
    fn test_pivot_anchors_coincide() {
        let rig = default_rig();
        let pivot = rig.constraint(JointKey::BeamToPost).unwrap();
        let on_post = spec_position(&rig, pivot.body_a) + pivot.anchor_a;
        let on_beam = spec_position(&rig, pivot.body_b) + pivot.anchor_b;
        assert!((on_post - on_beam).magnitude() < 1e-4);
        assert_eq!(rig.pivot(), Some(on_post));
        // Pivot sits above the beam's centre so the empty scale rights itself
        assert!(on_post.y < part(&rig, RigPart::Beam).position.y);
        assert!(matches!(pivot.kind, ConstraintKind::Pivot { tilt_limit } if tilt_limit > 0.0));
    }

    #[test]
    fn test_tethers_start_at_rest_length() {
        let rig = default_rig();
        for tether in &rig.constraints()[1..] {
            let ConstraintKind::Tether {
                rest_length,
                stiffness,
                ..
            } = tether.kind
            else {
                panic!("platform joints are tethers");
            };
            let a = spec_position(&rig, tether.body_a) + tether.anchor_a;
            let b = spec_position(&rig, tether.body_b) + tether.anchor_b;
            assert!(((a - b).magnitude() - rest_length).abs() < 1e-4);
            assert!(stiffness.is_finite() && stiffness > 0.0);
        }
    }

    #[test]
    fn test_platforms_hang_below_beam_and_stay_level() {
        let rig = default_rig();
        let beam = part(&rig, RigPart::Beam);
        for side in [RigPart::LeftPlatform, RigPart::RightPlatform] {
            let platform = part(&rig, side);
            assert!(platform.position.y > beam.position.y);
            assert!(platform.lock_rotation);
            assert!(platform.linear_damping > 0.0);
            assert_eq!(platform.collision, CollisionClass::Platform);
            assert!(matches!(platform.shape, Shape::Tray { wall_height, .. } if wall_height > 0.0));
        }
    }

    #[test]
    fn test_ground_walls_stand_outside_canvas() {
        let canvas = Canvas::default();
        let config = RigConfig::default();
        let rig = Rig::build(&canvas, &config);
        let ground = part(&rig, RigPart::Ground);
        let panels = ground.shape.panels();
        assert_eq!(panels.len(), 3);

        let floor = panels[0];
        assert_eq!(ground.position.y - floor.half_extents.y, config.ground_top());

        let left = ground.position + panels[1].offset;
        let right = ground.position + panels[2].offset;
        assert_eq!(left.x + panels[1].half_extents.x, 0.0);
        assert_eq!(right.x - panels[2].half_extents.x, canvas.width);
        // Walls reach from the ground's top past the top of the canvas
        assert!(left.y - panels[1].half_extents.y < 0.0);
        assert_eq!(left.y + panels[1].half_extents.y, config.ground_top());
    }

    #[test]
    fn test_lookups_find_parts_by_key() {
        let rig = default_rig();
        for p in RigPart::ALL {
            assert_eq!(part(&rig, p).key, BodyKey::Rig(p));
        }
        assert_eq!(
            rig.constraint(JointKey::RightPlatformToBeam).unwrap().body_b,
            BodyKey::Rig(RigPart::RightPlatform)
        );
    }
}
