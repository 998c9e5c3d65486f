//! Keeps the world's weight objects in step with the two item collections
//!
//! Every pass is a full rebuild: all tracked weight objects are removed and one
//! fresh object per item is inserted, even when nothing changed. The whole pass
//! is planned up front and then applied under a single `&mut World` borrow, so
//! a renderer can only ever see the world before or after a pass.

use cgmath::Vector2;

use super::body::{BodyKey, BodyRole, BodySpec, CollisionClass, Motion, Shape};
use super::world::World;
use crate::config::WeightLayout;
use crate::model::{Side, WeightedItem};

/// Everything one reconciliation pass will do, computed before the world is touched
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationPlan {
    pub removals: Vec<BodyKey>,
    pub additions: Vec<BodySpec>,
}

impl ReconciliationPlan {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty()
    }
}

/// Outcome of an applied pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub removed: usize,
    pub added_pros: usize,
    pub added_cons: usize,
}

/// Owns the weight objects of one world
#[derive(Debug)]
pub struct DatasetSynchronizer {
    layout: WeightLayout,
    next_serial: u64,
    pros_objects: Vec<BodyKey>,
    cons_objects: Vec<BodyKey>,
    passes: u64,
}

impl DatasetSynchronizer {
    pub fn new(layout: WeightLayout) -> Self {
        Self {
            layout,
            next_serial: 0,
            pros_objects: Vec::new(),
            cons_objects: Vec::new(),
            passes: 0,
        }
    }

    pub fn layout(&self) -> &WeightLayout {
        &self.layout
    }

    /// Describe the weight object for the `index`-th item on `side`
    pub fn weight_object(
        &self,
        side: Side,
        index: usize,
        item: &WeightedItem,
        serial: u64,
    ) -> BodySpec {
        let [x, y] = self.layout.grid_position(side, index);
        BodySpec {
            key: BodyKey::Weight { side, serial },
            role: BodyRole::Weight {
                side,
                weight: item.weight,
            },
            shape: Shape::Circle {
                radius: self.layout.size(item.weight),
            },
            position: Vector2::new(x, y),
            motion: Motion::Dynamic,
            density: self.layout.density,
            friction: self.layout.friction,
            restitution: self.layout.restitution,
            linear_damping: 0.0,
            angular_damping: self.layout.angular_damping,
            lock_rotation: false,
            collision: CollisionClass::Weight,
        }
    }

    /// Compute the pass for the given collections without touching any world
    ///
    /// Serials handed out here are never reused, so every planned object gets a
    /// fresh identity.
    pub fn plan(&mut self, pros: &[WeightedItem], cons: &[WeightedItem]) -> ReconciliationPlan {
        let removals = self
            .pros_objects
            .iter()
            .chain(self.cons_objects.iter())
            .copied()
            .collect();

        let mut additions = Vec::with_capacity(pros.len() + cons.len());
        for (side, items) in [(Side::Pro, pros), (Side::Con, cons)] {
            for (index, item) in items.iter().enumerate() {
                let serial = self.next_serial;
                self.next_serial += 1;
                additions.push(self.weight_object(side, index, item, serial));
            }
        }

        ReconciliationPlan {
            removals,
            additions,
        }
    }

    /// Apply a plan to `world` and replace both tracking sets
    pub fn apply(&mut self, world: &mut World, plan: ReconciliationPlan) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for key in &plan.removals {
            if world.remove_body(*key) {
                report.removed += 1;
            }
        }
        self.pros_objects.clear();
        self.cons_objects.clear();

        for spec in &plan.additions {
            world.insert_body(spec);
            match spec.key {
                BodyKey::Weight {
                    side: Side::Pro, ..
                } => {
                    self.pros_objects.push(spec.key);
                    report.added_pros += 1;
                }
                BodyKey::Weight {
                    side: Side::Con, ..
                } => {
                    self.cons_objects.push(spec.key);
                    report.added_cons += 1;
                }
                BodyKey::Rig(part) => {
                    log::warn!("Ignoring apparatus part {:?} in a reconciliation plan", part);
                }
            }
        }

        self.passes += 1;
        log::debug!(
            "Reconciled world {} (pass {}): removed {}, added {} pros and {} cons",
            world.id(),
            self.passes,
            report.removed,
            report.added_pros,
            report.added_cons
        );
        report
    }

    /// Make the world's weight objects match `pros` and `cons`
    pub fn reconcile(
        &mut self,
        world: &mut World,
        pros: &[WeightedItem],
        cons: &[WeightedItem],
    ) -> ReconcileReport {
        let plan = self.plan(pros, cons);
        self.apply(world, plan)
    }

    /// Drop the tracking sets without touching any world; used when the world
    /// itself is being released
    pub fn forget(&mut self) {
        self.pros_objects.clear();
        self.cons_objects.clear();
    }

    pub fn tracked(&self, side: Side) -> &[BodyKey] {
        match side {
            Side::Pro => &self.pros_objects,
            Side::Con => &self.cons_objects,
        }
    }

    pub fn pros_objects(&self) -> &[BodyKey] {
        &self.pros_objects
    }

    pub fn cons_objects(&self) -> &[BodyKey] {
        &self.cons_objects
    }

    /// Number of passes applied so far
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
