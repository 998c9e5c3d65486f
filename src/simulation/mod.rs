//! Physics side of the balance
//!
//! The rig describes the apparatus, the world simulates it, the synchronizer
//! keeps weight objects in line with the item collections, and the lifecycle
//! controller ties them to a drawing surface and the two loops.

pub mod body;
pub mod lifecycle;
pub mod rig;
pub mod scheduler;
pub mod sync;
pub mod world;

pub use body::{BodyKey, BodyRole, BodySpec, ConstraintSpec, JointKey, Panel, RigPart, Shape};
pub use lifecycle::{LifecycleState, Visualization};
pub use rig::Rig;
pub use scheduler::{LoopHandles, RenderLoop, SimulationLoop};
pub use sync::{DatasetSynchronizer, ReconcileReport, ReconciliationPlan};
pub use world::{BodyView, World, WorldId};
