//! Mount and unmount of one balance visualization
//!
//! A [`Visualization`] is either uninitialized or running. Starting it builds
//! the rig, creates the world, binds a renderer and starts both loops. Stopping
//! it tears all of that down again, and dropping it stops it.

use super::rig::Rig;
use super::scheduler::LoopHandles;
use super::sync::{DatasetSynchronizer, ReconcileReport};
use super::world::World;
use crate::config::ScaleConfig;
use crate::error::{LibraError, Result};
use crate::gfx::frame::Renderer;
use crate::gfx::surface::DrawSurface;
use crate::model::{Tally, WeightedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Running,
}

/// Resources that only exist while running
struct Mounted {
    world: World,
    renderer: Renderer,
}

/// One balance visualization drawing onto a surface of type `S`
pub struct Visualization<S: DrawSurface> {
    config: ScaleConfig,
    synchronizer: DatasetSynchronizer,
    loops: LoopHandles,
    pros: Vec<WeightedItem>,
    cons: Vec<WeightedItem>,
    mounted: Option<Mounted>,
    surface: Option<S>,
}

impl<S: DrawSurface> Visualization<S> {
    pub fn new(config: ScaleConfig) -> Self {
        let synchronizer = DatasetSynchronizer::new(config.weights.clone());
        Self {
            config,
            synchronizer,
            loops: LoopHandles::default(),
            pros: Vec::new(),
            cons: Vec::new(),
            mounted: None,
            surface: None,
        }
    }

    /// Mount onto `surface` and start both loops
    ///
    /// Collections handed in before mounting are reconciled right away.
    pub fn start(&mut self, mut surface: S) -> Result<()> {
        if self.mounted.is_some() {
            return Err(LibraError::AlreadyRunning);
        }

        let rig = Rig::build(&self.config.canvas, &self.config.rig);
        let mut world = World::new(&self.config.physics);
        if let Err(err) = world.insert_rig(&rig) {
            if let Err(detach_err) = surface.detach() {
                log::warn!("Failed to detach surface after setup error: {}", detach_err);
            }
            return Err(err);
        }

        let renderer = Renderer::bind(
            &world,
            self.config.palette.clone(),
            self.config.canvas.clone(),
        );
        self.synchronizer = DatasetSynchronizer::new(self.config.weights.clone());
        self.synchronizer
            .reconcile(&mut world, &self.pros, &self.cons);
        self.loops = LoopHandles::start(&self.config.physics, &self.config.render);

        log::info!(
            "Visualization started on world {} ({}x{})",
            world.id(),
            self.config.canvas.width,
            self.config.canvas.height
        );
        self.mounted = Some(Mounted { world, renderer });
        self.surface = Some(surface);
        Ok(())
    }

    /// Hand in the latest collections; reconciles at once when running
    pub fn set_collections(
        &mut self,
        pros: Vec<WeightedItem>,
        cons: Vec<WeightedItem>,
    ) -> Option<ReconcileReport> {
        self.pros = pros;
        self.cons = cons;
        let mounted = self.mounted.as_mut()?;
        Some(
            self.synchronizer
                .reconcile(&mut mounted.world, &self.pros, &self.cons),
        )
    }

    /// Run the physics steps and the frame that are due after `delta_time` seconds
    pub fn advance(&mut self, delta_time: f32) -> Result<()> {
        let Some(mounted) = self.mounted.as_mut() else {
            return Ok(());
        };

        if let Some(simulation) = self.loops.simulation.as_mut() {
            let steps = simulation.accumulate(delta_time);
            let timestep = simulation.timestep();
            for _ in 0..steps {
                mounted.world.step(timestep);
            }
        }

        if let Some(render) = self.loops.render.as_mut() {
            if render.due(delta_time) {
                if let Some(surface) = self.surface.as_mut() {
                    mounted.renderer.draw(&mounted.world, surface)?;
                    render.frame_presented();
                }
            }
        }
        Ok(())
    }

    /// Stop both loops, detach the surface and release the world
    ///
    /// Every step runs even if an earlier one fails; the first failure is
    /// returned afterwards. Stopping a visualization that is not running does
    /// nothing.
    pub fn stop(&mut self) -> Result<()> {
        let Some(mut mounted) = self.mounted.take() else {
            return Ok(());
        };
        let mut first_error = None;

        let simulation_stopped = self.loops.stop_simulation();
        let render_stopped = self.loops.stop_render();
        log::debug!(
            "Stopped loops (simulation: {}, render: {})",
            simulation_stopped,
            render_stopped
        );

        if let Some(surface) = self.surface.as_mut() {
            if let Err(err) = surface.detach() {
                log::warn!("Failed to detach drawing surface: {}", err);
                first_error.get_or_insert(err);
            }
        }

        mounted.world.clear();
        self.synchronizer.forget();
        log::info!("Visualization on world {} stopped", mounted.world.id());

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        if self.mounted.is_some() {
            LifecycleState::Running
        } else {
            LifecycleState::Uninitialized
        }
    }

    pub fn is_running(&self) -> bool {
        self.mounted.is_some()
    }

    pub fn world(&self) -> Option<&World> {
        self.mounted.as_ref().map(|m| &m.world)
    }

    pub fn synchronizer(&self) -> &DatasetSynchronizer {
        &self.synchronizer
    }

    pub fn loops(&self) -> &LoopHandles {
        &self.loops
    }

    pub fn config(&self) -> &ScaleConfig {
        &self.config
    }

    /// Counts and weight sums of the latest collections
    pub fn tally(&self) -> Tally {
        Tally::of(&self.pros, &self.cons)
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }
}

impl<S: DrawSurface> Drop for Visualization<S> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            log::warn!("Teardown on drop failed: {}", err);
        }
    }
}
