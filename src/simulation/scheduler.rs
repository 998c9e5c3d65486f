//! The two cooperative loops of a running visualization
//!
//! Both loops are driven from one thread by repeated `advance` calls. The
//! simulation loop turns wall-clock time into fixed physics steps; the render
//! loop decides whether a frame is due.

use crate::config::{PhysicsConfig, RenderConfig};

/// Fixed-timestep accumulator for the physics tick
#[derive(Debug, Clone)]
pub struct SimulationLoop {
    timestep: f32,
    time_scale: f32,
    max_steps: u32,
    accumulated_time: f32,
    paused: bool,
    total_steps: u64,
}

impl SimulationLoop {
    pub fn new(config: &PhysicsConfig) -> Self {
        Self {
            timestep: config.timestep.max(f32::EPSILON),
            time_scale: config.time_scale,
            max_steps: config.max_steps_per_advance.max(1),
            accumulated_time: 0.0,
            paused: false,
            total_steps: 0,
        }
    }

    /// Feed `delta_time` seconds of wall-clock time and return how many fixed
    /// steps are now due
    ///
    /// At most `max_steps_per_advance` steps are returned; time beyond that is
    /// dropped so a long stall does not snowball into ever longer catch-up.
    pub fn accumulate(&mut self, delta_time: f32) -> u32 {
        if self.paused || !delta_time.is_finite() || delta_time <= 0.0 {
            return 0;
        }

        self.accumulated_time += delta_time * self.time_scale;
        let mut steps = 0;
        while self.accumulated_time >= self.timestep && steps < self.max_steps {
            self.accumulated_time -= self.timestep;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulated_time >= self.timestep {
            log::trace!(
                "Dropping {:.3}s of simulation backlog",
                self.accumulated_time
            );
            self.accumulated_time = 0.0;
        }

        self.total_steps += u64::from(steps);
        steps
    }

    pub fn timestep(&self) -> f32 {
        self.timestep
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale.max(0.0);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }
}

/// Frame pacing for the render loop
#[derive(Debug, Clone)]
pub struct RenderLoop {
    interval: Option<f32>,
    since_last_frame: f32,
    frames: u64,
}

impl RenderLoop {
    pub fn new(config: &RenderConfig) -> Self {
        let interval = config
            .max_fps
            .filter(|fps| fps.is_finite() && *fps > 0.0)
            .map(|fps| 1.0 / fps);
        Self {
            interval,
            since_last_frame: 0.0,
            frames: 0,
        }
    }

    /// Whether a frame should be drawn after `delta_time` more seconds
    ///
    /// The first call always draws so a freshly mounted surface is never blank.
    pub fn due(&mut self, delta_time: f32) -> bool {
        let Some(interval) = self.interval else {
            return true;
        };
        if self.frames == 0 {
            return true;
        }
        self.since_last_frame += delta_time.max(0.0);
        if self.since_last_frame >= interval {
            self.since_last_frame %= interval;
            true
        } else {
            false
        }
    }

    /// Record a presented frame
    pub fn frame_presented(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// The live loops of one visualization; both are `None` once stopped
#[derive(Debug, Default)]
pub struct LoopHandles {
    pub simulation: Option<SimulationLoop>,
    pub render: Option<RenderLoop>,
}

impl LoopHandles {
    pub fn start(physics: &PhysicsConfig, render: &RenderConfig) -> Self {
        Self {
            simulation: Some(SimulationLoop::new(physics)),
            render: Some(RenderLoop::new(render)),
        }
    }

    pub fn stop_simulation(&mut self) -> bool {
        self.simulation.take().is_some()
    }

    pub fn stop_render(&mut self) -> bool {
        self.render.take().is_some()
    }

    pub fn is_live(&self) -> bool {
        self.simulation.is_some() || self.render.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            timestep: 0.01,
            max_steps_per_advance: 5,
            ..PhysicsConfig::default()
        }
    }

    #[test]
    fn test_accumulator_carries_remainder() {
        let mut sim = SimulationLoop::new(&physics());
        assert_eq!(sim.accumulate(0.025), 2);
        assert_eq!(sim.accumulate(0.006), 1);
        assert_eq!(sim.accumulate(0.0), 0);
        assert_eq!(sim.total_steps(), 3);
    }

    #[test]
    fn test_steps_are_capped_and_backlog_dropped() {
        let mut sim = SimulationLoop::new(&physics());
        assert_eq!(sim.accumulate(1.0), 5);
        // The backlog was discarded, so a small delta yields nothing new
        assert_eq!(sim.accumulate(0.005), 0);
    }

    #[test]
    fn test_time_scale_and_pause() {
        let mut sim = SimulationLoop::new(&physics());
        sim.set_time_scale(2.0);
        assert_eq!(sim.accumulate(0.0225), 4);

        sim.set_paused(true);
        assert_eq!(sim.accumulate(0.5), 0);
        sim.set_paused(false);
        assert_eq!(sim.accumulate(f32::NAN), 0);
        assert_eq!(sim.accumulate(-1.0), 0);
    }

    #[test]
    fn test_uncapped_render_loop_is_always_due() {
        let mut render = RenderLoop::new(&RenderConfig::default());
        assert!(render.due(0.0));
        render.frame_presented();
        assert!(render.due(0.0));
    }

    #[test]
    fn test_capped_render_loop_paces_frames() {
        let mut render = RenderLoop::new(&RenderConfig {
            max_fps: Some(10.0),
            ..RenderConfig::default()
        });
        assert!(render.due(0.0));
        render.frame_presented();
        assert!(!render.due(0.05));
        assert!(render.due(0.06));
        render.frame_presented();
        assert_eq!(render.frames(), 2);
    }

    #[test]
    fn test_handles_stop_once() {
        let mut handles = LoopHandles::start(&physics(), &RenderConfig::default());
        assert!(handles.is_live());
        assert!(handles.stop_simulation());
        assert!(!handles.stop_simulation());
        assert!(handles.stop_render());
        assert!(!handles.is_live());
        assert!(!LoopHandles::default().is_live());
    }
}
