use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::config::ScaleConfig;
use crate::error::LibraError;
use crate::gfx::RenderEngine;
use crate::ledger::Ledger;
use crate::model::{Side, Tally, MAX_WEIGHT};
use crate::simulation::Visualization;

/// Window hosting one balance visualization, edited from the keyboard
///
/// Digits pick the weight of the next item (0 means 10), `P` and `C` add a pro
/// or a con, `Z` and `X` remove the last pro or con, `Delete` clears both lists
/// and `Esc` quits.
pub struct LibraApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    visualization: Visualization<RenderEngine>,
    ledger: Ledger,
    pending_weight: u8,
    last_frame: Option<Instant>,
    fatal: Option<LibraError>,
}

impl LibraApp {
    pub fn new(config: ScaleConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                visualization: Visualization::new(config),
                ledger: Ledger::new(),
                pending_weight: 5,
                last_frame: None,
                fatal: None,
            },
        })
    }

    /// The lists shown on the scale; edits made before `run` appear on mount
    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.app_state.ledger
    }

    /// Run the application until the window closes
    ///
    /// A drawing surface that cannot be acquired or presented to ends the run
    /// with that error.
    pub fn run(mut self) -> anyhow::Result<()> {
        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        self.app_state.sync_collections();
        event_loop
            .run_app(&mut self.app_state)
            .context("event loop failed")?;

        if let Some(err) = self.app_state.fatal.take() {
            return Err(err).context("visualization failed");
        }
        self.app_state.visualization.stop()?;
        Ok(())
    }
}

impl AppState {
    fn sync_collections(&mut self) {
        let (pros, cons) = self.ledger.snapshot();
        self.visualization.set_collections(pros, cons);
        self.refresh_title();
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            window.set_title(&window_title(&self.ledger.tally(), self.pending_weight));
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: LibraError) {
        log::error!("{}", err);
        self.fatal.get_or_insert(err);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(err) = self.visualization.stop() {
            log::warn!("Teardown reported an error: {}", err);
        }
        event_loop.exit();
    }

    fn add_item(&mut self, side: Side) {
        let number = match side {
            Side::Pro => self.ledger.pros().len(),
            Side::Con => self.ledger.cons().len(),
        } + 1;
        let label = format!("{} #{}", side.label(), number);
        match self.ledger.add(side, &label, self.pending_weight) {
            Ok(_) => self.sync_collections(),
            Err(err) => log::warn!("Rejected item: {}", err),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        if let Some(weight) = digit_weight(key_code) {
            self.pending_weight = weight;
            self.refresh_title();
            return;
        }

        match key_code {
            KeyCode::Escape => self.shutdown(event_loop),
            KeyCode::KeyP => self.add_item(Side::Pro),
            KeyCode::KeyC => self.add_item(Side::Con),
            KeyCode::KeyZ => {
                if self.ledger.remove_last(Side::Pro).is_some() {
                    self.sync_collections();
                }
            }
            KeyCode::KeyX => {
                if self.ledger.remove_last(Side::Con).is_some() {
                    self.sync_collections();
                }
            }
            KeyCode::Delete => {
                self.ledger.clear();
                self.sync_collections();
            }
            _ => (),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.visualization.config().clone();
        let attributes = WindowAttributes::default()
            .with_title(window_title(&self.ledger.tally(), self.pending_weight))
            .with_inner_size(LogicalSize::new(
                f64::from(config.canvas.width),
                f64::from(config.canvas.height),
            ))
            .with_resizable(false);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                self.fail(event_loop, LibraError::SurfaceUnavailable(err.to_string()));
                return;
            }
        };
        let (width, height) = window.inner_size().into();

        let window_clone = window.clone();
        let engine = pollster::block_on(async move {
            RenderEngine::new(window_clone, width, height, &config.canvas, &config.render).await
        });
        if let Err(err) = engine.and_then(|engine| self.visualization.start(engine)) {
            self.fail(event_loop, err);
            return;
        }

        self.window = Some(window);
        self.last_frame = Some(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.visualization.surface_mut() {
                    engine.resize(width, height);
                }
            }
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let delta_time = self
                    .last_frame
                    .replace(now)
                    .map(|last| now.duration_since(last).as_secs_f32())
                    .unwrap_or(0.0);
                if let Err(err) = self.visualization.advance(delta_time) {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            if self.visualization.is_running() {
                window.request_redraw();
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Err(err) = self.visualization.stop() {
            log::warn!("Teardown on exit reported an error: {}", err);
        }
    }
}

/// Weight selected by a digit key; `0` stands for the maximum
fn digit_weight(key_code: KeyCode) -> Option<u8> {
    let digit = match key_code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        KeyCode::Digit0 | KeyCode::Numpad0 => MAX_WEIGHT,
        _ => return None,
    };
    Some(digit)
}

fn window_title(tally: &Tally, pending_weight: u8) -> String {
    format!("Libra | {} | next weight {}", tally.summary(), pending_weight)
}
