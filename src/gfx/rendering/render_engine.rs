//! WGPU-backed drawing surface for a window
//!
//! Owns the device, the window surface and the shape pipeline. Detaching drops
//! the window surface; the device stays alive until the engine is dropped.

use super::shape_pipeline::ShapePipeline;
use crate::config::{Canvas, RenderConfig};
use crate::error::{LibraError, Result};
use crate::gfx::frame::Frame;
use crate::gfx::surface::DrawSurface;

pub struct RenderEngine {
    surface: Option<wgpu::Surface<'static>>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    shapes: ShapePipeline,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a render engine drawing into `window`
    ///
    /// Failing to get a surface, an adapter or a device is reported as
    /// [`LibraError::SurfaceUnavailable`]; there is no retry.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        canvas: &Canvas,
        render: &RenderConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| LibraError::SurfaceUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| LibraError::SurfaceUnavailable(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Libra Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| LibraError::SurfaceUnavailable(e.to_string()))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| {
                LibraError::SurfaceUnavailable("surface reports no texture formats".into())
            })?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shapes = ShapePipeline::new(
            &device,
            format,
            (canvas.width, canvas.height),
            render.initial_shape_capacity,
        );

        let [r, g, b, a] = canvas.host_background.0.map(f64::from);
        log::info!(
            "Render engine ready: {}x{} {:?} on {}",
            config.width,
            config.height,
            format,
            adapter.get_info().name
        );

        Ok(RenderEngine {
            surface: Some(surface),
            device,
            queue,
            config,
            shapes,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Resizes the window surface; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        if let Some(surface) = &self.surface {
            surface.configure(&self.device, &self.config);
        }
    }
}

impl DrawSurface for RenderEngine {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let Some(surface) = &self.surface else {
            return Err(LibraError::SurfaceDetached);
        };

        let surface_texture = match surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out waiting for a surface texture, skipping frame");
                return Ok(());
            }
            Err(err) => return Err(LibraError::Present(err.to_string())),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.shapes.prepare(&self.device, &self.queue, frame);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Balance Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Balance Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.shapes.render(&mut render_pass);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn detach(&mut self) -> Result<()> {
        if self.surface.take().is_some() {
            log::info!("Render surface detached");
        }
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.surface.is_some()
    }
}
