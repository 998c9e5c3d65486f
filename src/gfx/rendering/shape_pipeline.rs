//! Instanced drawing of rectangles and circles
//!
//! Every shape in a [`Frame`] becomes one instance of a shared unit quad. The
//! instance carries the shape's transform and style; the fragment shader cuts
//! the quad down to a circle or keeps it as a rectangle and paints the outline.

use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, Rad, Vector3};
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, Buffer, Device, Queue, RenderPass, RenderPipeline, TextureFormat};

use crate::gfx::frame::{Frame, ShapeInstance, ShapeKind};
use crate::wgpu_utils::UniformBuffer;

/// Corner of the shared unit quad, in `-1.0..=1.0`
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub corner: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-instance data for one shape
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ShapeInstanceData {
    /// Maps the unit quad onto the shape, in canvas units
    pub transform: [[f32; 4]; 4],
    pub fill: [f32; 4],
    pub stroke: [f32; 4],
    /// kind (0 rect, 1 circle), line width, half width, half height
    pub params: [f32; 4],
}

impl ShapeInstanceData {
    const ATTRIBUTES: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        1 => Float32x4,
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
    ];

    pub fn from_shape(shape: &ShapeInstance) -> Self {
        let transform = Matrix4::from_translation(Vector3::new(shape.center.x, shape.center.y, 0.0))
            * Matrix4::from_angle_z(Rad(shape.angle))
            * Matrix4::from_nonuniform_scale(shape.half_extents.x, shape.half_extents.y, 1.0);
        let kind = match shape.kind {
            ShapeKind::Rect => 0.0,
            ShapeKind::Circle => 1.0,
        };
        Self {
            transform: transform.into(),
            fill: shape.style.fill.0,
            stroke: shape.style.stroke.0,
            params: [
                kind,
                shape.style.line_width,
                shape.half_extents.x,
                shape.half_extents.y,
            ],
        }
    }

    pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ShapeInstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Orthographic projection from canvas units (y down) to clip space
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    pub canvas_to_clip: [[f32; 4]; 4],
}

impl ViewportUniform {
    pub fn for_canvas(width: f32, height: f32) -> Self {
        let projection = cgmath::ortho(0.0, width.max(1.0), height.max(1.0), 0.0, -1.0, 1.0);
        Self {
            canvas_to_clip: projection.into(),
        }
    }
}

pub struct ShapePipeline {
    pipeline: RenderPipeline,
    viewport: UniformBuffer<ViewportUniform>,
    viewport_bind_group: BindGroup,
    quad_vertex_buffer: Buffer,
    quad_index_buffer: Buffer,
    instance_buffer: Buffer,
    capacity: u32,
    instance_count: u32,
}

impl ShapePipeline {
    pub fn new(
        device: &Device,
        surface_format: TextureFormat,
        canvas_size: (f32, f32),
        initial_capacity: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shape Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shapes.wgsl").into()),
        });

        let viewport = UniformBuffer::new_with_data(
            device,
            &ViewportUniform::for_canvas(canvas_size.0, canvas_size.1),
        );

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Viewport Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Viewport Bind Group"),
            layout: &viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport.binding_resource(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shape Pipeline Layout"),
            bind_group_layouts: &[&viewport_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shape Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    QuadVertex::desc(),
                    ShapeInstanceData::vertex_buffer_layout(),
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // Mirrored y in the projection flips winding
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertices = [
            QuadVertex { corner: [-1.0, -1.0] },
            QuadVertex { corner: [1.0, -1.0] },
            QuadVertex { corner: [1.0, 1.0] },
            QuadVertex { corner: [-1.0, 1.0] },
        ];
        let indices: [u16; 6] = [0, 1, 2, 2, 3, 0];

        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Quad Vertices"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shape Quad Indices"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let capacity = initial_capacity.max(1);
        let instance_buffer = Self::create_instance_buffer(device, capacity);

        Self {
            pipeline,
            viewport,
            viewport_bind_group,
            quad_vertex_buffer,
            quad_index_buffer,
            instance_buffer,
            capacity,
            instance_count: 0,
        }
    }

    fn create_instance_buffer(device: &Device, capacity: u32) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Shape Instance Buffer"),
            size: u64::from(capacity) * std::mem::size_of::<ShapeInstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Upload the frame's shapes, growing the instance buffer if needed
    pub fn prepare(&mut self, device: &Device, queue: &Queue, frame: &Frame) {
        self.viewport
            .update_content(queue, ViewportUniform::for_canvas(frame.width, frame.height));

        let instances: Vec<ShapeInstanceData> =
            frame.shapes.iter().map(ShapeInstanceData::from_shape).collect();
        let needed = instances.len() as u32;
        if needed > self.capacity {
            self.capacity = needed.next_power_of_two();
            log::debug!("Growing shape instance buffer to {}", self.capacity);
            self.instance_buffer = Self::create_instance_buffer(device, self.capacity);
        }

        self.instance_count = needed;
        if needed > 0 {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }
    }

    /// Draw every prepared shape in one call
    pub fn render(&self, render_pass: &mut RenderPass<'_>) {
        if self.instance_count == 0 {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.viewport_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        render_pass.set_index_buffer(self.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..6, 0, 0..self.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::palette::{Palette, Rgba};
    use crate::simulation::{BodyKey, RigPart};
    use cgmath::{Vector2, Vector4};

    fn apply(matrix: [[f32; 4]; 4], x: f32, y: f32) -> Vector4<f32> {
        Matrix4::from(matrix) * Vector4::new(x, y, 0.0, 1.0)
    }

    fn beam(angle: f32) -> ShapeInstance {
        ShapeInstance {
            key: BodyKey::Rig(RigPart::Beam),
            kind: ShapeKind::Rect,
            center: Vector2::new(250.0, 220.0),
            half_extents: Vector2::new(100.0, 3.0),
            angle,
            style: Palette::solid(Rgba::rgb8(0x65, 0x43, 0x21)),
        }
    }

    #[test]
    fn test_instance_layout_matches_struct_size() {
        assert_eq!(std::mem::size_of::<ShapeInstanceData>(), 7 * 16);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 64);
    }

    #[test]
    fn test_unit_quad_maps_onto_shape() {
        let data = ShapeInstanceData::from_shape(&beam(0.0));
        let corner = apply(data.transform, 1.0, 1.0);
        assert!((corner.x - 350.0).abs() < 1e-3);
        assert!((corner.y - 223.0).abs() < 1e-3);
        assert_eq!(data.params, [0.0, 0.0, 100.0, 3.0]);
    }

    #[test]
    fn test_rotation_follows_world_angle() {
        // A quarter turn points the beam's +x end down the canvas
        let data = ShapeInstanceData::from_shape(&beam(std::f32::consts::FRAC_PI_2));
        let end = apply(data.transform, 1.0, 0.0);
        assert!((end.x - 250.0).abs() < 1e-3);
        assert!((end.y - 320.0).abs() < 1e-3);
    }

    #[test]
    fn test_viewport_maps_canvas_corners_to_clip_space() {
        let viewport = ViewportUniform::for_canvas(500.0, 400.0);
        let top_left = apply(viewport.canvas_to_clip, 0.0, 0.0);
        let bottom_right = apply(viewport.canvas_to_clip, 500.0, 400.0);
        assert!((top_left.x + 1.0).abs() < 1e-5 && (top_left.y - 1.0).abs() < 1e-5);
        assert!((bottom_right.x - 1.0).abs() < 1e-5 && (bottom_right.y + 1.0).abs() < 1e-5);
    }
}
