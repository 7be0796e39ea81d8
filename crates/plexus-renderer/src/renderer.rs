//! Point cloud and proximity line rendering

use crate::camera::{Camera, SceneUniform};
use plexus_core::{BlendMode, RenderStyle};
use std::ops::Range;

const VERTEX_SIZE: u64 = std::mem::size_of::<[f32; 3]>() as u64;

const POSITION_LAYOUT: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const COLOR_LAYOUT: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

/// Blend state for a [`BlendMode`]
pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Additive => {
            let component = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: component,
                alpha: component,
            }
        }
        BlendMode::Alpha => wgpu::BlendState::ALPHA_BLENDING,
    }
}

fn vertex_buffer(device: &wgpu::Device, label: &str, vertices: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: vertices.max(1) as u64 * VERTEX_SIZE,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

pub struct NetworkRenderer {
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    scene_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    point_buffer: wgpu::Buffer,
    edge_position_buffer: wgpu::Buffer,
    edge_color_buffer: wgpu::Buffer,
    point_capacity: usize,
    edge_vertex_capacity: usize,
    point_count: u32,
    style: RenderStyle,
}

impl NetworkRenderer {
    /// Buffers are sized once: `point_capacity` points and `edge_vertex_capacity` line
    /// vertices. Later uploads never grow them.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        style: RenderStyle,
        point_capacity: usize,
        edge_vertex_capacity: usize,
    ) -> Self {
        let scene_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Buffer"),
            size: std::mem::size_of::<SceneUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Network Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/network.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Network Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let target = [Some(wgpu::ColorTargetState {
            format,
            blend: Some(blend_state(style.blend)),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        // One instance per particle, six vertices per quad
        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_point"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: VERTEX_SIZE,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &POSITION_LAYOUT,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_point"),
                targets: &target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
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

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_line"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: VERTEX_SIZE,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &POSITION_LAYOUT,
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: VERTEX_SIZE,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &COLOR_LAYOUT,
                    },
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_line"),
                targets: &target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
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

        log::debug!(
            "Renderer buffers: {} points, {} line vertices",
            point_capacity,
            edge_vertex_capacity
        );

        Self {
            point_pipeline,
            line_pipeline,
            scene_buffer,
            bind_group,
            point_buffer: vertex_buffer(device, "Point Buffer", point_capacity),
            edge_position_buffer: vertex_buffer(
                device,
                "Edge Position Buffer",
                edge_vertex_capacity,
            ),
            edge_color_buffer: vertex_buffer(device, "Edge Color Buffer", edge_vertex_capacity),
            point_capacity,
            edge_vertex_capacity,
            point_count: 0,
            style,
        }
    }

    pub fn upload_points(&mut self, queue: &wgpu::Queue, points: &[[f32; 3]]) {
        let points = &points[..points.len().min(self.point_capacity)];
        if !points.is_empty() {
            queue.write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(points));
        }
        self.point_count = points.len() as u32;
    }

    /// Upload the valid prefix of the edge vertex arrays. Both slices hold one entry per
    /// line vertex.
    pub fn upload_edges(
        &mut self,
        queue: &wgpu::Queue,
        positions: &[[f32; 3]],
        colors: &[[f32; 3]],
    ) {
        let len = positions
            .len()
            .min(colors.len())
            .min(self.edge_vertex_capacity);
        if len == 0 {
            return;
        }

        queue.write_buffer(
            &self.edge_position_buffer,
            0,
            bytemuck::cast_slice(&positions[..len]),
        );
        queue.write_buffer(
            &self.edge_color_buffer,
            0,
            bytemuck::cast_slice(&colors[..len]),
        );
    }

    /// Draw points and the `edge_range` slice of line vertices into `view`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &Camera,
        viewport_height: u32,
        edge_range: Range<u32>,
    ) {
        queue.write_buffer(
            &self.scene_buffer,
            0,
            bytemuck::cast_slice(&[camera.to_uniform(&self.style, viewport_height)]),
        );

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        let [r, g, b] = self.style.background;
        let edge_end = edge_range.end.min(self.edge_vertex_capacity as u32);
        let edge_range = edge_range.start.min(edge_end)..edge_end;

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Network Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.bind_group, &[]);

            if !edge_range.is_empty() {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, self.edge_position_buffer.slice(..));
                render_pass.set_vertex_buffer(1, self.edge_color_buffer.slice(..));
                render_pass.draw(edge_range, 0..1);
            }

            if self.point_count > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_vertex_buffer(0, self.point_buffer.slice(..));
                render_pass.draw(0..6, 0..self.point_count);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
