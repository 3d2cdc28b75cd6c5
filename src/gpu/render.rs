use wgpu::{
    BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline as WgpuRenderPipeline,
    ShaderStages, TextureFormat, TextureView,
};
use crate::game::Arrow;
use crate::gpu::layout::{bind_buffers, single_group_layout, storage_entry, uniform_entry};
use crate::simulation::{OrientationFrame, Particle};

/// WGSL source of the presentation pass
pub const RENDER_SHADER: &str = include_str!("../shaders/render.wgsl");

/// Everything the presentation pass consumes for one frame
pub struct PresentationFrame<'a> {
    pub camera: &'a OrientationFrame,
    pub viewport: (u32, u32),
    pub particles: &'a [Particle],
    pub arrow: Option<Arrow>,
}

/// Fullscreen pass that traces great circles from the camera.
/// Buffers live in `SceneBuffers`.
pub struct RenderPipeline {
    pipeline: WgpuRenderPipeline,
    bind_group_layout: BindGroupLayout,
}

impl RenderPipeline {
    pub fn new(device: &Device, format: TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("render-shader"),
            source: wgpu::ShaderSource::Wgsl(RENDER_SHADER.into()),
        });

        // Particle snapshot, then camera basis and annotation
        let (bind_group_layout, pipeline_layout) = single_group_layout(
            device,
            "render-layout",
            &[
                storage_entry(0, ShaderStages::FRAGMENT, true),
                uniform_entry(1, ShaderStages::FRAGMENT),
            ],
        );

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("render-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
        }
    }

    pub fn create_bind_group(
        &self,
        device: &Device,
        particle_buffer: &Buffer,
        view_params_buffer: &Buffer,
    ) -> BindGroup {
        bind_buffers(
            device,
            "render-bind-group",
            &self.bind_group_layout,
            &[particle_buffer, view_params_buffer],
        )
    }

    /// Clear to black and draw the hypersphere view into `view`
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &TextureView,
        bind_group: &BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("render-pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.draw(0..3, 0..1); // fullscreen triangle
    }
}
