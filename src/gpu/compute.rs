use wgpu::{BindGroup, BindGroupLayout, Buffer, ComputePipeline as WgpuComputePipeline, Device, ShaderStages};
use crate::config::WORKGROUP_SIZE;
use crate::gpu::layout::{bind_buffers, single_group_layout, storage_entry, uniform_entry};

/// WGSL source of the physics step
pub const PHYSICS_SHADER: &str = include_str!("../shaders/physics.wgsl");

/// Compute pipeline for the particle step.
///
/// Slot 0 holds the previous snapshot, slot 1 receives the next state and
/// slot 2 carries `SimParams`.
pub struct ComputePipeline {
    pipeline: WgpuComputePipeline,
    bind_group_layout: BindGroupLayout,
}

impl ComputePipeline {
    pub fn new(device: &Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("physics-shader"),
            source: wgpu::ShaderSource::Wgsl(PHYSICS_SHADER.into()),
        });

        let (bind_group_layout, pipeline_layout) = single_group_layout(
            device,
            "physics-layout",
            &[
                storage_entry(0, ShaderStages::COMPUTE, true),
                storage_entry(1, ShaderStages::COMPUTE, false),
                uniform_entry(2, ShaderStages::COMPUTE),
            ],
        );

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("physics-compute-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
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
        input_buffer: &Buffer,
        output_buffer: &Buffer,
        params_buffer: &Buffer,
    ) -> BindGroup {
        bind_buffers(
            device,
            "physics-bind-group",
            &self.bind_group_layout,
            &[input_buffer, output_buffer, params_buffer],
        )
    }

    /// Dispatch one invocation per particle
    pub fn dispatch(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bind_group: &BindGroup,
        particle_count: u32,
    ) {
        let workgroups = workgroup_count(particle_count);
        if workgroups == 0 {
            return;
        }

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("physics-compute-pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        pass.dispatch_workgroups(workgroups, 1, 1);
    }
}

/// Workgroups needed to cover `particle_count` invocations
pub fn workgroup_count(particle_count: u32) -> u32 {
    particle_count.div_ceil(WORKGROUP_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count() {
        assert_eq!(workgroup_count(0), 0);
        assert_eq!(workgroup_count(1), 1);
        assert_eq!(workgroup_count(64), 1);
        assert_eq!(workgroup_count(65), 2);
    }
}
