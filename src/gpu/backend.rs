use std::sync::Arc;
use wgpu::{Device, Queue};
use crate::config::PhysicsParams;
use crate::error::PhysicsError;
use crate::gpu::buffers::ParticleBuffers;
use crate::gpu::compute::ComputePipeline;
use crate::simulation::{Particle, PhysicsBackend, Snapshot};

/// Physics backend running the step as a compute shader.
///
/// The storage buffers are authoritative. `snapshot` maps the staging copy
/// written at the end of the last step; submit-then-poll is the barrier.
pub struct GpuPhysics {
    device: Arc<Device>,
    queue: Arc<Queue>,
    pipeline: ComputePipeline,
    buffers: ParticleBuffers,
    params: PhysicsParams,
    host: Snapshot,
    /// Steps submitted since the last readback
    pending_steps: u64,
}

impl GpuPhysics {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>, params: PhysicsParams) -> Self {
        let pipeline = ComputePipeline::new(&device);
        let buffers = ParticleBuffers::new(&device, &queue, &[]);
        Self {
            device,
            queue,
            pipeline,
            buffers,
            params,
            host: Snapshot::default(),
            pending_steps: 0,
        }
    }
}

impl PhysicsBackend for GpuPhysics {
    fn load(&mut self, particles: &[Particle]) {
        // Fresh buffers: a full load may change the particle count
        self.buffers = ParticleBuffers::new(&self.device, &self.queue, particles);
        self.host = Snapshot {
            version: 0,
            particles: particles.to_vec(),
        };
        self.pending_steps = 0;
        log::debug!("Uploaded {} particles to the GPU", particles.len());
    }

    fn write_particle(&mut self, index: usize, particle: Particle) -> Result<(), PhysicsError> {
        // Settle the previous step so the host copy and the device agree
        self.snapshot()?;
        let len = self.host.particles.len();
        let slot = self
            .host
            .particles
            .get_mut(index)
            .ok_or(PhysicsError::IndexOutOfRange { index, len })?;
        *slot = particle;
        self.buffers.write_particle(&self.queue, index, &particle);
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        let count = self.buffers.count();
        if count == 0 {
            return Ok(());
        }

        self.buffers.update_params(&self.queue, dt, &self.params);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("physics-encoder"),
            });

        let (input_buf, output_buf) = self.buffers.get_io_buffers();
        let bind_group = self.pipeline.create_bind_group(
            &self.device,
            input_buf,
            output_buf,
            &self.buffers.params_buffer,
        );
        self.pipeline.dispatch(&mut encoder, &bind_group, count as u32);

        // Output becomes input for the next step
        self.buffers.swap();
        self.buffers.copy_to_staging(&mut encoder);

        self.queue.submit(std::iter::once(encoder.finish()));
        self.pending_steps += 1;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<&Snapshot, PhysicsError> {
        if self.pending_steps > 0 {
            self.host.particles = self.buffers.read_staging(&self.device)?;
            self.host.version += self.pending_steps;
            self.pending_steps = 0;
        }
        Ok(&self.host)
    }

    fn len(&self) -> usize {
        self.buffers.count()
    }

    fn name(&self) -> &'static str {
        "gpu"
    }
}
