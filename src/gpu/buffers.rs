use wgpu::{Buffer, BufferUsages, Device, Queue};
use crate::config::PhysicsParams;
use crate::error::GpuError;
use crate::gpu::render::PresentationFrame;
use crate::simulation::particle::particle_offset;
use crate::simulation::Particle;

const PARTICLE_SIZE: u64 = std::mem::size_of::<Particle>() as u64;

/// Manages ping-pong storage buffers for the particle ensemble
pub struct ParticleBuffers {
    /// Buffer A - ping
    pub buffer_a: Buffer,
    /// Buffer B - pong
    pub buffer_b: Buffer,
    /// Host-mappable copy of the latest output
    pub staging_buffer: Buffer,
    /// Uniform buffer for simulation parameters
    pub params_buffer: Buffer,
    /// Which buffer is current input (true = A is input, false = B is input)
    read_from_a: bool,
    /// Particles currently stored
    count: usize,
}

/// Simulation parameters passed to the compute shader (32 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SimParams {
    pub dt: f32,
    pub particle_count: u32,
    pub force_law: u32,
    pub strength: f32,

    pub softening: f32,
    pub max_speed: f32,
    pub _padding: [f32; 2],
}

impl SimParams {
    pub fn new(dt: f32, particle_count: usize, params: &PhysicsParams) -> Self {
        Self {
            dt,
            particle_count: particle_count as u32,
            force_law: params.force_law.shader_code(),
            strength: params.strength,
            softening: params.softening,
            max_speed: params.max_speed,
            _padding: [0.0, 0.0],
        }
    }
}

impl ParticleBuffers {
    /// Create buffers sized for `initial_data` and upload it
    pub fn new(device: &Device, queue: &Queue, initial_data: &[Particle]) -> Self {
        // Zero-sized bindings are invalid; keep room for one particle
        let buffer_size = PARTICLE_SIZE * initial_data.len().max(1) as u64;

        let buffer_a = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle-buffer-a"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let buffer_b = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle-buffer-b"),
            size: buffer_size,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particle-staging-buffer"),
            size: buffer_size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let params_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("sim-params-buffer"),
            size: std::mem::size_of::<SimParams>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Upload initial data to buffer A
        if !initial_data.is_empty() {
            queue.write_buffer(&buffer_a, 0, bytemuck::cast_slice(initial_data));
        }

        Self {
            buffer_a,
            buffer_b,
            staging_buffer,
            params_buffer,
            read_from_a: true,
            count: initial_data.len(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Get (input_buffer, output_buffer) for current frame
    pub fn get_io_buffers(&self) -> (&Buffer, &Buffer) {
        if self.read_from_a {
            (&self.buffer_a, &self.buffer_b)
        } else {
            (&self.buffer_b, &self.buffer_a)
        }
    }

    /// Buffer holding the latest state (the next step's input)
    pub fn current_buffer(&self) -> &Buffer {
        self.get_io_buffers().0
    }

    /// Swap buffers after compute pass
    pub fn swap(&mut self) {
        self.read_from_a = !self.read_from_a;
    }

    /// Update simulation parameters
    pub fn update_params(&self, queue: &Queue, dt: f32, params: &PhysicsParams) {
        let sim = SimParams::new(dt, self.count, params);
        queue.write_buffer(&self.params_buffer, 0, bytemuck::bytes_of(&sim));
    }

    /// Point update of one particle in the current buffer
    pub fn write_particle(&self, queue: &Queue, index: usize, particle: &Particle) {
        queue.write_buffer(
            self.current_buffer(),
            particle_offset(index),
            bytemuck::bytes_of(particle),
        );
    }

    /// Record a copy of the current buffer into the staging buffer
    pub fn copy_to_staging(&self, encoder: &mut wgpu::CommandEncoder) {
        if self.count == 0 {
            return;
        }
        encoder.copy_buffer_to_buffer(
            self.current_buffer(),
            0,
            &self.staging_buffer,
            0,
            PARTICLE_SIZE * self.count as u64,
        );
    }

    /// Map the staging buffer and read it back (call after submit)
    pub fn read_staging(&self, device: &Device) -> Result<Vec<Particle>, GpuError> {
        if self.count == 0 {
            return Ok(Vec::new());
        }

        let buffer_slice = self.staging_buffer.slice(..PARTICLE_SIZE * self.count as u64);
        let (sender, receiver) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        device.poll(wgpu::Maintain::Wait);

        receiver
            .recv()
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?
            .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

        let particles = {
            let data = buffer_slice.get_mapped_range();
            bytemuck::cast_slice::<u8, Particle>(&data).to_vec()
        };

        self.staging_buffer.unmap();
        Ok(particles)
    }
}

/// Camera and annotation parameters for the render shader (128 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ViewParams {
    // Camera basis (64 bytes)
    pub position: [f32; 4],
    pub forward: [f32; 4],
    pub right: [f32; 4],
    pub up: [f32; 4],

    // Viewport and counts (16 bytes)
    pub resolution: [f32; 2],
    pub particle_count: u32,
    pub arrow_enabled: u32,

    // Velocity arrow (48 bytes)
    pub arrow_start: [f32; 4],
    pub arrow_direction: [f32; 4],
    pub arrow_length: f32,
    pub _padding: [f32; 3],
}

impl ViewParams {
    pub fn from_frame(frame: &PresentationFrame<'_>) -> Self {
        let camera = frame.camera;
        let (arrow_enabled, arrow_start, arrow_direction, arrow_length) = match frame.arrow {
            Some(arrow) => (1, arrow.start.to_array(), arrow.direction.to_array(), arrow.length),
            None => (0, [0.0; 4], [0.0; 4], 0.0),
        };
        Self {
            position: camera.position.to_array(),
            forward: camera.forward.to_array(),
            right: camera.right.to_array(),
            up: camera.up.to_array(),
            resolution: [frame.viewport.0 as f32, frame.viewport.1 as f32],
            particle_count: frame.particles.len() as u32,
            arrow_enabled,
            arrow_start,
            arrow_direction,
            arrow_length,
            _padding: [0.0; 3],
        }
    }
}

/// Buffers read by the presentation pass
pub struct SceneBuffers {
    pub particle_buffer: Buffer,
    pub view_params_buffer: Buffer,
    capacity: usize,
}

impl SceneBuffers {
    pub fn new(device: &Device, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            particle_buffer: Self::create_particle_buffer(device, capacity),
            view_params_buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("view-params-buffer"),
                size: std::mem::size_of::<ViewParams>() as u64,
                usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            capacity,
        }
    }

    fn create_particle_buffer(device: &Device, capacity: usize) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scene-particle-buffer"),
            size: PARTICLE_SIZE * capacity as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Upload this frame's snapshot, growing the particle buffer if needed
    pub fn upload(&mut self, device: &Device, queue: &Queue, frame: &PresentationFrame<'_>) {
        if frame.particles.len() > self.capacity {
            self.capacity = frame.particles.len();
            self.particle_buffer = Self::create_particle_buffer(device, self.capacity);
            log::debug!("Scene particle buffer grown to {}", self.capacity);
        }
        if !frame.particles.is_empty() {
            queue.write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(frame.particles));
        }
        let params = ViewParams::from_frame(frame);
        queue.write_buffer(&self.view_params_buffer, 0, bytemuck::bytes_of(&params));
    }
}
