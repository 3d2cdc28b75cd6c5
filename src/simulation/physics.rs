//! Pairwise attraction on the hypersphere.
//!
//! Each particle is pulled along the great circle toward every other
//! particle. The net acceleration is projected onto the tangent plane at
//! the particle, integrated with explicit Euler, and the new position is
//! pushed back onto the sphere. Every update reads only the previous
//! snapshot, so the step is an embarrassingly parallel map: one shader
//! invocation per particle on the GPU, one rayon task per particle on the
//! CPU. The WGSL in `shaders/physics.wgsl` mirrors `integrate_particle`.

use rayon::prelude::*;
use crate::config::PhysicsParams;
use crate::error::PhysicsError;
use crate::simulation::particle::Particle;
use crate::simulation::vec4::{geodesic_distance, Vec4};

/// Magnitude of the attraction as a function of geodesic distance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceLaw {
    /// G / (d² + ε)
    InverseSquare,
    /// G / (d + ε)
    InverseLinear,
    /// G · d
    Spring,
}

impl ForceLaw {
    /// Discriminant passed to the compute shader
    pub fn shader_code(self) -> u32 {
        match self {
            ForceLaw::InverseSquare => 0,
            ForceLaw::InverseLinear => 1,
            ForceLaw::Spring => 2,
        }
    }

    pub fn magnitude(self, distance: f32, strength: f32, softening: f32) -> f32 {
        match self {
            ForceLaw::InverseSquare => strength / (distance * distance + softening),
            ForceLaw::InverseLinear => strength / (distance + softening),
            ForceLaw::Spring => strength * distance,
        }
    }
}

/// Compute the next state of `particles[index]` from the previous snapshot
pub fn integrate_particle(
    particles: &[Particle],
    index: usize,
    dt: f32,
    params: &PhysicsParams,
) -> Particle {
    let me = particles[index];
    let p = me.position;

    let mut accel = Vec4::ZERO;
    for (j, other) in particles.iter().enumerate() {
        if j == index {
            continue;
        }
        // Unit tangent pointing along the great circle toward `other`;
        // coincident or antipodal partners give a zero direction
        let toward = other.position.project_tangent(p).normalized();
        let distance = geodesic_distance(p, other.position);
        accel += toward * params.force_law.magnitude(distance, params.strength, params.softening);
    }
    let accel = accel.project_tangent(p);

    let velocity = (me.velocity + accel * dt).project_tangent(p);
    let position = (p + velocity * dt).normalized();

    // Carry the velocity into the new tangent plane, keeping its speed
    let speed = velocity.length().min(params.max_speed);
    let velocity = velocity.project_tangent(position).normalized() * speed;

    Particle {
        position,
        velocity,
        ..me
    }
}

/// Host copy of the ensemble, read after the step barrier.
///
/// `version` counts completed steps since the last full load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub version: u64,
    pub particles: Vec<Particle>,
}

/// Owner of the device-resident ensemble.
///
/// The host only writes between steps (`load`, `write_particle`); `step`
/// owns the data until its barrier; `snapshot` returns the host-visible
/// copy of the last completed step.
pub trait PhysicsBackend {
    /// Replace the whole ensemble
    fn load(&mut self, particles: &[Particle]);

    /// Overwrite a single particle; visible to the next step
    fn write_particle(&mut self, index: usize, particle: Particle) -> Result<(), PhysicsError>;

    /// Advance every particle by `dt`
    fn step(&mut self, dt: f32) -> Result<(), PhysicsError>;

    /// Host copy of the ensemble after the most recent step
    fn snapshot(&mut self) -> Result<&Snapshot, PhysicsError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn name(&self) -> &'static str;
}

/// Ping-pong CPU implementation using rayon
pub struct CpuPhysics {
    params: PhysicsParams,
    current: Snapshot,
    next: Vec<Particle>,
}

impl CpuPhysics {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            params,
            current: Snapshot::default(),
            next: Vec::new(),
        }
    }
}

impl PhysicsBackend for CpuPhysics {
    fn load(&mut self, particles: &[Particle]) {
        self.current = Snapshot {
            version: 0,
            particles: particles.to_vec(),
        };
        self.next = particles.to_vec();
    }

    fn write_particle(&mut self, index: usize, particle: Particle) -> Result<(), PhysicsError> {
        let len = self.current.particles.len();
        let slot = self
            .current
            .particles
            .get_mut(index)
            .ok_or(PhysicsError::IndexOutOfRange { index, len })?;
        *slot = particle;
        Ok(())
    }

    fn step(&mut self, dt: f32) -> Result<(), PhysicsError> {
        if self.current.particles.is_empty() {
            return Ok(());
        }

        let input = &self.current.particles;
        let params = &self.params;
        self.next
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, out)| *out = integrate_particle(input, i, dt, params));

        // for_each returning is the barrier; swap the finished output in
        std::mem::swap(&mut self.current.particles, &mut self.next);
        self.current.version += 1;
        Ok(())
    }

    fn snapshot(&mut self) -> Result<&Snapshot, PhysicsError> {
        Ok(&self.current)
    }

    fn len(&self) -> usize {
        self.current.particles.len()
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}
