use crate::simulation::vec4::Vec4;

/// GPU-compatible particle living on the unit hypersphere.
///
/// Layout: 48 bytes, matching the WGSL `Particle` struct.
/// - position: vec4<f32> = 16 bytes - Point on S³
/// - velocity: vec4<f32> = 16 bytes - Tangent at `position`
/// - color: vec3<f32> = 12 bytes - Display only
/// - radius: f32 = 4 bytes - Angular radius, packed into the vec3 tail
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: Vec4,
    pub velocity: Vec4,
    pub color: [f32; 3],
    pub radius: f32,
}

impl Particle {
    /// Create a particle, normalizing the position and projecting the
    /// velocity onto its tangent plane
    pub fn new(position: Vec4, velocity: Vec4, radius: f32, color: [f32; 3]) -> Self {
        let position = position.normalized();
        Self {
            position,
            velocity: velocity.project_tangent(position),
            color,
            radius,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Byte offset of particle `index` inside a tightly packed buffer
pub fn particle_offset(index: usize) -> u64 {
    (index * std::mem::size_of::<Particle>()) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_size() {
        assert_eq!(std::mem::size_of::<Particle>(), 48);
    }

    #[test]
    fn test_new_constrains_to_sphere() {
        let p = Particle::new(
            Vec4::new(2.0, 0.0, 0.0, 0.0),
            Vec4::new(0.5, 0.3, 0.0, 0.0),
            0.05,
            [1.0, 1.0, 1.0],
        );
        assert_eq!(p.position, Vec4::X);
        assert_eq!(p.velocity, Vec4::new(0.0, 0.3, 0.0, 0.0), "Radial component should be dropped");
    }

    #[test]
    fn test_particle_offset() {
        assert_eq!(particle_offset(0), 0);
        assert_eq!(particle_offset(3), 144);
    }
}
