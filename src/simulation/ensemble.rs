use rand::Rng;
use crate::config::{GameConfig, TARGET_COLOR};
use crate::simulation::particle::Particle;
use crate::simulation::vec4::Vec4;

/// Index of the player-controlled target particle
pub const TARGET_INDEX: usize = 0;

/// Particle batch for session initialization
pub struct Ensemble {
    pub particles: Vec<Particle>,
}

impl Ensemble {
    /// Spawn `count` particles with random positions and velocities
    pub fn random<R: Rng>(
        rng: &mut R,
        count: usize,
        speed: f32,
        radius: f32,
    ) -> Self {
        let mut particles = Vec::with_capacity(count);

        for i in 0..count {
            // Component-wise uniform then normalized, so biased toward the
            // cube diagonals
            let position = random_unit(rng);

            let velocity = random_unit(rng)
                .project_tangent(position)
                .normalized()
                * speed;

            let color = if i == TARGET_INDEX {
                TARGET_COLOR
            } else {
                [
                    rng.gen_range(0.3..1.0),
                    rng.gen_range(0.3..1.0),
                    rng.gen_range(0.3..1.0),
                ]
            };

            particles.push(Particle::new(position, velocity, radius, color));
        }

        Self { particles }
    }

    /// Spawn an ensemble sized from the session config
    pub fn from_config<R: Rng>(rng: &mut R, config: &GameConfig) -> Self {
        Self::random(
            rng,
            config.particle_count,
            config.initial_speed,
            config.particle_radius,
        )
    }

    pub fn target(&self) -> Option<&Particle> {
        self.particles.get(TARGET_INDEX)
    }
}

fn random_unit<R: Rng>(rng: &mut R) -> Vec4 {
    loop {
        let v = Vec4::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        // An exact zero draw would fail the unit-length invariant
        if v.length_squared() > 0.0 {
            return v.normalized();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ensemble_creation() {
        let mut rng = StdRng::seed_from_u64(7);
        let ensemble = Ensemble::random(&mut rng, 10, 0.3, 0.05);
        assert_eq!(ensemble.particles.len(), 10);
    }

    #[test]
    fn test_positions_on_sphere_velocities_tangent() {
        let mut rng = StdRng::seed_from_u64(11);
        let ensemble = Ensemble::random(&mut rng, 64, 0.3, 0.05);
        for p in &ensemble.particles {
            assert!((p.position.length() - 1.0).abs() < 1e-5, "Position should be unit length");
            assert!(p.velocity.dot(p.position).abs() < 1e-5, "Velocity should be tangent");
            assert!((p.speed() - 0.3).abs() < 1e-5, "Speed should equal the initial speed, got {}", p.speed());
        }
    }

    #[test]
    fn test_target_is_colored() {
        let mut rng = StdRng::seed_from_u64(3);
        let ensemble = Ensemble::from_config(&mut rng, &GameConfig::default());
        assert_eq!(ensemble.target().map(|p| p.color), Some(TARGET_COLOR));
    }

    #[test]
    fn test_empty_ensemble() {
        let mut rng = StdRng::seed_from_u64(0);
        let ensemble = Ensemble::random(&mut rng, 0, 0.3, 0.05);
        assert!(ensemble.particles.is_empty());
        assert!(ensemble.target().is_none());
    }
}
