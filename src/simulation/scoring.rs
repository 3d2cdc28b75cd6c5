use std::f32::consts::PI;
use crate::simulation::particle::Particle;
use crate::simulation::vec4::{geodesic_distance, Vec4};

/// Mean geodesic distance over all unordered pairs, `None` below two particles
pub fn average_pairwise_distance(particles: &[Particle]) -> Option<f32> {
    let n = particles.len();
    if n < 2 {
        return None;
    }

    let mut total = 0.0f64;
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            total += geodesic_distance(a.position, b.position) as f64;
        }
    }
    let pairs = (n * (n - 1) / 2) as f64;
    Some((total / pairs) as f32)
}

/// Map an average pairwise distance onto 0-100; 100 means all coincide
pub fn score_from_average(average: f32) -> f32 {
    (100.0 * (1.0 - average / PI)).max(0.0)
}

/// How tightly the ensemble is clustered, 0-100. Zero below two particles.
pub fn clustering_score(particles: &[Particle]) -> f32 {
    average_pairwise_distance(particles)
        .map(score_from_average)
        .unwrap_or(0.0)
}

/// Result of comparing the camera against the target at round end
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatchOutcome {
    pub distance: f32,
    pub caught: bool,
}

/// Caught when the camera is within `catch_radius` of the target
pub fn catch_test(camera: Vec4, target: Vec4, catch_radius: f32) -> CatchOutcome {
    let distance = geodesic_distance(camera, target);
    CatchOutcome {
        distance,
        caught: distance <= catch_radius,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn at(position: Vec4) -> Particle {
        Particle::new(position, Vec4::ZERO, 0.05, [1.0; 3])
    }

    #[test]
    fn test_fewer_than_two_scores_zero() {
        assert_eq!(clustering_score(&[]), 0.0);
        assert_eq!(clustering_score(&[at(Vec4::X)]), 0.0);
        assert_eq!(average_pairwise_distance(&[at(Vec4::X)]), None);
    }

    #[test]
    fn test_coincident_scores_hundred() {
        let particles = vec![at(Vec4::Y); 6];
        assert!((clustering_score(&particles) - 100.0).abs() < 1e-3);

        let off_axis = Vec4::new(0.31, -0.62, 0.45, 0.57);
        let particles = vec![at(off_axis); 6];
        assert_eq!(clustering_score(&particles), 100.0);
    }

    #[test]
    fn test_antipodal_pair_scores_zero() {
        let particles = [at(Vec4::Z), at(-Vec4::Z)];
        assert!(clustering_score(&particles).abs() < 1e-3);
    }

    #[test]
    fn test_orthogonal_pairs_score_fifty() {
        let particles = [at(Vec4::X), at(Vec4::Y), at(Vec4::Z), at(Vec4::W)];
        let average = average_pairwise_distance(&particles).unwrap();
        assert!((average - FRAC_PI_2).abs() < 1e-5);
        assert!((clustering_score(&particles) - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_score_non_increasing_in_distance() {
        let mut last = f32::INFINITY;
        for i in 0..=100 {
            let average = PI * i as f32 / 100.0;
            let score = score_from_average(average);
            assert!(score <= last, "Score rose from {} to {} at average {}", last, score, average);
            assert!(score >= 0.0);
            last = score;
        }
        assert_eq!(score_from_average(0.0), 100.0);
        assert!(score_from_average(PI).abs() < 1e-4);
    }

    #[test]
    fn test_catch_miss_at_quarter_turn() {
        let outcome = catch_test(Vec4::Y, Vec4::X, 0.7);
        assert!((outcome.distance - FRAC_PI_2).abs() < 1e-5);
        assert!(!outcome.caught, "pi/2 is outside a 0.7 catch radius");
    }

    #[test]
    fn test_catch_hit_when_coincident() {
        for radius in [1e-3, 0.7, 3.0] {
            let outcome = catch_test(Vec4::X, Vec4::X, radius);
            assert!(outcome.caught);
            assert_eq!(outcome.distance, 0.0);
        }
    }

    #[test]
    fn test_catch_hit_at_shared_off_axis_position() {
        let positions = [
            Vec4::new(0.31, -0.62, 0.45, 0.57),
            Vec4::new(-0.9, 0.1, 0.2, -0.37),
            Vec4::new(0.5, 0.5, 0.5, -0.5),
        ];
        for position in positions {
            let p = position.normalized();
            let outcome = catch_test(p, p, 1e-6);
            assert_eq!(outcome.distance, 0.0, "Shared position {:?} not at distance 0", p);
            assert!(outcome.caught, "Shared position {:?} missed at a tiny radius", p);
        }
    }
}
