//! Values exchanged with the UI overlay, the presentation pass and audio.

use crate::game::session::{ControlMode, GameState};
use crate::game::tutorial::TutorialStep;
use crate::simulation::Vec4;

/// Player-edited velocity for the target particle.
///
/// Direction components live in `[-1, 1]`, magnitude in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StagedVelocity {
    pub direction: [f32; 4],
    pub magnitude: f32,
}

impl Default for StagedVelocity {
    fn default() -> Self {
        Self {
            direction: [0.0; 4],
            magnitude: 0.0,
        }
    }
}

impl StagedVelocity {
    /// Seed the sliders from an existing velocity
    pub fn from_velocity(velocity: Vec4) -> Self {
        let unit = velocity.normalized();
        Self {
            direction: unit.to_array().map(|c| c.clamp(-1.0, 1.0)),
            magnitude: velocity.length().clamp(0.0, 1.0),
        }
    }

    pub fn set_component(&mut self, axis: usize, value: f32) {
        if let Some(c) = self.direction.get_mut(axis) {
            *c = value.clamp(-1.0, 1.0);
        }
    }

    pub fn set_magnitude(&mut self, value: f32) {
        self.magnitude = value.clamp(0.0, 1.0);
    }

    /// Unit tangent direction at `position`; zero if the sliders are degenerate
    pub fn tangent_direction(&self, position: Vec4) -> Vec4 {
        Vec4::from_array(self.direction)
            .project_tangent(position)
            .normalized()
    }

    /// Velocity to write into the target particle at `position`
    pub fn velocity_at(&self, position: Vec4) -> Vec4 {
        self.tangent_direction(position) * self.magnitude
    }
}

/// Arrow drawn from the target while its velocity is being edited
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrow {
    pub start: Vec4,
    pub direction: Vec4,
    pub length: f32,
}

/// Read-only view of the session for the overlay
#[derive(Clone, Debug, PartialEq)]
pub struct OverlaySnapshot {
    pub state: GameState,
    pub round: u32,
    pub max_rounds: u32,
    pub round_elapsed: f32,
    pub round_duration: f32,
    pub total_elapsed: f32,
    pub points: u32,
    pub clustering_score: f32,
    pub final_score: Option<f32>,
    pub last_catch_distance: Option<f32>,
    pub catch_radius: f32,
    pub staged: StagedVelocity,
    pub speed_multiplier: f32,
    pub tutorial: Option<TutorialStep>,
    pub control_mode: ControlMode,
}

impl OverlaySnapshot {
    /// One-line status, used for the window title
    pub fn status_line(&self) -> String {
        let mut line = match self.state {
            GameState::Intro => "Get ready".to_string(),
            GameState::Simulation => format!(
                "Round {}/{} - {:.1}s left",
                self.round,
                self.max_rounds,
                (self.round_duration - self.round_elapsed).max(0.0)
            ),
            GameState::Paused => format!(
                "Round {}/{} over - Enter: apply velocity, Space: keep",
                self.round, self.max_rounds
            ),
            GameState::GameOver => format!(
                "Game over - final cluster {:.0}",
                self.final_score.unwrap_or(0.0)
            ),
        };
        line.push_str(&format!(
            " | points {} | cluster {:.0} | catch {:.2}",
            self.points, self.clustering_score, self.catch_radius
        ));
        if let Some(step) = self.tutorial {
            line.push_str(" | ");
            line.push_str(step.hint());
        }
        line
    }
}

/// Discrete requests from the overlay
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayCommand {
    ApplyAndContinue,
    KeepAndContinue,
    Restart,
    SetCatchRadius(f32),
    SetStagedComponent { axis: usize, value: f32 },
    SetStagedMagnitude(f32),
    SetSpeedMultiplier(f32),
}

/// Signal consumed by the audio collaborator
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSignal {
    pub enabled: bool,
    volume: u8,
}

impl Default for AudioSignal {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
        }
    }
}

impl AudioSignal {
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Set the volume percentage, clamped to 0..=100
    pub fn set_volume(&mut self, percent: i32) {
        self.volume = percent.clamp(0, 100) as u8;
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_sliders_clamp() {
        let mut staged = StagedVelocity::default();
        staged.set_component(2, 3.0);
        staged.set_component(0, -7.0);
        staged.set_component(9, 1.0);
        staged.set_magnitude(1.5);
        assert_eq!(staged.direction, [-1.0, 0.0, 1.0, 0.0]);
        assert_eq!(staged.magnitude, 1.0);
    }

    #[test]
    fn test_velocity_is_tangent() {
        let staged = StagedVelocity {
            direction: [1.0, 1.0, 0.0, 0.0],
            magnitude: 0.4,
        };
        let v = staged.velocity_at(Vec4::X);
        assert!(v.dot(Vec4::X).abs() < 1e-6);
        assert!((v.length() - 0.4).abs() < 1e-6);
        assert!((v - Vec4::Y * 0.4).length() < 1e-6);
    }

    #[test]
    fn test_radial_direction_gives_zero_velocity() {
        let staged = StagedVelocity {
            direction: [1.0, 0.0, 0.0, 0.0],
            magnitude: 1.0,
        };
        assert_eq!(staged.velocity_at(Vec4::X), Vec4::ZERO);
    }

    #[test]
    fn test_from_velocity_round_trips_speed() {
        let staged = StagedVelocity::from_velocity(Vec4::Z * 0.3);
        let direction = Vec4::from_array(staged.direction);
        assert!((direction - Vec4::Z).length() < 1e-6);
        assert!((staged.magnitude - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_audio_volume_clamps() {
        let mut audio = AudioSignal::default();
        audio.set_volume(140);
        assert_eq!(audio.volume(), 100);
        audio.set_volume(-3);
        assert_eq!(audio.volume(), 0);
        audio.toggle();
        assert!(!audio.enabled);
    }
}
