//! Round-based game flow.
//!
//! ```text
//! INTRO --(intro timer)--> SIMULATION --(round timer)--> PAUSED
//!                              ^                            |
//!                              +------(continue, rounds left)+
//!                                                           |
//!                                   GAME_OVER <--(continue, last round)
//! ```
//!
//! The session owns timers, scores and the staged target velocity. It never
//! touches the particle store itself: `update` reads the latest snapshot and
//! `continue_round` hands back the velocity the caller must write into the
//! target particle.

use crate::config::{GameConfig, MAX_SPEED_MULTIPLIER};
use crate::game::controls::CameraPermissions;
use crate::game::overlay::{Arrow, OverlayCommand, OverlaySnapshot, StagedVelocity};
use crate::game::tutorial::TutorialStep;
use crate::simulation::scoring::{catch_test, clustering_score, CatchOutcome};
use crate::simulation::{Particle, Vec4, TARGET_INDEX};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Intro,
    Simulation,
    Paused,
    GameOver,
}

/// Whether input drives the camera or the overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlMode {
    Camera,
    Ui,
}

/// How the player leaves the pause screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContinueChoice {
    ApplyVelocity,
    KeepVelocity,
}

/// Things that happened during a session update
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionEvent {
    RoundStarted { round: u32 },
    RoundEnded { round: u32, outcome: Option<CatchOutcome>, points: u32 },
    ScoreSampled(f32),
    TutorialAdvanced(TutorialStep),
    GameOver { final_score: f32, points: u32 },
}

/// Work the caller has to perform on the particle store
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionAction {
    /// Point update of the target particle's velocity
    WriteTargetVelocity(Vec4),
    /// Respawn and fully reload the ensemble
    Restart,
}

pub struct RoundSession {
    config: GameConfig,
    state: GameState,
    round: u32,
    intro_elapsed: f32,
    round_elapsed: f32,
    total_elapsed: f32,
    score_timer: f32,
    points: u32,
    clustering_score: f32,
    last_catch: Option<CatchOutcome>,
    final_score: Option<f32>,
    catch_radius: f32,
    staged: StagedVelocity,
    speed_multiplier: f32,
    control_mode: ControlMode,
    tutorial: Option<TutorialStep>,
}

impl RoundSession {
    pub fn new(config: GameConfig) -> Self {
        let catch_radius = config.catch_radius;
        Self {
            config,
            state: GameState::Intro,
            round: 0,
            intro_elapsed: 0.0,
            round_elapsed: 0.0,
            total_elapsed: 0.0,
            score_timer: 0.0,
            points: 0,
            clustering_score: 0.0,
            last_catch: None,
            final_score: None,
            catch_radius,
            staged: StagedVelocity::default(),
            speed_multiplier: 1.0,
            control_mode: ControlMode::Camera,
            tutorial: None,
        }
    }

    /// Advance timers by `dt` and run any transition that falls due.
    ///
    /// `particles` is the latest snapshot and `camera` the camera position;
    /// both are only read.
    pub fn update(&mut self, dt: f32, particles: &[Particle], camera: Vec4) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.total_elapsed += dt;

        match self.state {
            GameState::Intro => {
                self.intro_elapsed += dt;
                if self.intro_elapsed >= self.config.intro_duration {
                    events.push(self.start_round(1));
                }
            }
            GameState::Simulation => {
                self.round_elapsed += dt;

                self.score_timer += dt;
                if self.score_timer >= self.config.score_sample_interval {
                    self.score_timer = 0.0;
                    self.clustering_score = clustering_score(particles);
                    events.push(SessionEvent::ScoreSampled(self.clustering_score));
                }

                let step = TutorialStep::at(self.round, self.round_elapsed);
                if step != self.tutorial {
                    self.tutorial = step;
                    if let Some(step) = step {
                        log::debug!("Tutorial: {}", step.hint());
                        events.push(SessionEvent::TutorialAdvanced(step));
                    }
                }

                if self.round_elapsed >= self.config.round_duration {
                    self.end_round(particles, camera, &mut events);
                }
            }
            GameState::Paused => {}
            GameState::GameOver => {
                if self.final_score.is_none() {
                    let score = clustering_score(particles);
                    self.final_score = Some(score);
                    self.clustering_score = score;
                    log::info!(
                        "Game over: final cluster score {:.1}, {} of {} targets caught",
                        score,
                        self.points,
                        self.config.max_rounds
                    );
                    events.push(SessionEvent::GameOver {
                        final_score: score,
                        points: self.points,
                    });
                }
            }
        }

        events
    }

    fn start_round(&mut self, round: u32) -> SessionEvent {
        self.state = GameState::Simulation;
        self.round = round;
        self.round_elapsed = 0.0;
        self.score_timer = 0.0;
        self.control_mode = ControlMode::Camera;
        log::info!("Round {}/{} started", round, self.config.max_rounds);
        SessionEvent::RoundStarted { round }
    }

    fn end_round(&mut self, particles: &[Particle], camera: Vec4, events: &mut Vec<SessionEvent>) {
        let target = particles.get(TARGET_INDEX);
        let outcome = target.map(|t| catch_test(camera, t.position, self.catch_radius));

        if let Some(outcome) = outcome {
            if outcome.caught {
                self.points += 1;
            }
            log::info!(
                "Round {} over: target {} at {:.3} rad (radius {:.2})",
                self.round,
                if outcome.caught { "caught" } else { "missed" },
                outcome.distance,
                self.catch_radius
            );
        }

        self.last_catch = outcome;
        self.staged = target
            .map(|t| StagedVelocity::from_velocity(t.velocity))
            .unwrap_or_default();
        self.tutorial = None;
        self.control_mode = ControlMode::Ui;
        self.state = GameState::Paused;

        events.push(SessionEvent::RoundEnded {
            round: self.round,
            outcome,
            points: self.points,
        });
    }

    /// Leave the pause screen.
    ///
    /// Returns the velocity to write into the target when the player chose
    /// to apply the staged one and another round follows. Does nothing
    /// outside `Paused`.
    pub fn continue_round(&mut self, choice: ContinueChoice, target: Option<&Particle>) -> Option<Vec4> {
        if self.state != GameState::Paused {
            return None;
        }

        if self.round >= self.config.max_rounds {
            self.state = GameState::GameOver;
            self.control_mode = ControlMode::Ui;
            log::info!("All {} rounds played", self.config.max_rounds);
            return None;
        }

        let velocity = match choice {
            ContinueChoice::ApplyVelocity => target.map(|t| self.staged.velocity_at(t.position)),
            ContinueChoice::KeepVelocity => None,
        };

        self.start_round(self.round + 1);
        velocity
    }

    /// Return to the intro with fresh counters. Catch radius and speed are
    /// player settings and survive.
    pub fn restart(&mut self) {
        let catch_radius = self.catch_radius;
        let speed_multiplier = self.speed_multiplier;
        *self = Self::new(self.config.clone());
        self.catch_radius = catch_radius;
        self.speed_multiplier = speed_multiplier;
        log::info!("Session restarted");
    }

    pub fn handle_command(&mut self, command: OverlayCommand, target: Option<&Particle>) -> Option<SessionAction> {
        match command {
            OverlayCommand::ApplyAndContinue => self
                .continue_round(ContinueChoice::ApplyVelocity, target)
                .map(SessionAction::WriteTargetVelocity),
            OverlayCommand::KeepAndContinue => {
                self.continue_round(ContinueChoice::KeepVelocity, target);
                None
            }
            OverlayCommand::Restart => {
                self.restart();
                Some(SessionAction::Restart)
            }
            OverlayCommand::SetCatchRadius(radius) => {
                self.catch_radius = radius.clamp(0.0, std::f32::consts::PI);
                None
            }
            OverlayCommand::SetStagedComponent { axis, value } => {
                self.staged.set_component(axis, value);
                None
            }
            OverlayCommand::SetStagedMagnitude(value) => {
                self.staged.set_magnitude(value);
                None
            }
            OverlayCommand::SetSpeedMultiplier(value) => {
                self.speed_multiplier = value.clamp(0.0, MAX_SPEED_MULTIPLIER);
                None
            }
        }
    }

    pub fn toggle_control_mode(&mut self) {
        self.control_mode = match self.control_mode {
            ControlMode::Camera => ControlMode::Ui,
            ControlMode::Ui => ControlMode::Camera,
        };
    }

    /// Physics runs during the intro and while a round is live
    pub fn physics_enabled(&self) -> bool {
        matches!(self.state, GameState::Intro | GameState::Simulation)
    }

    pub fn physics_dt(&self, dt: f32) -> f32 {
        dt * self.speed_multiplier
    }

    pub fn camera_permissions(&self) -> CameraPermissions {
        let camera_mode = self.control_mode == ControlMode::Camera;
        CameraPermissions {
            movement: camera_mode && self.state == GameState::Simulation,
            look: camera_mode,
        }
    }

    /// Velocity arrow from the target while the player edits it
    pub fn arrow(&self, target: Option<&Particle>) -> Option<Arrow> {
        if self.state != GameState::Paused {
            return None;
        }
        let target = target?;
        let direction = self.staged.tangent_direction(target.position);
        if direction == Vec4::ZERO {
            return None;
        }
        Some(Arrow {
            start: target.position,
            direction,
            length: self.staged.magnitude,
        })
    }

    pub fn overlay(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            state: self.state,
            round: self.round,
            max_rounds: self.config.max_rounds,
            round_elapsed: self.round_elapsed,
            round_duration: self.config.round_duration,
            total_elapsed: self.total_elapsed,
            points: self.points,
            clustering_score: self.clustering_score,
            final_score: self.final_score,
            last_catch_distance: self.last_catch.map(|c| c.distance),
            catch_radius: self.catch_radius,
            staged: self.staged,
            speed_multiplier: self.speed_multiplier,
            tutorial: self.tutorial,
            control_mode: self.control_mode,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn clustering_score(&self) -> f32 {
        self.clustering_score
    }

    pub fn final_score(&self) -> Option<f32> {
        self.final_score
    }

    pub fn last_catch(&self) -> Option<CatchOutcome> {
        self.last_catch
    }

    pub fn catch_radius(&self) -> f32 {
        self.catch_radius
    }

    pub fn staged(&self) -> &StagedVelocity {
        &self.staged
    }

    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::controls::{apply_camera_input, ControlKeys, FrameInput};
    use crate::simulation::{CpuPhysics, Ensemble, OrientationFrame, PhysicsBackend};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle_at(position: Vec4) -> Particle {
        Particle::new(position, Vec4::Y * 0.3, 0.05, [1.0; 3])
    }

    /// Session already in round 1
    fn running_session() -> RoundSession {
        let mut session = RoundSession::new(GameConfig::default());
        session.update(3.0, &[], Vec4::W);
        assert_eq!(session.state(), GameState::Simulation);
        session
    }

    #[test]
    fn test_intro_lasts_three_seconds() {
        let mut session = RoundSession::new(GameConfig::default());
        assert_eq!(session.state(), GameState::Intro);
        assert_eq!(session.round(), 0);

        session.update(2.9, &[], Vec4::W);
        assert_eq!(session.state(), GameState::Intro);

        let events = session.update(0.1, &[], Vec4::W);
        assert_eq!(session.state(), GameState::Simulation);
        assert_eq!(session.round(), 1);
        assert!(events.contains(&SessionEvent::RoundStarted { round: 1 }));
    }

    #[test]
    fn test_round_timer_pauses_and_scores_catch() {
        let mut session = running_session();
        let target = particle_at(Vec4::X);
        let particles = [target];

        session.update(4.0, &particles, Vec4::X);
        assert_eq!(session.state(), GameState::Simulation);

        let events = session.update(1.0, &particles, Vec4::X);
        assert_eq!(session.state(), GameState::Paused);
        assert_eq!(session.points(), 1);
        assert_eq!(session.control_mode(), ControlMode::Ui, "Pause forces UI mode");
        let outcome = session.last_catch().unwrap();
        assert!(outcome.caught);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::RoundEnded { round: 1, points: 1, .. })));
        assert!((session.staged().magnitude - 0.3).abs() < 1e-5, "Staged velocity seeded from target");
    }

    #[test]
    fn test_missed_catch_gives_no_point() {
        let mut session = running_session();
        session.update(5.0, &[particle_at(Vec4::X)], Vec4::Y);
        assert_eq!(session.state(), GameState::Paused);
        assert_eq!(session.points(), 0);
        let outcome = session.last_catch().unwrap();
        assert!(!outcome.caught);
        assert!((outcome.distance - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_catch_evaluated_only_at_timer_expiry() {
        let mut session = running_session();
        let particles = [particle_at(Vec4::X)];
        // Camera sits on the target for most of the round, then leaves
        session.update(4.9, &particles, Vec4::X);
        assert!(session.last_catch().is_none());
        session.update(0.2, &particles, Vec4::Y);
        assert_eq!(session.points(), 0);
    }

    #[test]
    fn test_live_catch_radius() {
        let mut session = running_session();
        session.handle_command(OverlayCommand::SetCatchRadius(2.0), None);
        session.update(5.0, &[particle_at(Vec4::X)], Vec4::Y);
        assert_eq!(session.points(), 1, "pi/2 is inside a 2.0 radius");
    }

    #[test]
    fn test_apply_velocity_and_continue() {
        let mut session = running_session();
        let target = particle_at(Vec4::X);
        session.update(5.0, &[target], Vec4::W);

        session.handle_command(
            OverlayCommand::SetStagedComponent { axis: 2, value: 1.0 },
            Some(&target),
        );
        session.handle_command(
            OverlayCommand::SetStagedComponent { axis: 1, value: 0.0 },
            Some(&target),
        );
        session.handle_command(OverlayCommand::SetStagedMagnitude(0.5), Some(&target));
        assert!(session.arrow(Some(&target)).is_some());

        let action = session.handle_command(OverlayCommand::ApplyAndContinue, Some(&target));
        let Some(SessionAction::WriteTargetVelocity(v)) = action else {
            panic!("Expected a velocity write, got {:?}", action);
        };
        assert!((v - Vec4::Z * 0.5).length() < 1e-5);
        assert!(v.dot(target.position).abs() < 1e-6);
        assert_eq!(session.state(), GameState::Simulation);
        assert_eq!(session.round(), 2);
        assert_eq!(session.control_mode(), ControlMode::Camera);
        assert!(session.arrow(Some(&target)).is_none());

        // A second confirm while running is ignored
        assert!(session
            .handle_command(OverlayCommand::ApplyAndContinue, Some(&target))
            .is_none());
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn test_keep_velocity_and_continue() {
        let mut session = running_session();
        let target = particle_at(Vec4::X);
        session.update(5.0, &[target], Vec4::W);
        let action = session.handle_command(OverlayCommand::KeepAndContinue, Some(&target));
        assert!(action.is_none());
        assert_eq!(session.state(), GameState::Simulation);
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn test_permissions_by_state() {
        let mut session = RoundSession::new(GameConfig::default());
        assert!(session.physics_enabled());
        assert!(!session.camera_permissions().movement, "No movement during intro");
        assert!(session.camera_permissions().look);

        session.update(3.0, &[], Vec4::W);
        assert!(session.physics_enabled());
        assert!(session.camera_permissions().movement);

        session.toggle_control_mode();
        assert_eq!(
            session.camera_permissions(),
            CameraPermissions { movement: false, look: false }
        );
        session.toggle_control_mode();

        session.update(5.0, &[particle_at(Vec4::X)], Vec4::W);
        assert_eq!(session.state(), GameState::Paused);
        assert!(!session.physics_enabled());
        session.toggle_control_mode();
        assert_eq!(
            session.camera_permissions(),
            CameraPermissions { movement: false, look: true },
            "Paused permits look only"
        );
    }

    #[test]
    fn test_paused_blocks_camera_movement() {
        let mut session = running_session();
        session.update(5.0, &[particle_at(Vec4::X)], Vec4::W);
        session.toggle_control_mode();
        assert_eq!(session.state(), GameState::Paused);

        let mut camera = OrientationFrame::default();
        let input = FrameInput {
            keys: ControlKeys {
                forward: true,
                right: true,
                up: true,
                ..ControlKeys::default()
            },
            ..FrameInput::default()
        };
        for _ in 0..30 {
            apply_camera_input(&mut camera, &input, 0.016, session.camera_permissions());
        }
        assert_eq!(camera.position, OrientationFrame::default().position);
    }

    #[test]
    fn test_score_sampled_on_interval() {
        let mut session = running_session();
        let particles = [particle_at(Vec4::X), particle_at(Vec4::Y)];
        let events = session.update(0.25, &particles, Vec4::W);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::ScoreSampled(_))));
        assert_eq!(session.clustering_score(), 0.0);

        let events = session.update(0.25, &particles, Vec4::W);
        assert!(events.iter().any(|e| matches!(e, SessionEvent::ScoreSampled(_))));
        assert!((session.clustering_score() - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_tutorial_only_in_first_round() {
        let mut session = running_session();
        let target = particle_at(Vec4::X);
        let events = session.update(0.01, &[target], Vec4::W);
        assert!(events.contains(&SessionEvent::TutorialAdvanced(TutorialStep::Look)));
        session.update(1.3, &[target], Vec4::W);
        assert_eq!(session.overlay().tutorial, Some(TutorialStep::Move));

        session.update(5.0, &[target], Vec4::W);
        assert_eq!(session.overlay().tutorial, None);
        session.continue_round(ContinueChoice::KeepVelocity, Some(&target));
        let events = session.update(1.3, &[target], Vec4::W);
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::TutorialAdvanced(_))));
        assert_eq!(session.state(), GameState::Simulation, "Tutorial never blocks the round");
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut session = running_session();
        session.handle_command(OverlayCommand::SetCatchRadius(1.2), None);
        session.update(5.0, &[particle_at(Vec4::X)], Vec4::X);
        assert_eq!(session.points(), 1);

        let action = session.handle_command(OverlayCommand::Restart, None);
        assert_eq!(action, Some(SessionAction::Restart));
        assert_eq!(session.state(), GameState::Intro);
        assert_eq!(session.round(), 0);
        assert_eq!(session.points(), 0);
        assert_eq!(session.catch_radius(), 1.2);
    }

    #[test]
    fn test_speed_multiplier_clamped() {
        let mut session = RoundSession::new(GameConfig::default());
        session.handle_command(OverlayCommand::SetSpeedMultiplier(10.0), None);
        assert_eq!(session.physics_dt(1.0), MAX_SPEED_MULTIPLIER);
        session.handle_command(OverlayCommand::SetSpeedMultiplier(-1.0), None);
        assert_eq!(session.physics_dt(1.0), 0.0);
    }

    #[test]
    fn test_full_session_reaches_game_over() {
        let config = GameConfig::default();
        let mut rng = StdRng::seed_from_u64(2024);
        let ensemble = Ensemble::from_config(&mut rng, &config);
        let mut physics = CpuPhysics::new(config.physics);
        physics.load(&ensemble.particles);

        let mut session = RoundSession::new(config);
        let camera = OrientationFrame::default();
        let dt = 1.0 / 60.0;
        let mut completed_rounds = 0;
        let mut game_over_events = 0;

        for _ in 0..100_000 {
            if session.physics_enabled() {
                physics.step(session.physics_dt(dt)).unwrap();
            }
            let particles = physics.snapshot().unwrap().particles.clone();
            for event in session.update(dt, &particles, camera.position) {
                match event {
                    SessionEvent::RoundEnded { .. } => completed_rounds += 1,
                    SessionEvent::GameOver { .. } => game_over_events += 1,
                    _ => {}
                }
            }
            if session.state() == GameState::Paused {
                let velocity = session.continue_round(ContinueChoice::KeepVelocity, particles.first());
                assert!(velocity.is_none());
            }
            if session.state() == GameState::GameOver && session.final_score().is_some() {
                break;
            }
        }

        assert_eq!(session.state(), GameState::GameOver);
        assert_eq!(completed_rounds, 10);
        assert_eq!(session.round(), 10);
        assert_eq!(game_over_events, 1);
        let final_score = session.final_score().unwrap();
        assert!((0.0..=100.0).contains(&final_score));

        // Physics is stopped; even a different ensemble must not change the result
        let version = physics.snapshot().unwrap().version;
        let moved = [particle_at(Vec4::X), particle_at(Vec4::X)];
        for _ in 0..10 {
            assert!(!session.physics_enabled());
            assert!(session.update(dt, &moved, camera.position).is_empty());
        }
        assert_eq!(session.final_score(), Some(final_score));
        assert_eq!(physics.snapshot().unwrap().version, version);
    }
}
