use crate::error::ConfigError;
use crate::simulation::ForceLaw;

// ============================================
// Ensemble
// ============================================

/// Number of particles spawned per session (index 0 is the target)
pub const PARTICLE_COUNT: usize = 10;

/// Speed every particle starts with, in radians per second
pub const INITIAL_SPEED: f32 = 0.3;

/// Angular radius of each particle
pub const PARTICLE_RADIUS: f32 = 0.05;

/// Display color of the target particle
pub const TARGET_COLOR: [f32; 3] = [1.0, 0.25, 0.2];

// ============================================
// Rounds
// ============================================

/// Rounds per session
pub const MAX_ROUNDS: u32 = 10;

/// Length of the intro before round 1, in seconds
pub const INTRO_DURATION: f32 = 3.0;

/// Length of one round, in seconds
pub const ROUND_DURATION: f32 = 5.0;

/// Default catch radius in radians (live-adjustable)
pub const CATCH_RADIUS: f32 = 0.7;

/// How often the clustering score is sampled, in seconds
pub const SCORE_SAMPLE_INTERVAL: f32 = 0.5;

/// Upper bound of the simulation speed multiplier
pub const MAX_SPEED_MULTIPLIER: f32 = 4.0;

// ============================================
// Physics
// ============================================

/// Compute shader workgroup size (one invocation per particle)
pub const WORKGROUP_SIZE: u32 = 64;

/// Attraction strength G
pub const FORCE_STRENGTH: f32 = 0.05;

/// Softening term added to the distance to keep close encounters finite
pub const FORCE_SOFTENING: f32 = 0.05;

/// Speed clamp after integration, in radians per second
pub const MAX_PARTICLE_SPEED: f32 = 1.5;

// ============================================
// Camera
// ============================================

/// Camera travel speed in radians per second
pub const CAMERA_SPEED: f32 = 1.0;

/// Cursor delta to look angle, multiplied by frame dt
pub const LOOK_SENSITIVITY: f32 = 0.1;

/// Movement multiplier while boost is held
pub const BOOST_FACTOR: f32 = 2.0;

/// Movement multiplier while precise is held
pub const PRECISE_FACTOR: f32 = 0.5;

/// Environment variable selecting the physics backend (`gpu` or `cpu`)
pub const BACKEND_ENV: &str = "HYPERSPHERE_BACKEND";

/// Where the physics step executes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Gpu,
    Cpu,
}

impl BackendKind {
    /// Parse a backend name, case-insensitively
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gpu" => Ok(BackendKind::Gpu),
            "cpu" => Ok(BackendKind::Cpu),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

/// Parameters of the pairwise interaction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsParams {
    pub force_law: ForceLaw,
    pub strength: f32,
    pub softening: f32,
    pub max_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            force_law: ForceLaw::InverseSquare,
            strength: FORCE_STRENGTH,
            softening: FORCE_SOFTENING,
            max_speed: MAX_PARTICLE_SPEED,
        }
    }
}

/// Session configuration, fixed once the session starts
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub particle_count: usize,
    pub max_rounds: u32,
    pub intro_duration: f32,
    pub round_duration: f32,
    pub catch_radius: f32,
    pub score_sample_interval: f32,
    pub initial_speed: f32,
    pub particle_radius: f32,
    pub physics: PhysicsParams,
    pub backend: BackendKind,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            max_rounds: MAX_ROUNDS,
            intro_duration: INTRO_DURATION,
            round_duration: ROUND_DURATION,
            catch_radius: CATCH_RADIUS,
            score_sample_interval: SCORE_SAMPLE_INTERVAL,
            initial_speed: INITIAL_SPEED,
            particle_radius: PARTICLE_RADIUS,
            physics: PhysicsParams::default(),
            backend: BackendKind::Gpu,
        }
    }
}

impl GameConfig {
    /// Defaults, with the backend taken from `HYPERSPHERE_BACKEND` when set
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Ok(name) = std::env::var(BACKEND_ENV) {
            config.backend = BackendKind::parse(&name)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::NoParticles);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        let durations = [
            ("intro_duration", self.intro_duration),
            ("round_duration", self.round_duration),
            ("score_sample_interval", self.score_sample_interval),
            ("particle_radius", self.particle_radius),
        ];
        for (name, value) in durations {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if !(0.0..=std::f32::consts::PI).contains(&self.catch_radius) {
            return Err(ConfigError::CatchRadius(self.catch_radius));
        }
        if self.initial_speed < 0.0 || self.physics.max_speed < 0.0 {
            return Err(ConfigError::NegativeSpeed);
        }
        Ok(())
    }
}
