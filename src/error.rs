//! Error types for startup, GPU work and the physics backends.

use thiserror::Error;

/// Errors raised while bringing up or talking to the GPU
#[derive(Error, Debug)]
pub enum GpuError {
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found")]
    NoAdapter,

    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),

    #[error("surface not supported by adapter")]
    UnsupportedSurface,

    #[error("failed to map GPU buffer: {0}")]
    BufferMapping(String),
}

/// Errors raised by a physics backend
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("particle index {index} out of range for ensemble of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Gpu(#[from] GpuError),
}

/// Invalid session configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("particle count must be at least 1")]
    NoParticles,

    #[error("round count must be at least 1")]
    NoRounds,

    #[error("{name} must be positive and finite, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("catch radius must lie in [0, pi], got {0}")]
    CatchRadius(f32),

    #[error("speeds must not be negative")]
    NegativeSpeed,

    #[error("unknown physics backend '{0}', expected 'gpu' or 'cpu'")]
    UnknownBackend(String),
}

/// Fatal application errors surfaced from `main`
#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("physics error: {0}")]
    Physics(#[from] PhysicsError),
}
