pub mod ensemble;
pub mod frame;
pub mod particle;
pub mod physics;
pub mod scoring;
pub mod vec4;

pub use ensemble::{Ensemble, TARGET_INDEX};
pub use frame::OrientationFrame;
pub use particle::Particle;
pub use physics::{CpuPhysics, ForceLaw, PhysicsBackend, Snapshot};
pub use vec4::{geodesic_distance, Vec4};
