//! # Hypersphere Catch
//!
//! Particles drift on the unit 3-sphere under mutual attraction while the
//! player flies a camera along its surface, trying to end each round within
//! reach of the red target particle.
//!
//! ## Layout
//!
//! - [`simulation`]: 4D vector algebra, the camera frame, the particle
//!   ensemble, the physics step with its CPU backend, and scoring.
//! - [`gpu`]: the wgpu context, the compute backend and the presentation pass.
//! - [`game`]: the round state machine, camera controls, overlay state and
//!   the first-round tutorial.
//! - [`config`]: tunables and [`config::GameConfig`].
//!
//! The step itself is backend-agnostic:
//!
//! ```ignore
//! use hypersphere_catch::config::PhysicsParams;
//! use hypersphere_catch::simulation::{CpuPhysics, Ensemble, PhysicsBackend};
//!
//! let ensemble = Ensemble::random(&mut rand::thread_rng(), 10, 0.3, 0.05);
//! let mut physics = CpuPhysics::new(PhysicsParams::default());
//! physics.load(&ensemble.particles);
//! physics.step(1.0 / 60.0)?;
//! let snapshot = physics.snapshot()?;
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod gpu;
pub mod simulation;
