//! # RPG Particles
//!
//! A 2D sprite particle engine for RPG-style games.
//!
//! ## Features
//!
//! - **Keyframed particles**: color, size and rotation speed interpolated over each particle's lifetime
//! - **Emitter shapes**: point, line, circle, filled circle and filled rectangle with cone or omnidirectional launch
//! - **Physics**: constant and radial/tangential acceleration, wind, wave motion and damping
//! - **Batched rendering**: one quad batch per system through a pluggable [`render::RenderBackend`]
//! - **Configuration**: TOML/JSON config with environment overrides and `tracing` based logging
//!
//! ## Architecture Design
//!
//! - **Definition**: immutable [`render::particles::ParticleSystemDef`] shared through `Arc`
//! - **Instance**: [`render::particles::ParticleSystem`] owns a fixed particle pool and its vertex buffers
//! - **Manager**: [`render::particles::ParticleSystemManager`] updates, draws and reaps many instances
//!
//! ### Example
//!
//! ```
//! use rpg_particles::prelude::*;
//! use std::sync::Arc;
//!
//! let mut backend = NullBackend::new();
//! let mut manager = ParticleSystemManager::default();
//! let def = ParticleSystemDef::new(ParticleEmitter::point(0.0, 0.0), 16);
//! manager.add_system(Arc::new(def), &mut backend).unwrap();
//!
//! manager.update_all(0.016, &EffectParameters::new(), &mut backend);
//! manager.draw_all(&mut backend).unwrap();
//! assert_eq!(manager.total_particles(), 16);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Errors, logging and helper macros
//! - [`config`]: Runtime configuration
//! - [`render`]: Rendering backend, sprite animation and particle systems

/// Errors, logging and helper macros
pub mod core;
/// Configuration system
pub mod config;
/// Rendering backend and particle systems
pub mod render;

/// Commonly used types
pub mod prelude {
    pub use crate::config::{EngineConfig, ParticleConfig};
    pub use crate::core::error::{ParticleError, ParticleResult, RenderError, RenderResult};
    pub use crate::render::backend::{BlendMode, NullBackend, RenderBackend, StencilState};
    pub use crate::render::particles::{
        EffectParameters, EmitterMode, EmitterShape, EmitterSpin, Keyframe, ParticleEmitter,
        ParticleSystem, ParticleSystemDef, ParticleSystemManager, SystemId,
    };
}
