//! 2D 精灵粒子系统
//!
//! CPU 端模拟，每帧把所有存活粒子展开为带纹理的四边形，一次提交给渲染后端。
//!
//! ## 架构设计
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  ParticleSystemDef (Arc 共享，只读)                      │
//! │     - 发射器、关键帧、物理参数、动画帧                   │
//! ├─────────────────────────────────────────────────────────┤
//! │  ParticleSystem (每个特效实例)                           │
//! │  1. Update                                               │
//! │     - 关键帧插值（颜色、大小、旋转速度）                 │
//! │     - 物理积分（加速度、风、波动、径向/切向、阻尼）      │
//! │     - 过期粒子就地重生或交换删除                         │
//! │     - 按发射模式补充新粒子                               │
//! │  2. Draw                                                 │
//! │     - 生成顶点位置/颜色/纹理坐标                         │
//! │     - 单批次提交，平滑动画时额外一层淡入                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```
//! use rpg_particles::render::backend::NullBackend;
//! use rpg_particles::render::particles::{
//!     EffectParameters, EmitterMode, ParticleEmitter, ParticleSystem, ParticleSystemDef,
//! };
//! use std::sync::Arc;
//!
//! let emitter = ParticleEmitter::filled_circle(0.0, 0.0, 8.0).with_mode(EmitterMode::Burst);
//! let def = Arc::new(ParticleSystemDef::new(emitter, 32).with_lifetime(0.5, 0.1));
//!
//! let mut backend = NullBackend::new();
//! let mut system = ParticleSystem::create(def, &mut backend, Some(1)).unwrap();
//! system.update(0.016, &EffectParameters::new());
//! system.draw(&mut backend).unwrap();
//! assert_eq!(system.num_particles(), 32);
//! system.destroy(&mut backend);
//! ```

pub mod definition;
pub mod emitter;
pub mod geometry;
pub mod keyframe;
pub mod manager;
pub mod particle;
pub mod system;

pub use definition::{AnimationDef, ParticleSystemDef, SpeedScale, WaveMotion};
pub use emitter::{EmitterMode, EmitterShape, EmitterSpin, ParticleEmitter};
pub use geometry::{OrientationMode, QuadBuffers};
pub use keyframe::{Keyframe, Variation};
pub use manager::{ParticleSystemManager, SystemId};
pub use particle::{respawn_particle, Particle};
pub use system::{EffectParameters, ParticleSystem, ParticleSystemStats};
