//! 渲染模块
//!
//! - `backend` - 渲染后端抽象与测试用空后端
//! - `animation` - 精灵帧动画
//! - `particles` - 2D 粒子系统

pub mod animation;
pub mod backend;
pub mod particles;

pub use animation::SpriteAnimation;
pub use backend::{
    BlendMode, NullBackend, QuadBatch, RenderBackend, StencilOp, StencilState, TextureHandle,
    TextureRegion,
};
pub use particles::{
    EffectParameters, Keyframe, ParticleEmitter, ParticleSystem, ParticleSystemDef,
    ParticleSystemManager,
};
