//! 粒子系统定义
//!
//! 一种粒子特效的不可变描述。所有运行中的实例通过 `Arc` 共享同一份定义，
//! 更新和绘制都不会修改它。

use super::emitter::{EmitterShape, ParticleEmitter};
use super::keyframe::Keyframe;
use crate::core::error::{ParticleError, ParticleResult};
use crate::render::backend::{BlendMode, StencilState};
use glam::Vec2;

/// 波动参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveMotion {
    /// 波长（沿粒子寿命时间轴，秒）
    pub length: f32,
    pub length_variation: f32,
    /// 振幅（完整峰峰值）
    pub amplitude: f32,
    pub amplitude_variation: f32,
}

/// 按速度拉伸
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedScale {
    pub scale: f32,
    pub min: f32,
    pub max: f32,
}

impl SpeedScale {
    /// 速度对应的拉伸系数
    pub fn factor(&self, speed: f32) -> f32 {
        (speed * self.scale).clamp(self.min, self.max.max(self.min))
    }
}

/// 动画帧描述
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationDef {
    /// 帧图像名称
    pub frames: Vec<String>,
    /// 每帧持续时间（秒）
    pub frame_times: Vec<f32>,
}

impl AnimationDef {
    /// 单帧静态图像
    pub fn single(frame: impl Into<String>) -> Self {
        Self {
            frames: vec![frame.into()],
            frame_times: Vec::new(),
        }
    }
}

/// 粒子系统定义
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystemDef {
    /// 关闭后实例不再更新和绘制，但保持当前状态
    pub enabled: bool,
    pub emitter: ParticleEmitter,
    /// 按时间递增排列，至少一个，第一个时间为 0
    pub keyframes: Vec<Keyframe>,
    pub max_particles: usize,
    pub particle_lifetime: f32,
    pub particle_lifetime_variation: f32,
    /// 系统寿命（仅 OneShot 模式）
    pub system_lifetime: f32,
    /// 每秒速度保留比例，速度乘以 damping^dt
    pub damping: f32,
    pub damping_variation: f32,
    pub acceleration: Vec2,
    pub acceleration_variation: Vec2,
    pub wind_velocity: Vec2,
    pub wind_velocity_variation: Vec2,
    pub wave_motion: Option<WaveMotion>,
    pub tangential_acceleration: f32,
    pub tangential_acceleration_variation: f32,
    /// 正值把粒子拉向吸引点
    pub radial_acceleration: f32,
    pub radial_acceleration_variation: f32,
    /// 使用调用方提供的吸引点，否则使用发射器中心
    pub user_defined_attractor: bool,
    pub attractor_falloff: f32,
    /// 使用关键帧旋转
    pub rotation_used: bool,
    /// 朝向速度方向（优先于关键帧旋转）
    pub rotate_to_velocity: bool,
    pub speed_scale: Option<SpeedScale>,
    /// 相邻动画帧之间交叉淡化
    pub smooth_animation: bool,
    pub blend_mode: BlendMode,
    pub stencil: StencilState,
    /// 场景光照权重 [0, 1]
    pub scene_lighting: f32,
    pub random_initial_angle: bool,
    pub animation: AnimationDef,
}

impl Default for ParticleSystemDef {
    fn default() -> Self {
        Self {
            enabled: true,
            emitter: ParticleEmitter::default(),
            keyframes: vec![Keyframe::default()],
            max_particles: 100,
            particle_lifetime: 1.0,
            particle_lifetime_variation: 0.0,
            system_lifetime: 1.0,
            damping: 1.0,
            damping_variation: 0.0,
            acceleration: Vec2::ZERO,
            acceleration_variation: Vec2::ZERO,
            wind_velocity: Vec2::ZERO,
            wind_velocity_variation: Vec2::ZERO,
            wave_motion: None,
            tangential_acceleration: 0.0,
            tangential_acceleration_variation: 0.0,
            radial_acceleration: 0.0,
            radial_acceleration_variation: 0.0,
            user_defined_attractor: false,
            attractor_falloff: 0.0,
            rotation_used: false,
            rotate_to_velocity: false,
            speed_scale: None,
            smooth_animation: false,
            blend_mode: BlendMode::Alpha,
            stencil: StencilState::Disabled,
            scene_lighting: 0.0,
            random_initial_angle: false,
            animation: AnimationDef::single("particle.png"),
        }
    }
}

impl ParticleSystemDef {
    pub fn new(emitter: ParticleEmitter, max_particles: usize) -> Self {
        Self {
            emitter,
            max_particles,
            ..Default::default()
        }
    }

    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn with_lifetime(mut self, lifetime: f32, variation: f32) -> Self {
        self.particle_lifetime = lifetime;
        self.particle_lifetime_variation = variation;
        self
    }

    pub fn with_system_lifetime(mut self, lifetime: f32) -> Self {
        self.system_lifetime = lifetime;
        self
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    pub fn with_wind(mut self, wind: Vec2) -> Self {
        self.wind_velocity = wind;
        self
    }

    pub fn with_wave_motion(mut self, length: f32, amplitude: f32) -> Self {
        self.wave_motion = Some(WaveMotion {
            length,
            length_variation: 0.0,
            amplitude,
            amplitude_variation: 0.0,
        });
        self
    }

    pub fn with_radial_acceleration(mut self, radial: f32, tangential: f32) -> Self {
        self.radial_acceleration = radial;
        self.tangential_acceleration = tangential;
        self
    }

    pub fn with_animation(mut self, animation: AnimationDef) -> Self {
        self.animation = animation;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 结构检查：创建实例时必须满足，否则粒子池无法安全工作
    pub(crate) fn check_structure(&self) -> ParticleResult<()> {
        if self.keyframes.is_empty() {
            return Err(ParticleError::InvalidDefinition(
                "at least one keyframe is required".to_string(),
            ));
        }
        if self.max_particles == 0 {
            return Err(ParticleError::InvalidDefinition(
                "max_particles must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// 完整验证
    ///
    /// 创建实例只做结构检查；需要提前发现编辑错误的调用方（例如管理器）使用此方法。
    pub fn validate(&self) -> ParticleResult<()> {
        self.check_structure()?;

        if self.keyframes[0].time != 0.0 {
            return Err(ParticleError::InvalidDefinition(
                "first keyframe must start at time 0".to_string(),
            ));
        }
        for pair in self.keyframes.windows(2) {
            if !(pair[1].time > pair[0].time) {
                return Err(ParticleError::InvalidDefinition(format!(
                    "keyframe times must increase ({} then {})",
                    pair[0].time, pair[1].time
                )));
            }
        }
        if self.keyframes.iter().any(|k| !(0.0..=1.0).contains(&k.time)) {
            return Err(ParticleError::InvalidDefinition(
                "keyframe times must lie in [0, 1]".to_string(),
            ));
        }
        if !(self.particle_lifetime > 0.0) {
            return Err(ParticleError::InvalidDefinition(
                "particle_lifetime must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.scene_lighting) {
            return Err(ParticleError::InvalidDefinition(
                "scene_lighting must lie in [0, 1]".to_string(),
            ));
        }

        let emitter = &self.emitter;
        match emitter.shape {
            EmitterShape::Circle | EmitterShape::FilledCircle if !(emitter.radius >= 0.0) => {
                return Err(ParticleError::InvalidDefinition(
                    "emitter radius must be non-negative".to_string(),
                ));
            }
            EmitterShape::FilledRectangle if emitter.x2 < emitter.x || emitter.y2 < emitter.y => {
                return Err(ParticleError::InvalidDefinition(
                    "rectangle emitter corners must satisfy x <= x2 and y <= y2".to_string(),
                ));
            }
            _ => {}
        }
        // 负的底数对 powf 取小数次幂得到 NaN
        if !(self.damping - self.damping_variation.abs() >= 0.0) {
            return Err(ParticleError::InvalidDefinition(
                "damping minus its variation must be non-negative".to_string(),
            ));
        }
        if emitter.emission_rate < 0.0 {
            return Err(ParticleError::InvalidDefinition(
                "emission_rate must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// 最后一个关键帧的索引
    pub fn last_keyframe(&self) -> usize {
        self.keyframes.len().saturating_sub(1)
    }
}
