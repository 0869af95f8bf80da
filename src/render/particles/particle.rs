//! 单个粒子
//!
//! 粒子是粒子池中的槽位，通过 [`respawn_particle`] 就地重新初始化，
//! 从不单独分配或释放。

use super::definition::ParticleSystemDef;
use super::keyframe::{vary, Variation};
use super::system::EffectParameters;
use glam::{Vec2, Vec4};
use rand::Rng;
use std::f32::consts::TAU;

/// 粒子状态
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub size: Vec2,
    /// 自身速度
    pub velocity: Vec2,
    /// 自身速度 + 风 + 波动，每次更新重新计算
    pub combined_velocity: Vec2,
    pub color: Vec4,
    pub rotation_angle: f32,
    pub rotation_speed: f32,
    /// 自旋符号 (+1 / -1)
    pub rotation_direction: f32,
    /// 出生以来的时间（秒）
    pub time: f32,
    /// 寿命（秒）
    pub lifetime: f32,
    /// 2π / 波长
    pub wave_length_coefficient: f32,
    pub wave_half_amplitude: f32,
    pub acceleration: Vec2,
    pub tangential_acceleration: f32,
    pub radial_acceleration: f32,
    pub wind_velocity: Vec2,
    pub damping: f32,
    /// 当前关键帧上取到的随机偏移
    pub current_variation: Variation,
    /// 下一关键帧上取到的随机偏移
    pub next_variation: Variation,
    /// 当前关键帧索引
    pub current_keyframe: usize,
    /// 下一关键帧索引，当前为最后一帧时为 None
    pub next_keyframe: Option<usize>,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ONE,
            velocity: Vec2::ZERO,
            combined_velocity: Vec2::ZERO,
            color: Vec4::ONE,
            rotation_angle: 0.0,
            rotation_speed: 0.0,
            rotation_direction: 1.0,
            time: 0.0,
            lifetime: 0.0,
            wave_length_coefficient: 0.0,
            wave_half_amplitude: 0.0,
            acceleration: Vec2::ZERO,
            tangential_acceleration: 0.0,
            radial_acceleration: 0.0,
            wind_velocity: Vec2::ZERO,
            damping: 1.0,
            current_variation: Variation::default(),
            next_variation: Variation::default(),
            current_keyframe: 0,
            next_keyframe: None,
        }
    }
}

impl Particle {
    /// 归一化寿命
    pub fn scaled_time(&self) -> f32 {
        if self.lifetime > 0.0 {
            self.time / self.lifetime
        } else {
            f32::INFINITY
        }
    }

    /// 是否已超过寿命
    pub fn is_expired(&self) -> bool {
        self.time > self.lifetime
    }
}

fn vary_vec2<R: Rng + ?Sized>(rng: &mut R, base: Vec2, variation: Vec2) -> Vec2 {
    Vec2::new(vary(rng, base.x, variation.x), vary(rng, base.y, variation.y))
}

/// 就地重新初始化一个粒子
///
/// 用于新发射的粒子，也用于直接替换已过期的粒子（避免删除再添加）。
pub fn respawn_particle<R: Rng + ?Sized>(
    particle: &mut Particle,
    def: &ParticleSystemDef,
    params: &EffectParameters,
    rng: &mut R,
) {
    let emitter = &def.emitter;
    let rotation = Vec2::from_angle(params.orientation);

    // 位置
    let mut position = emitter.sample_shape(rng);
    position.x = vary(rng, position.x, emitter.x_variation);
    position.y = vary(rng, position.y, emitter.y_variation);
    if params.orientation != 0.0 {
        position = rotation.rotate(position);
    }
    particle.position = position;

    // 关键帧属性
    let first = &def.keyframes[0];
    particle.color = first.color;
    particle.size = first.size;
    particle.rotation_speed = first.rotation_speed;
    particle.current_keyframe = 0;
    if def.keyframes.len() > 1 {
        particle.next_keyframe = Some(1);
        particle.current_variation = Variation::roll(first, rng);
        particle.next_variation = Variation::roll(&def.keyframes[1], rng);
    } else {
        // 只有一个关键帧时不会再插值，随机偏移立即且永久生效
        particle.next_keyframe = None;
        let variation = Variation::roll(first, rng);
        particle.color += variation.color;
        particle.size += variation.size;
        particle.rotation_speed += variation.rotation_speed;
        particle.current_variation = variation;
        particle.next_variation = Variation::default();
    }

    // 旋转
    particle.rotation_direction = emitter.sample_rotation_direction(rng);
    particle.rotation_angle = if def.random_initial_angle {
        rng.gen::<f32>() * TAU
    } else {
        0.0
    };

    // 初速度
    let speed = emitter.sample_speed(rng);
    let mut direction = Vec2::from_angle(emitter.sample_direction(rng));
    if params.orientation != 0.0 {
        direction = rotation.rotate(direction);
    }
    particle.velocity = direction * speed;
    particle.combined_velocity = particle.velocity;

    // 每个粒子固定的物理参数
    particle.time = 0.0;
    particle.lifetime = vary(rng, def.particle_lifetime, def.particle_lifetime_variation);
    particle.acceleration = vary_vec2(rng, def.acceleration, def.acceleration_variation);
    particle.wind_velocity = vary_vec2(rng, def.wind_velocity, def.wind_velocity_variation);
    particle.damping = vary(rng, def.damping, def.damping_variation);
    particle.tangential_acceleration = vary(
        rng,
        def.tangential_acceleration,
        def.tangential_acceleration_variation,
    );
    particle.radial_acceleration = vary(
        rng,
        def.radial_acceleration,
        def.radial_acceleration_variation,
    );

    match def.wave_motion {
        Some(wave) => {
            let length = vary(rng, wave.length, wave.length_variation);
            particle.wave_length_coefficient = if length > 0.0 { TAU / length } else { 0.0 };
            particle.wave_half_amplitude =
                vary(rng, wave.amplitude, wave.amplitude_variation) * 0.5;
        }
        None => {
            particle.wave_length_coefficient = 0.0;
            particle.wave_half_amplitude = 0.0;
        }
    }
}
