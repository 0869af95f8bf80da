//! 粒子系统实例
//!
//! 一个运行中的特效：绑定一份共享的 [`ParticleSystemDef`]，拥有固定容量的粒子池、
//! 渲染缓冲区和随机数生成器。
//!
//! 粒子池是连续数组加存活计数：`particles[..num_particles]` 为存活粒子，
//! 删除时把最后一个存活粒子换到被删除的位置，不保留顺序。

use super::definition::ParticleSystemDef;
use super::emitter::EmitterMode;
use super::geometry::{OrientationMode, QuadBuffers};
use super::keyframe::Variation;
use super::particle::{respawn_particle, Particle};
use crate::core::error::{ParticleResult, RenderResult};
use crate::impl_default_and_new;
use crate::render::animation::SpriteAnimation;
use crate::render::backend::RenderBackend;
use glam::{Vec2, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// 所属特效每帧提供的参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    /// 特效朝向（弧度），旋转出生位置和初速度
    pub orientation: f32,
    /// 用户定义的吸引点
    pub attractor: Vec2,
}

impl_default_and_new!(EffectParameters {
    orientation: 0.0,
    attractor: Vec2::ZERO,
});

/// 粒子系统统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParticleSystemStats {
    /// 当前存活粒子数
    pub alive_count: usize,
    /// 总发射数（包括就地重生）
    pub total_emitted: u64,
    /// 本帧发射数
    pub frame_emitted: usize,
    /// 本帧过期粒子数
    pub frame_killed: usize,
}

/// 粒子系统
#[derive(Debug)]
pub struct ParticleSystem {
    def: Arc<ParticleSystemDef>,
    particles: Vec<Particle>,
    num_particles: usize,
    buffers: QuadBuffers,
    animation: SpriteAnimation,
    orientation: OrientationMode,
    age: f32,
    last_update_time: f32,
    alive: bool,
    stopped: bool,
    rng: StdRng,
    stats: ParticleSystemStats,
}

impl ParticleSystem {
    /// 创建粒子系统
    ///
    /// 分配粒子池和渲染缓冲区，并通过后端加载动画帧。
    ///
    /// # 错误
    ///
    /// - 定义没有关键帧或 `max_particles == 0` 时返回 `InvalidDefinition`
    /// - 动画帧加载失败时返回 `Animation`
    pub fn create(
        def: Arc<ParticleSystemDef>,
        backend: &mut dyn RenderBackend,
        seed: Option<u64>,
    ) -> ParticleResult<Self> {
        def.check_structure()?;

        let animation =
            SpriteAnimation::load(backend, &def.animation.frames, &def.animation.frame_times)?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        tracing::debug!(
            target: "particles",
            max_particles = def.max_particles,
            frames = animation.frame_count(),
            backend = backend.name(),
            "Particle system created"
        );

        Ok(Self {
            particles: vec![Particle::default(); def.max_particles],
            num_particles: 0,
            buffers: QuadBuffers::with_capacity(def.max_particles),
            animation,
            orientation: OrientationMode::from_def(&def),
            age: 0.0,
            last_update_time: 0.0,
            alive: true,
            stopped: false,
            rng,
            stats: ParticleSystemStats::default(),
            def,
        })
    }

    /// 销毁粒子系统，释放后端资源
    pub fn destroy(self, backend: &mut dyn RenderBackend) {
        tracing::debug!(
            target: "particles",
            age = self.age,
            emitted = self.stats.total_emitted,
            "Particle system destroyed"
        );
        self.animation.release(backend);
    }

    /// 推进一帧
    pub fn update(&mut self, frame_time: f32, params: &EffectParameters) {
        if !self.def.enabled {
            return;
        }

        let frame_time = if frame_time.is_finite() && frame_time >= 0.0 {
            frame_time
        } else {
            tracing::warn!(target: "particles", frame_time, "Invalid frame time clamped to zero");
            0.0
        };

        self.age += frame_time;
        if self.age < self.def.emitter.start_time {
            self.last_update_time = self.age;
            return;
        }

        self.animation.update(frame_time);
        self.update_particles(frame_time, params);

        self.stats.frame_emitted = 0;
        self.stats.frame_killed = 0;
        let mut emit_count = self.emission_count();
        self.kill_particles(&mut emit_count, params);
        self.emit_particles(emit_count, params);

        let mode = self.def.emitter.mode;
        match mode {
            EmitterMode::Burst => self.stop(),
            EmitterMode::OneShot if self.age > self.def.system_lifetime => self.stop(),
            _ => {}
        }

        if self.num_particles == 0 && self.stopped && self.alive {
            self.alive = false;
            tracing::debug!(target: "particles", age = self.age, "Particle system finished");
        }

        self.last_update_time = self.age;
        self.stats.alive_count = self.num_particles;
        self.stats.total_emitted += self.stats.frame_emitted as u64;
    }

    /// 更新所有存活粒子：关键帧插值和物理积分
    fn update_particles(&mut self, frame_time: f32, params: &EffectParameters) {
        let def: &ParticleSystemDef = &self.def;
        let attractor = if def.user_defined_attractor {
            params.attractor
        } else {
            def.emitter.center()
        };
        let integrate_rotation = self.orientation == OrientationMode::Spin;
        let wave_motion = def.wave_motion.is_some();
        let rng = &mut self.rng;

        for p in &mut self.particles[..self.num_particles] {
            advance_keyframes(p, def, rng);
            interpolate_keyframes(p, def);

            if integrate_rotation {
                p.rotation_angle += p.rotation_speed * p.rotation_direction * frame_time;
            }

            let mut combined = p.velocity + p.wind_velocity;
            if wave_motion && p.wave_half_amplitude > 0.0 {
                let speed = combined.length();
                if speed > 0.0 {
                    let tangent = combined.perp() / speed;
                    let wave_speed =
                        p.wave_half_amplitude * (p.wave_length_coefficient * p.time).sin();
                    combined += tangent * wave_speed;
                }
            }
            p.combined_velocity = combined;
            p.position += combined * frame_time;

            p.velocity += p.acceleration * frame_time;

            if p.radial_acceleration != 0.0 || p.tangential_acceleration != 0.0 {
                let to_attractor = attractor - p.position;
                let distance = to_attractor.length();
                if distance > 0.0 {
                    let falloff = if def.attractor_falloff != 0.0 {
                        1.0 - def.attractor_falloff * distance
                    } else {
                        1.0
                    };
                    if falloff > 0.0 {
                        let radial = to_attractor / distance;
                        let force = radial * p.radial_acceleration
                            + radial.perp() * p.tangential_acceleration;
                        p.velocity += force * (frame_time * falloff);
                    }
                }
            }

            p.velocity *= p.damping.powf(frame_time);
            p.time += frame_time;
        }
    }

    /// 本帧需要发射的粒子数
    fn emission_count(&self) -> usize {
        if self.stopped {
            return 0;
        }

        let max = self.def.max_particles;
        let free = max - self.num_particles;
        match self.def.emitter.mode {
            EmitterMode::Always => free,
            EmitterMode::Burst => max,
            EmitterMode::OneShot => {
                // 整数累加：长期平均速率准确，与帧时间是否整除 1/rate 无关
                let rate = f64::from(self.def.emitter.emission_rate);
                let now = (f64::from(self.age) * rate).ceil() as i64;
                let before = (f64::from(self.last_update_time) * rate).floor() as i64;
                (now - before - 1).clamp(0, free as i64) as usize
            }
        }
    }

    /// 处理过期粒子：优先就地重生，否则与最后一个存活粒子交换后移除
    fn kill_particles(&mut self, emit_count: &mut usize, params: &EffectParameters) {
        let def: &ParticleSystemDef = &self.def;
        let rng = &mut self.rng;

        let mut i = 0;
        while i < self.num_particles {
            if !self.particles[i].is_expired() {
                i += 1;
                continue;
            }

            self.stats.frame_killed += 1;
            if *emit_count > 0 {
                respawn_particle(&mut self.particles[i], def, params, rng);
                *emit_count -= 1;
                self.stats.frame_emitted += 1;
                i += 1;
            } else {
                self.num_particles -= 1;
                self.particles.swap(i, self.num_particles);
            }
        }
    }

    /// 在存活区间末尾发射新粒子
    fn emit_particles(&mut self, count: usize, params: &EffectParameters) {
        let start = self.num_particles;
        let end = start + count.min(self.particles.len() - start);
        let def: &ParticleSystemDef = &self.def;
        let rng = &mut self.rng;

        for p in &mut self.particles[start..end] {
            respawn_particle(p, def, params, rng);
        }
        self.stats.frame_emitted += end - start;
        self.num_particles = end;
    }

    /// 绘制所有存活粒子
    ///
    /// 每帧一次批量提交；平滑动画时额外提交下一帧的淡入层。
    pub fn draw(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        if !self.def.enabled || self.age < self.def.emitter.start_time || self.num_particles == 0
        {
            return Ok(());
        }

        let def: &ParticleSystemDef = &self.def;
        let particles = &self.particles[..self.num_particles];
        let frame = *self.animation.current_frame();

        self.buffers
            .build_positions(particles, self.orientation, &frame, def.speed_scale);

        let modulate = if def.scene_lighting > 0.0 {
            Vec4::ONE.lerp(backend.scene_lighting_color(), def.scene_lighting)
        } else {
            Vec4::ONE
        };
        let cross_fade = def.smooth_animation && self.animation.frame_count() > 1;
        let progress = if cross_fade {
            self.animation.progress()
        } else {
            0.0
        };

        self.buffers
            .build_colors(particles, modulate * (1.0 - progress));
        self.buffers.fill_texcoords(&frame);
        backend.bind_texture(frame.texture)?;
        backend.submit_quad_batch(&self.buffers.batch(def.blend_mode, def.stencil))?;

        if cross_fade && progress > 0.0 {
            let next = *self.animation.next_frame();
            self.buffers.build_colors(particles, modulate * progress);
            self.buffers.fill_texcoords(&next);
            backend.bind_texture(next.texture)?;
            backend.submit_quad_batch(&self.buffers.batch(def.blend_mode, def.stencil))?;
        }

        Ok(())
    }

    /// 停止发射，已有粒子自然消亡
    pub fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            tracing::debug!(
                target: "particles",
                age = self.age,
                particles = self.num_particles,
                "Particle system stopped"
            );
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn num_particles(&self) -> usize {
        self.num_particles
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    /// 存活粒子
    pub fn particles(&self) -> &[Particle] {
        &self.particles[..self.num_particles]
    }

    pub fn def(&self) -> &Arc<ParticleSystemDef> {
        &self.def
    }

    pub fn stats(&self) -> ParticleSystemStats {
        self.stats
    }

    pub fn animation(&self) -> &SpriteAnimation {
        &self.animation
    }

    /// 最近一次绘制生成的顶点位置
    pub fn vertices(&self) -> &[[f32; 2]] {
        self.buffers.positions()
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        self.buffers.colors()
    }

    pub fn texcoords(&self) -> &[[f32; 2]] {
        self.buffers.texcoords()
    }
}

/// 把粒子固定到最后一个关键帧，直接使用其基础值
fn pin_to_last_keyframe(p: &mut Particle, def: &ParticleSystemDef) {
    let last = def.last_keyframe();
    let keyframe = &def.keyframes[last];
    p.current_keyframe = last;
    p.next_keyframe = None;
    p.color = keyframe.color;
    p.rotation_speed = keyframe.rotation_speed;
    p.size = keyframe.size;
    p.current_variation = Variation::default();
    p.next_variation = Variation::default();
}

/// 必要时前进到包含当前归一化时间的关键帧对，可一次跨过多个关键帧
fn advance_keyframes<R: Rng + ?Sized>(p: &mut Particle, def: &ParticleSystemDef, rng: &mut R) {
    let Some(next) = p.next_keyframe else {
        return;
    };
    let keyframes = &def.keyframes;
    let Some(next_keyframe) = keyframes.get(next) else {
        pin_to_last_keyframe(p, def);
        return;
    };

    let scaled_time = p.scaled_time();
    if scaled_time < next_keyframe.time {
        return;
    }

    let last = def.last_keyframe();
    let mut current = next;
    while current < last && scaled_time >= keyframes[current + 1].time {
        current += 1;
    }

    if current >= last {
        pin_to_last_keyframe(p, def);
        return;
    }

    // 只前进一步时沿用上一对的 next 偏移，避免属性跳变
    p.current_variation = if current == p.current_keyframe + 1 {
        p.next_variation
    } else {
        Variation::roll(&keyframes[current], rng)
    };
    p.current_keyframe = current;
    p.next_keyframe = Some(current + 1);
    p.next_variation = Variation::roll(&keyframes[current + 1], rng);
}

/// 在当前与下一关键帧之间线性插值
fn interpolate_keyframes(p: &mut Particle, def: &ParticleSystemDef) {
    let Some(next) = p.next_keyframe else {
        return;
    };
    let current = &def.keyframes[p.current_keyframe];
    let next = &def.keyframes[next];

    let span = next.time - current.time;
    let a = if span > 0.0 {
        (p.scaled_time() - current.time) / span
    } else {
        1.0
    };

    let cv = p.current_variation;
    let nv = p.next_variation;
    let from_speed = current.rotation_speed + cv.rotation_speed;
    let to_speed = next.rotation_speed + nv.rotation_speed;
    p.rotation_speed = from_speed + (to_speed - from_speed) * a;
    p.size = (current.size + cv.size).lerp(next.size + nv.size, a);
    p.color = (current.color + cv.color).lerp(next.color + nv.color, a);
}
