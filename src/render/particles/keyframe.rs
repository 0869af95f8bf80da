//! 粒子关键帧
//!
//! 关键帧的时间是归一化的粒子寿命（0 = 出生，1 = 死亡）。
//! 相邻两帧之间对大小、颜色、旋转速度做线性插值。

use glam::{Vec2, Vec4};
use rand::Rng;

/// 粒子关键帧
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// 归一化时间 [0, 1]
    pub time: f32,
    /// 大小缩放（1.0 = 精灵原始大小）
    pub size: Vec2,
    /// 颜色 RGBA（不做截断）
    pub color: Vec4,
    /// 旋转速度（弧度/秒）
    pub rotation_speed: f32,
    /// 大小随机幅度
    pub size_variation: Vec2,
    /// 颜色随机幅度
    pub color_variation: Vec4,
    /// 旋转速度随机幅度
    pub rotation_speed_variation: f32,
}

impl Default for Keyframe {
    fn default() -> Self {
        Self {
            time: 0.0,
            size: Vec2::ONE,
            color: Vec4::ONE,
            rotation_speed: 0.0,
            size_variation: Vec2::ZERO,
            color_variation: Vec4::ZERO,
            rotation_speed_variation: 0.0,
        }
    }
}

impl Keyframe {
    /// 在指定归一化时间创建关键帧
    pub fn at(time: f32) -> Self {
        Self {
            time,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, x: f32, y: f32) -> Self {
        self.size = Vec2::new(x, y);
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_rotation_speed(mut self, speed: f32) -> Self {
        self.rotation_speed = speed;
        self
    }

    pub fn with_size_variation(mut self, x: f32, y: f32) -> Self {
        self.size_variation = Vec2::new(x, y);
        self
    }

    pub fn with_color_variation(mut self, variation: Vec4) -> Self {
        self.color_variation = variation;
        self
    }

    pub fn with_rotation_speed_variation(mut self, variation: f32) -> Self {
        self.rotation_speed_variation = variation;
        self
    }
}

/// 某个粒子在一个关键帧上实际取到的随机偏移
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Variation {
    pub size: Vec2,
    pub color: Vec4,
    pub rotation_speed: f32,
}

impl Variation {
    /// 按关键帧的随机幅度掷出一组偏移
    pub fn roll<R: Rng + ?Sized>(keyframe: &Keyframe, rng: &mut R) -> Self {
        Self {
            size: Vec2::new(
                signed_random(rng, keyframe.size_variation.x),
                signed_random(rng, keyframe.size_variation.y),
            ),
            color: Vec4::new(
                signed_random(rng, keyframe.color_variation.x),
                signed_random(rng, keyframe.color_variation.y),
                signed_random(rng, keyframe.color_variation.z),
                signed_random(rng, keyframe.color_variation.w),
            ),
            rotation_speed: signed_random(rng, keyframe.rotation_speed_variation),
        }
    }
}

/// 在 [-magnitude, +magnitude] 中均匀取值
pub(crate) fn signed_random<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    let magnitude = magnitude.abs();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return 0.0;
    }
    rng.gen_range(-magnitude..=magnitude)
}

/// 基础值加上 [-variation, +variation] 的随机偏移
pub(crate) fn vary<R: Rng + ?Sized>(rng: &mut R, base: f32, variation: f32) -> f32 {
    base + signed_random(rng, variation)
}
