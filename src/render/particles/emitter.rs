//! 粒子发射器
//!
//! 描述新粒子出生的位置形状、发射模式以及初速度方向分布。

use crate::impl_default;
use glam::Vec2;
use rand::Rng;
use std::f32::consts::TAU;

use super::keyframe::signed_random;

// ============================================================================
// 发射器枚举
// ============================================================================

/// 发射形状
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterShape {
    /// 点发射
    #[default]
    Point,
    /// 线段 (x, y) - (x2, y2)
    Line,
    /// 圆周
    Circle,
    /// 实心圆
    FilledCircle,
    /// 实心矩形 [x, x2] x [y, y2]
    FilledRectangle,
}

/// 发射模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterMode {
    /// 持续补满到最大粒子数
    #[default]
    Always,
    /// 按发射速率持续发射，直到系统寿命结束
    OneShot,
    /// 一次性发射最大粒子数后自动停止
    Burst,
}

/// 自旋方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterSpin {
    #[default]
    Clockwise,
    Counterclockwise,
    Random,
}

// ============================================================================
// 粒子发射器
// ============================================================================

/// 粒子发射器配置
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleEmitter {
    /// 发射形状
    pub shape: EmitterShape,
    pub x: f32,
    pub y: f32,
    /// 线段/矩形的第二个端点
    pub x2: f32,
    pub y2: f32,
    /// 圆形半径
    pub radius: f32,
    /// 形状采样后附加的位置抖动
    pub x_variation: f32,
    pub y_variation: f32,
    /// 发射模式
    pub mode: EmitterMode,
    /// 每秒发射数量（OneShot 模式）
    pub emission_rate: f32,
    /// 初速度
    pub initial_speed: f32,
    pub initial_speed_variation: f32,
    /// 初速度方向（弧度）
    pub orientation: f32,
    /// 全方向发射
    pub omnidirectional: bool,
    /// 内锥角（弧度），方向偏移不小于其一半
    pub inner_cone: f32,
    /// 外锥角（弧度），方向偏移不大于其一半
    pub outer_cone: f32,
    /// 自旋方向
    pub spin: EmitterSpin,
    /// 开始发射前的延迟（秒）
    pub start_time: f32,
}

impl_default!(ParticleEmitter {
    shape: EmitterShape::Point,
    x: 0.0,
    y: 0.0,
    x2: 0.0,
    y2: 0.0,
    radius: 0.0,
    x_variation: 0.0,
    y_variation: 0.0,
    mode: EmitterMode::Always,
    emission_rate: 0.0,
    initial_speed: 0.0,
    initial_speed_variation: 0.0,
    orientation: 0.0,
    omnidirectional: false,
    inner_cone: 0.0,
    outer_cone: 0.0,
    spin: EmitterSpin::Clockwise,
    start_time: 0.0,
});

impl ParticleEmitter {
    /// 点发射器
    pub fn point(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// 线段发射器
    pub fn line(x: f32, y: f32, x2: f32, y2: f32) -> Self {
        Self {
            shape: EmitterShape::Line,
            x,
            y,
            x2,
            y2,
            ..Default::default()
        }
    }

    /// 圆周发射器
    pub fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            shape: EmitterShape::Circle,
            x,
            y,
            radius,
            ..Default::default()
        }
    }

    /// 实心圆发射器
    pub fn filled_circle(x: f32, y: f32, radius: f32) -> Self {
        Self {
            shape: EmitterShape::FilledCircle,
            x,
            y,
            radius,
            ..Default::default()
        }
    }

    /// 实心矩形发射器
    pub fn filled_rectangle(x: f32, y: f32, x2: f32, y2: f32) -> Self {
        Self {
            shape: EmitterShape::FilledRectangle,
            x,
            y,
            x2,
            y2,
            ..Default::default()
        }
    }

    /// 设置发射模式
    pub fn with_mode(mut self, mode: EmitterMode) -> Self {
        self.mode = mode;
        self
    }

    /// 设置发射速率
    pub fn with_emission_rate(mut self, rate: f32) -> Self {
        self.emission_rate = rate;
        self
    }

    /// 设置初速度
    pub fn with_speed(mut self, speed: f32, variation: f32) -> Self {
        self.initial_speed = speed;
        self.initial_speed_variation = variation;
        self
    }

    /// 设置方向锥
    pub fn with_cone(mut self, orientation: f32, inner_cone: f32, outer_cone: f32) -> Self {
        self.orientation = orientation;
        self.inner_cone = inner_cone;
        self.outer_cone = outer_cone;
        self.omnidirectional = false;
        self
    }

    /// 全方向发射
    pub fn with_omnidirectional(mut self) -> Self {
        self.omnidirectional = true;
        self
    }

    /// 设置位置抖动
    pub fn with_position_variation(mut self, x: f32, y: f32) -> Self {
        self.x_variation = x;
        self.y_variation = y;
        self
    }

    pub fn with_spin(mut self, spin: EmitterSpin) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_start_time(mut self, start_time: f32) -> Self {
        self.start_time = start_time;
        self
    }

    /// 发射器中心，径向/切向加速度的默认吸引点
    pub fn center(&self) -> Vec2 {
        match self.shape {
            EmitterShape::Point | EmitterShape::Circle | EmitterShape::FilledCircle => {
                Vec2::new(self.x, self.y)
            }
            EmitterShape::Line | EmitterShape::FilledRectangle => {
                Vec2::new((self.x + self.x2) * 0.5, (self.y + self.y2) * 0.5)
            }
        }
    }

    /// 在发射形状上采样一个位置（不含抖动和朝向旋转）
    pub fn sample_shape<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        match self.shape {
            EmitterShape::Point => Vec2::new(self.x, self.y),
            EmitterShape::Line => {
                let t: f32 = rng.gen();
                Vec2::new(self.x, self.y).lerp(Vec2::new(self.x2, self.y2), t)
            }
            EmitterShape::Circle => {
                let angle = rng.gen::<f32>() * TAU;
                Vec2::new(self.x, self.y) + Vec2::from_angle(angle) * self.radius
            }
            EmitterShape::FilledCircle => {
                let radius_sq = self.radius * self.radius;
                if !(radius_sq > 0.0) || !radius_sq.is_finite() {
                    return Vec2::new(self.x, self.y);
                }
                // 拒绝采样：在外接正方形中取点直到落入圆内
                let offset = loop {
                    let candidate = Vec2::new(
                        signed_random(rng, self.radius),
                        signed_random(rng, self.radius),
                    );
                    if candidate.length_squared() <= radius_sq {
                        break candidate;
                    }
                };
                Vec2::new(self.x, self.y) + offset
            }
            EmitterShape::FilledRectangle => {
                let tx: f32 = rng.gen();
                let ty: f32 = rng.gen();
                Vec2::new(
                    self.x + (self.x2 - self.x) * tx,
                    self.y + (self.y2 - self.y) * ty,
                )
            }
        }
    }

    /// 初速度方向角（弧度，不含系统朝向）
    pub fn sample_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.omnidirectional {
            return rng.gen::<f32>() * TAU;
        }

        let inner = (self.inner_cone * 0.5).abs();
        let outer = (self.outer_cone * 0.5).abs().max(inner);
        let magnitude = if outer > inner {
            rng.gen_range(inner..=outer)
        } else {
            inner
        };
        let sign = if rng.gen::<bool>() { 1.0 } else { -1.0 };
        self.orientation + magnitude * sign
    }

    /// 初速度大小
    pub fn sample_speed<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.initial_speed + signed_random(rng, self.initial_speed_variation)
    }

    /// 粒子自旋符号 (+1 / -1)
    pub fn sample_rotation_direction<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        match self.spin {
            EmitterSpin::Clockwise => 1.0,
            EmitterSpin::Counterclockwise => -1.0,
            EmitterSpin::Random => {
                if rng.gen::<bool>() {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

// ============================================================================
// 测试
// ============================================================================
