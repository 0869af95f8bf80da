//! 四边形顶点生成
//!
//! 每个存活粒子生成一个带纹理的四边形，写入三个扁平数组（位置、颜色、纹理坐标），
//! 整个系统一次提交给后端。

use super::definition::{ParticleSystemDef, SpeedScale};
use super::particle::Particle;
use crate::render::backend::{BlendMode, QuadBatch, StencilState, TextureRegion};
use glam::{Vec2, Vec4};
use std::f32::consts::FRAC_PI_2;

/// 四边形朝向的计算路径，创建实例时确定一次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientationMode {
    /// 不旋转
    Fixed,
    /// 使用关键帧旋转速度积分出的角度
    Spin,
    /// 朝向合成速度方向
    AlignToVelocity,
}

impl OrientationMode {
    pub fn from_def(def: &ParticleSystemDef) -> Self {
        if def.rotate_to_velocity {
            OrientationMode::AlignToVelocity
        } else if def.rotation_used {
            OrientationMode::Spin
        } else {
            OrientationMode::Fixed
        }
    }
}

/// 以左上、右上、右下、左下顺序返回四个角相对中心的偏移
#[inline]
fn corner_offsets(half: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(-half.x, -half.y),
        Vec2::new(half.x, -half.y),
        Vec2::new(half.x, half.y),
        Vec2::new(-half.x, half.y),
    ]
}

#[inline]
fn write_quad(out: &mut [[f32; 2]], center: Vec2, offsets: [Vec2; 4], rotation: Option<Vec2>) {
    for (slot, offset) in out.iter_mut().zip(offsets) {
        let offset = match rotation {
            Some(r) => r.rotate(offset),
            None => offset,
        };
        *slot = (center + offset).to_array();
    }
}

/// 粒子系统的渲染缓冲区
#[derive(Debug, Clone)]
pub struct QuadBuffers {
    positions: Vec<[f32; 2]>,
    colors: Vec<[f32; 4]>,
    texcoords: Vec<[f32; 2]>,
    quad_count: usize,
}

impl QuadBuffers {
    /// 按最大粒子数一次性分配
    pub fn with_capacity(max_particles: usize) -> Self {
        let vertices = max_particles * 4;
        Self {
            positions: vec![[0.0; 2]; vertices],
            colors: vec![[0.0; 4]; vertices],
            texcoords: vec![[0.0; 2]; vertices],
            quad_count: 0,
        }
    }

    pub fn quad_count(&self) -> usize {
        self.quad_count
    }

    pub fn positions(&self) -> &[[f32; 2]] {
        &self.positions[..self.quad_count * 4]
    }

    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors[..self.quad_count * 4]
    }

    pub fn texcoords(&self) -> &[[f32; 2]] {
        &self.texcoords[..self.quad_count * 4]
    }

    /// 生成顶点位置
    pub fn build_positions(
        &mut self,
        particles: &[Particle],
        mode: OrientationMode,
        frame: &TextureRegion,
        speed_scale: Option<SpeedScale>,
    ) {
        let count = particles.len().min(self.positions.len() / 4);
        let half_frame = Vec2::new(frame.width, frame.height) * 0.5;
        let quads = self.positions[..count * 4].chunks_exact_mut(4);

        match mode {
            OrientationMode::Fixed => {
                for (out, p) in quads.zip(particles) {
                    write_quad(out, p.position, corner_offsets(p.size * half_frame), None);
                }
            }
            OrientationMode::Spin => {
                for (out, p) in quads.zip(particles) {
                    let rotation = Vec2::from_angle(p.rotation_angle);
                    write_quad(
                        out,
                        p.position,
                        corner_offsets(p.size * half_frame),
                        Some(rotation),
                    );
                }
            }
            OrientationMode::AlignToVelocity => {
                for (out, p) in quads.zip(particles) {
                    let v = p.combined_velocity;
                    let angle = v.y.atan2(v.x) + FRAC_PI_2;
                    let mut half = p.size * half_frame;
                    if let Some(scale) = speed_scale {
                        half.y *= scale.factor(v.length());
                    }
                    write_quad(
                        out,
                        p.position,
                        corner_offsets(half),
                        Some(Vec2::from_angle(angle)),
                    );
                }
            }
        }

        self.quad_count = count;
    }

    /// 写入顶点颜色：粒子颜色按分量乘以 `modulate`
    pub fn build_colors(&mut self, particles: &[Particle], modulate: Vec4) {
        let count = particles.len().min(self.colors.len() / 4);
        for (out, p) in self.colors[..count * 4].chunks_exact_mut(4).zip(particles) {
            let color = (p.color * modulate).to_array();
            out.fill(color);
        }
    }

    /// 所有四边形使用同一帧的纹理坐标
    pub fn fill_texcoords(&mut self, frame: &TextureRegion) {
        let corners = frame.corner_texcoords();
        for out in self.texcoords[..self.quad_count * 4].chunks_exact_mut(4) {
            out.copy_from_slice(&corners);
        }
    }

    /// 当前内容对应的批量绘制
    pub fn batch(&self, blend: BlendMode, stencil: StencilState) -> QuadBatch<'_> {
        QuadBatch {
            positions: self.positions(),
            colors: self.colors(),
            texcoords: self.texcoords(),
            quad_count: self.quad_count,
            blend,
            stencil,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::TextureHandle;

    fn frame() -> TextureRegion {
        TextureRegion::full(TextureHandle(1), 10.0, 20.0)
    }

    fn particle_at(x: f32, y: f32) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            ..Default::default()
        }
    }

    fn assert_close(a: [f32; 2], b: [f32; 2]) {
        assert!(
            (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn test_orientation_mode_selection() {
        let mut def = ParticleSystemDef::default();
        assert_eq!(OrientationMode::from_def(&def), OrientationMode::Fixed);
        def.rotation_used = true;
        assert_eq!(OrientationMode::from_def(&def), OrientationMode::Spin);
        def.rotate_to_velocity = true;
        assert_eq!(
            OrientationMode::from_def(&def),
            OrientationMode::AlignToVelocity
        );
    }

    #[test]
    fn test_fixed_quad_corners() {
        let mut buffers = QuadBuffers::with_capacity(2);
        let mut p = particle_at(100.0, 50.0);
        p.size = Vec2::new(2.0, 1.0);
        buffers.build_positions(&[p], OrientationMode::Fixed, &frame(), None);

        assert_eq!(buffers.quad_count(), 1);
        assert_eq!(
            buffers.positions(),
            &[[90.0, 40.0], [110.0, 40.0], [110.0, 60.0], [90.0, 60.0]]
        );
    }

    #[test]
    fn test_spin_rotates_corners() {
        let mut buffers = QuadBuffers::with_capacity(1);
        let mut p = particle_at(0.0, 0.0);
        p.rotation_angle = FRAC_PI_2;
        buffers.build_positions(&[p], OrientationMode::Spin, &frame(), None);

        // (-5, -10) 旋转 90 度得到 (10, -5)
        assert_close(buffers.positions()[0], [10.0, -5.0]);
    }

    #[test]
    fn test_align_to_velocity_with_stretch() {
        let mut buffers = QuadBuffers::with_capacity(1);
        let mut p = particle_at(0.0, 0.0);
        p.combined_velocity = Vec2::new(0.0, -10.0);
        let stretch = SpeedScale {
            scale: 0.2,
            min: 1.0,
            max: 4.0,
        };
        buffers.build_positions(
            &[p],
            OrientationMode::AlignToVelocity,
            &frame(),
            Some(stretch),
        );

        // 速度朝 -y，角度为 0，纵向拉伸 2 倍
        assert_close(buffers.positions()[0], [-5.0, -20.0]);
        assert_close(buffers.positions()[2], [5.0, 20.0]);
    }

    #[test]
    fn test_colors_and_texcoords() {
        let mut buffers = QuadBuffers::with_capacity(3);
        let mut a = particle_at(0.0, 0.0);
        a.color = Vec4::new(1.0, 0.5, 0.25, 1.0);
        let particles = [a, particle_at(1.0, 1.0)];
        buffers.build_positions(&particles, OrientationMode::Fixed, &frame(), None);
        buffers.build_colors(&particles, Vec4::splat(0.5));
        buffers.fill_texcoords(&frame());

        assert_eq!(buffers.colors().len(), 8);
        assert_eq!(buffers.colors()[3], [0.5, 0.25, 0.125, 0.5]);
        assert_eq!(buffers.texcoords()[6], [1.0, 1.0]);

        let batch = buffers.batch(BlendMode::Additive, StencilState::Test);
        assert!(batch.validate().is_ok());
        assert_eq!(batch.quad_count, 2);
    }
}
