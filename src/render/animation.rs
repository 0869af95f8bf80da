//! 精灵帧动画
//!
//! 按每帧持续时间循环切换纹理区域，并提供帧内进度，
//! 供粒子在相邻两帧之间做平滑过渡。

use crate::core::error::{AssetError, AssetResult};
use crate::render::backend::{RenderBackend, TextureRegion};

#[derive(Debug, Clone)]
pub struct SpriteAnimation {
    frames: Vec<TextureRegion>,
    /// 每帧持续时间（秒），0 表示每次更新前进一帧
    durations: Vec<f32>,
    current_frame: usize,
    timer: f32,
}

impl SpriteAnimation {
    /// 通过后端加载动画帧
    ///
    /// 持续时间少于帧数时重复最后一个值；没有给出持续时间时为 0。
    /// 任何一帧加载失败都会释放已加载的帧并返回错误。
    pub fn load(
        backend: &mut dyn RenderBackend,
        frame_names: &[String],
        frame_durations: &[f32],
    ) -> AssetResult<Self> {
        if frame_names.is_empty() {
            return Err(AssetError::NoFrames);
        }

        let mut frames = Vec::with_capacity(frame_names.len());
        for name in frame_names {
            match backend.load_texture(name) {
                Ok(region) => frames.push(region),
                Err(err) => {
                    for region in &frames {
                        backend.release_texture(region.texture);
                    }
                    return Err(err);
                }
            }
        }

        let durations = (0..frames.len())
            .map(|i| {
                frame_durations
                    .get(i)
                    .or_else(|| frame_durations.last())
                    .copied()
                    .unwrap_or(0.0)
                    .max(0.0)
            })
            .collect();

        Ok(Self {
            frames,
            durations,
            current_frame: 0,
            timer: 0.0,
        })
    }

    /// 释放所有帧纹理
    pub fn release(self, backend: &mut dyn RenderBackend) {
        for region in &self.frames {
            backend.release_texture(region.texture);
        }
    }

    /// 推进动画计时器
    pub fn update(&mut self, frame_time: f32) {
        let count = self.frames.len();
        if count <= 1 {
            return;
        }

        if self.durations[self.current_frame] <= 0.0 {
            self.current_frame = (self.current_frame + 1) % count;
            self.timer = 0.0;
            return;
        }

        self.timer += frame_time;

        // 超过一整个循环的部分不影响当前帧，先取模，逐帧前进最多一轮
        if self.durations.iter().all(|&d| d > 0.0) {
            let cycle: f32 = self.durations.iter().sum();
            if self.timer >= cycle {
                self.timer %= cycle;
            }
        }

        for _ in 0..count {
            let duration = self.durations[self.current_frame];
            if duration <= 0.0 || self.timer < duration {
                break;
            }
            self.timer -= duration;
            self.current_frame = (self.current_frame + 1) % count;
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_frame
    }

    pub fn current_frame(&self) -> &TextureRegion {
        &self.frames[self.current_frame]
    }

    /// 下一帧（循环）
    pub fn next_frame(&self) -> &TextureRegion {
        &self.frames[(self.current_frame + 1) % self.frames.len()]
    }

    /// 当前帧内的进度，范围 [0, 1)
    pub fn progress(&self) -> f32 {
        let duration = self.durations[self.current_frame];
        if duration <= 0.0 {
            return 0.0;
        }
        (self.timer / duration).clamp(0.0, 1.0 - f32::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::NullBackend;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("frame{i}.png")).collect()
    }

    #[test]
    fn test_durations_repeat_last() {
        let mut backend = NullBackend::new();
        let mut anim = SpriteAnimation::load(&mut backend, &names(3), &[0.1, 0.2]).unwrap();
        assert_eq!(anim.frame_count(), 3);

        anim.update(0.15);
        assert_eq!(anim.current_index(), 1);
        assert!((anim.progress() - 0.25).abs() < 1e-5);

        anim.update(0.2);
        assert_eq!(anim.current_index(), 2);

        // 第三帧沿用 0.2 秒
        anim.update(0.1);
        assert_eq!(anim.current_index(), 2);
        anim.update(0.06);
        assert_eq!(anim.current_index(), 0);
    }

    #[test]
    fn test_long_frame_time_wraps_whole_cycles() {
        let mut backend = NullBackend::new();
        let mut anim = SpriteAnimation::load(&mut backend, &names(2), &[0.1, 0.2]).unwrap();
        anim.update(3.05);
        assert_eq!(anim.current_index(), 0);
        assert!((anim.progress() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_huge_frame_time_with_tiny_durations_returns() {
        let mut backend = NullBackend::new();
        let mut anim = SpriteAnimation::load(&mut backend, &names(2), &[0.001]).unwrap();
        anim.update(100_000.0);
        assert!(anim.current_index() < 2);
        assert!((0.0..1.0).contains(&anim.progress()));

        anim.update(100_000.0);
        assert!(anim.current_index() < 2);
    }

    #[test]
    fn test_zero_duration_advances_every_tick() {
        let mut backend = NullBackend::new();
        let mut anim = SpriteAnimation::load(&mut backend, &names(2), &[]).unwrap();
        anim.update(0.0);
        assert_eq!(anim.current_index(), 1);
        anim.update(0.0);
        assert_eq!(anim.current_index(), 0);
        assert_eq!(anim.progress(), 0.0);
    }

    #[test]
    fn test_failed_load_releases_frames() {
        let mut backend = NullBackend::new();
        backend.missing.push("frame2.png".to_string());
        let result = SpriteAnimation::load(&mut backend, &names(3), &[0.1]);
        assert!(result.is_err());
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn test_empty_frames_rejected() {
        let mut backend = NullBackend::new();
        assert!(matches!(
            SpriteAnimation::load(&mut backend, &[], &[]),
            Err(AssetError::NoFrames)
        ));
    }

    #[test]
    fn test_release() {
        let mut backend = NullBackend::new();
        let anim = SpriteAnimation::load(&mut backend, &names(4), &[0.1]).unwrap();
        assert_eq!(backend.live_texture_count(), 4);
        anim.release(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
    }
}
