use super::{ConfigError, ConfigResult};
use crate::impl_default;
use serde::{Deserialize, Serialize};

/// 粒子运行时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// 是否启用粒子更新与绘制
    pub enabled: bool,

    /// 管理器可同时持有的最大粒子系统数
    pub max_systems: usize,

    /// 单帧时间上限（秒），防止卡顿后一次性模拟过长时间
    pub max_frame_time: Option<f32>,

    /// 随机数种子（None = 从系统熵初始化）
    pub seed: Option<u64>,
}

impl_default!(ParticleConfig {
    enabled: true,
    max_systems: 64,
    max_frame_time: None,
    seed: None,
});

impl ParticleConfig {
    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_systems == 0 {
            return Err(ConfigError::ValidationError(
                "max_systems must be greater than zero".to_string(),
            ));
        }
        if let Some(max) = self.max_frame_time {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::ValidationError(
                    "max_frame_time must be positive".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// 按配置限制帧时间
    pub fn clamp_frame_time(&self, frame_time: f32) -> f32 {
        match self.max_frame_time {
            Some(max) => frame_time.min(max),
            None => frame_time,
        }
    }
}
