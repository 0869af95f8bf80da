//! 统一错误处理模块
//!
//! 提供粒子引擎范围内的错误类型定义
//!
//! ## 错误类型分层
//!
//! - **资源错误** (`AssetError`): 动画帧纹理加载失败
//! - **渲染错误** (`RenderError`): 渲染后端提交失败
//! - **粒子错误** (`ParticleError`): 粒子系统创建失败，可以同时包装以上两类错误
//!
//! `update` 在合法定义下永远不会失败，因此没有对应的错误类型。

use thiserror::Error;

/// 粒子系统错误类型
#[derive(Error, Debug)]
pub enum ParticleError {
    #[error("Invalid particle system definition: {0}")]
    InvalidDefinition(String),

    #[error("Animation error: {0}")]
    Animation(#[from] AssetError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Particle system limit reached: {0}")]
    LimitReached(usize),
}

/// 渲染后端错误
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("Unknown texture handle: {0}")]
    UnknownTexture(u64),

    #[error("Quad batch buffers have mismatched lengths (positions: {positions}, colors: {colors}, texcoords: {texcoords})")]
    MismatchedBuffers {
        positions: usize,
        colors: usize,
        texcoords: usize,
    },

    #[error("Frame submission error: {0}")]
    FrameSubmission(String),

    #[error("Invalid render state: {0}")]
    InvalidState(String),
}

/// 资源管理错误
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {path}")]
    NotFound { path: String },

    #[error("Failed to load asset: {path}, reason: {reason}")]
    LoadFailed { path: String, reason: String },

    #[error("Animation has no frames")]
    NoFrames,
}

/// 粒子结果类型别名
pub type ParticleResult<T> = Result<T, ParticleError>;
pub type RenderResult<T> = Result<T, RenderError>;
pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let asset_err = AssetError::NotFound {
            path: "spark.png".to_string(),
        };
        let particle_err: ParticleError = asset_err.into();
        assert!(matches!(particle_err, ParticleError::Animation(_)));

        let render_err: ParticleError = RenderError::UnknownTexture(7).into();
        assert!(matches!(render_err, ParticleError::Render(_)));
    }

    #[test]
    fn test_error_display() {
        let err = AssetError::NoFrames;
        assert_eq!(err.to_string(), "Animation has no frames");

        let err = RenderError::MismatchedBuffers {
            positions: 8,
            colors: 4,
            texcoords: 8,
        };
        assert_eq!(
            err.to_string(),
            "Quad batch buffers have mismatched lengths (positions: 8, colors: 4, texcoords: 8)"
        );
    }
}
