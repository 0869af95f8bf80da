//! 渲染后端抽象
//!
//! 粒子引擎只通过 [`RenderBackend`] 与真正的图形 API 交互：
//! 加载/释放动画帧纹理、绑定纹理、提交一次批量四边形绘制、查询场景光照。
//!
//! ## 设计目标
//!
//! - 后端以 `&mut dyn RenderBackend` 显式传入，不依赖全局单例
//! - 一个粒子系统每帧只提交一次批量绘制（平滑动画时两次）
//! - 易于测试：[`NullBackend`] 记录所有调用

use crate::core::error::{AssetError, AssetResult, RenderError, RenderResult};
use glam::Vec4;
use std::collections::HashSet;

/// 抽象纹理句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// 纹理区域
///
/// 一帧动画在纹理中的位置和未缩放时的像素尺寸。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureRegion {
    pub texture: TextureHandle,
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
    /// 自然宽度（像素）
    pub width: f32,
    /// 自然高度（像素）
    pub height: f32,
}

impl TextureRegion {
    /// 覆盖整张纹理的区域
    pub fn full(texture: TextureHandle, width: f32, height: f32) -> Self {
        Self {
            texture,
            u1: 0.0,
            v1: 0.0,
            u2: 1.0,
            v2: 1.0,
            width,
            height,
        }
    }

    /// 四个顶点的纹理坐标（左上、右上、右下、左下）
    pub fn corner_texcoords(&self) -> [[f32; 2]; 4] {
        [
            [self.u1, self.v1],
            [self.u2, self.v1],
            [self.u2, self.v2],
            [self.u1, self.v2],
        ]
    }
}

/// 混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// 不混合
    None,
    /// Alpha 混合
    #[default]
    Alpha,
    /// 加法混合
    Additive,
}

/// 模板写入操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilOp {
    Increment,
    Decrement,
    Zero,
    Replace,
}

/// 模板状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StencilState {
    /// 不使用模板
    #[default]
    Disabled,
    /// 只绘制模板缓冲通过的像素
    Test,
    /// 写入模板缓冲
    Write(StencilOp),
}

/// 一次批量四边形绘制
///
/// 三个扁平数组并行排列，每个四边形占 4 个顶点。
#[derive(Debug, Clone, Copy)]
pub struct QuadBatch<'a> {
    pub positions: &'a [[f32; 2]],
    pub colors: &'a [[f32; 4]],
    pub texcoords: &'a [[f32; 2]],
    pub quad_count: usize,
    pub blend: BlendMode,
    pub stencil: StencilState,
}

impl<'a> QuadBatch<'a> {
    /// 检查三个数组长度与四边形数量一致
    pub fn validate(&self) -> RenderResult<()> {
        let expected = self.quad_count * 4;
        if self.positions.len() != expected
            || self.colors.len() != expected
            || self.texcoords.len() != expected
        {
            return Err(RenderError::MismatchedBuffers {
                positions: self.positions.len(),
                colors: self.colors.len(),
                texcoords: self.texcoords.len(),
            });
        }
        Ok(())
    }

    /// 以字节视图访问顶点数据，供需要上传原始字节的后端使用
    pub fn position_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.positions)
    }

    pub fn color_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.colors)
    }

    pub fn texcoord_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.texcoords)
    }
}

/// 渲染后端 Trait
///
/// 定义粒子引擎需要的全部后端能力。
///
/// # 示例
///
/// ```ignore
/// struct GlBackend { ... }
///
/// impl RenderBackend for GlBackend {
///     fn load_texture(&mut self, name: &str) -> AssetResult<TextureRegion> { ... }
///     fn submit_quad_batch(&mut self, batch: &QuadBatch<'_>) -> RenderResult<()> { ... }
///     ...
/// }
/// ```
pub trait RenderBackend {
    /// 加载一帧动画图像
    fn load_texture(&mut self, name: &str) -> AssetResult<TextureRegion>;

    /// 释放纹理
    fn release_texture(&mut self, texture: TextureHandle);

    /// 绑定纹理
    fn bind_texture(&mut self, texture: TextureHandle) -> RenderResult<()>;

    /// 提交批量四边形
    fn submit_quad_batch(&mut self, batch: &QuadBatch<'_>) -> RenderResult<()>;

    /// 场景环境光颜色
    fn scene_lighting_color(&self) -> Vec4;

    /// 获取后端名称
    fn name(&self) -> &str;
}

/// 已提交批次的记录
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedBatch {
    pub texture: Option<TextureHandle>,
    pub quad_count: usize,
    pub blend: BlendMode,
    pub stencil: StencilState,
    pub bytes: usize,
    /// 第一个顶点的颜色（如果有）
    pub first_color: Option<[f32; 4]>,
}

/// 空后端实现（用于测试）
///
/// 不做任何真实绘制，只记录调用。
#[derive(Debug)]
pub struct NullBackend {
    next_texture_id: u64,
    live_textures: HashSet<u64>,
    bound_texture: Option<TextureHandle>,
    /// 每帧图像的自然尺寸
    pub frame_size: (f32, f32),
    /// 场景环境光
    pub lighting: Vec4,
    /// 名称在此列表中的纹理加载失败
    pub missing: Vec<String>,
    /// 已提交的批次
    pub batches: Vec<SubmittedBatch>,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self {
            next_texture_id: 1,
            live_textures: HashSet::new(),
            bound_texture: None,
            frame_size: (16.0, 16.0),
            lighting: Vec4::ONE,
            missing: Vec::new(),
            batches: Vec::new(),
        }
    }
}

impl NullBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前仍被持有的纹理数
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    /// 绘制调用次数
    pub fn draw_calls(&self) -> usize {
        self.batches.len()
    }
}

impl RenderBackend for NullBackend {
    fn load_texture(&mut self, name: &str) -> AssetResult<TextureRegion> {
        if self.missing.iter().any(|m| m == name) {
            return Err(AssetError::NotFound {
                path: name.to_string(),
            });
        }
        let id = self.next_texture_id;
        self.next_texture_id += 1;
        self.live_textures.insert(id);
        let (width, height) = self.frame_size;
        Ok(TextureRegion::full(TextureHandle(id), width, height))
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        self.live_textures.remove(&texture.0);
    }

    fn bind_texture(&mut self, texture: TextureHandle) -> RenderResult<()> {
        if !self.live_textures.contains(&texture.0) {
            return Err(RenderError::UnknownTexture(texture.0));
        }
        self.bound_texture = Some(texture);
        Ok(())
    }

    fn submit_quad_batch(&mut self, batch: &QuadBatch<'_>) -> RenderResult<()> {
        batch.validate()?;
        self.batches.push(SubmittedBatch {
            texture: self.bound_texture,
            quad_count: batch.quad_count,
            blend: batch.blend,
            stencil: batch.stencil,
            bytes: batch.position_bytes().len()
                + batch.color_bytes().len()
                + batch.texcoord_bytes().len(),
            first_color: batch.colors.first().copied(),
        });
        Ok(())
    }

    fn scene_lighting_color(&self) -> Vec4 {
        self.lighting
    }

    fn name(&self) -> &str {
        "null"
    }
}
