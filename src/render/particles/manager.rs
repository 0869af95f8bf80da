//! 粒子系统管理器
//!
//! 管理多个粒子系统，提供统一的更新和渲染接口。
//! 死亡的系统在更新时自动销毁并移除。

use super::definition::ParticleSystemDef;
use super::system::{EffectParameters, ParticleSystem};
use crate::config::ParticleConfig;
use crate::core::error::{ParticleError, ParticleResult, RenderResult};
use crate::render::backend::RenderBackend;
use std::sync::Arc;

/// 粒子系统ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(u64);

impl SystemId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// 粒子系统管理器
///
/// 系统按添加顺序更新和绘制。
#[derive(Debug)]
pub struct ParticleSystemManager {
    /// 粒子系统列表
    systems: Vec<(SystemId, ParticleSystem)>,
    /// 运行时配置
    config: ParticleConfig,
    next_id: u64,
}

impl ParticleSystemManager {
    /// 创建新的粒子系统管理器
    ///
    /// # 参数
    ///
    /// * `max_systems` - 最大系统数
    pub fn new(max_systems: usize) -> Self {
        Self::with_config(ParticleConfig {
            max_systems,
            ..Default::default()
        })
    }

    /// 从配置创建管理器
    pub fn with_config(config: ParticleConfig) -> Self {
        Self {
            systems: Vec::with_capacity(config.max_systems),
            config,
            next_id: 0,
        }
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// 添加粒子系统
    ///
    /// 先完整验证定义，再创建实例。配置了种子时每个系统使用
    /// `seed + id` 作为自己的种子，保证结果可复现。
    ///
    /// # 错误
    ///
    /// - 已达到最大系统数时返回 `LimitReached`
    /// - 定义无效或加载动画失败时返回对应错误
    pub fn add_system(
        &mut self,
        def: Arc<ParticleSystemDef>,
        backend: &mut dyn RenderBackend,
    ) -> ParticleResult<SystemId> {
        if self.systems.len() >= self.config.max_systems {
            tracing::warn!(
                target: "particles",
                max_systems = self.config.max_systems,
                "Particle system limit reached"
            );
            return Err(ParticleError::LimitReached(self.config.max_systems));
        }

        def.validate()?;

        let id = SystemId(self.next_id);
        let seed = self.config.seed.map(|seed| seed.wrapping_add(id.0));
        let system = ParticleSystem::create(def, backend, seed)?;
        self.next_id += 1;
        self.systems.push((id, system));
        Ok(id)
    }

    /// 获取粒子系统
    pub fn get_system(&self, id: SystemId) -> Option<&ParticleSystem> {
        self.systems
            .iter()
            .find(|(system_id, _)| *system_id == id)
            .map(|(_, system)| system)
    }

    /// 获取粒子系统（可变引用）
    pub fn get_system_mut(&mut self, id: SystemId) -> Option<&mut ParticleSystem> {
        self.systems
            .iter_mut()
            .find(|(system_id, _)| *system_id == id)
            .map(|(_, system)| system)
    }

    /// 更新所有粒子系统
    ///
    /// 帧时间先按配置上限截断；更新后已死亡的系统被销毁并移除。
    pub fn update_all(
        &mut self,
        frame_time: f32,
        params: &EffectParameters,
        backend: &mut dyn RenderBackend,
    ) {
        if !self.config.enabled {
            return;
        }

        let frame_time = self.config.clamp_frame_time(frame_time);
        for (_, system) in &mut self.systems {
            system.update(frame_time, params);
        }

        let (alive, dead): (Vec<_>, Vec<_>) = std::mem::take(&mut self.systems)
            .into_iter()
            .partition(|(_, system)| system.is_alive());
        self.systems = alive;
        for (id, system) in dead {
            tracing::trace!(target: "particles", id = id.0, "Removing finished particle system");
            system.destroy(backend);
        }
    }

    /// 绘制所有粒子系统
    ///
    /// 遇到第一个后端错误即返回。
    pub fn draw_all(&mut self, backend: &mut dyn RenderBackend) -> RenderResult<()> {
        if !self.config.enabled {
            return Ok(());
        }
        for (_, system) in &mut self.systems {
            system.draw(backend)?;
        }
        Ok(())
    }

    /// 停止所有系统的发射
    pub fn stop_all(&mut self) {
        for (_, system) in &mut self.systems {
            system.stop();
        }
    }

    /// 获取系统数量
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// 所有系统的存活粒子总数
    pub fn total_particles(&self) -> usize {
        self.systems
            .iter()
            .map(|(_, system)| system.num_particles())
            .sum()
    }

    /// 移除并销毁系统
    ///
    /// 如果成功移除返回`true`，否则返回`false`。
    pub fn remove_system(&mut self, id: SystemId, backend: &mut dyn RenderBackend) -> bool {
        match self.systems.iter().position(|(system_id, _)| *system_id == id) {
            Some(index) => {
                let (_, system) = self.systems.remove(index);
                system.destroy(backend);
                true
            }
            None => false,
        }
    }

    /// 清空所有系统
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for (_, system) in self.systems.drain(..) {
            system.destroy(backend);
        }
    }
}

impl Default for ParticleSystemManager {
    fn default() -> Self {
        Self::with_config(ParticleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::NullBackend;
    use crate::render::particles::emitter::{EmitterMode, ParticleEmitter};
    use crate::render::particles::keyframe::Keyframe;

    fn burst_def(max: usize) -> Arc<ParticleSystemDef> {
        let emitter = ParticleEmitter::point(0.0, 0.0).with_mode(EmitterMode::Burst);
        Arc::new(ParticleSystemDef::new(emitter, max).with_lifetime(0.5, 0.0))
    }

    #[test]
    fn test_particle_system_manager() {
        let manager = ParticleSystemManager::new(10);
        assert_eq!(manager.system_count(), 0);
        assert_eq!(manager.config().max_systems, 10);
        assert_eq!(manager.total_particles(), 0);
    }

    #[test]
    fn test_limit_reached() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::new(1);
        manager.add_system(burst_def(4), &mut backend).unwrap();
        assert!(matches!(
            manager.add_system(burst_def(4), &mut backend),
            Err(ParticleError::LimitReached(1))
        ));
    }

    #[test]
    fn test_add_system_validates_definition() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::default();
        let def = ParticleSystemDef::default()
            .with_keyframes(vec![Keyframe::at(0.0), Keyframe::at(0.0)]);
        assert!(matches!(
            manager.add_system(Arc::new(def), &mut backend),
            Err(ParticleError::InvalidDefinition(_))
        ));
        assert_eq!(manager.system_count(), 0);
    }

    #[test]
    fn test_add_system_rejects_negative_damping() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::default();
        let mut def = ParticleSystemDef::default().with_damping(0.2);
        def.damping_variation = 0.3;
        assert!(manager.add_system(Arc::new(def), &mut backend).is_err());
        assert_eq!(manager.system_count(), 0);
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn test_finished_systems_are_removed() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::default();
        let id = manager.add_system(burst_def(8), &mut backend).unwrap();
        let params = EffectParameters::new();

        manager.update_all(0.1, &params, &mut backend);
        assert_eq!(manager.total_particles(), 8);
        assert!(manager.get_system(id).is_some_and(|s| s.is_stopped()));

        manager.update_all(1.0, &params, &mut backend);
        assert_eq!(manager.system_count(), 0);
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn test_max_frame_time_clamp() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::with_config(ParticleConfig {
            max_frame_time: Some(0.1),
            ..Default::default()
        });
        let id = manager
            .add_system(Arc::new(ParticleSystemDef::default()), &mut backend)
            .unwrap();
        manager.update_all(5.0, &EffectParameters::new(), &mut backend);
        let age = manager.get_system(id).map(|s| s.age()).unwrap();
        assert!((age - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_draw_all_and_remove() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::default();
        let a = manager.add_system(burst_def(2), &mut backend).unwrap();
        manager.add_system(burst_def(3), &mut backend).unwrap();
        manager.update_all(0.0, &EffectParameters::new(), &mut backend);
        manager.draw_all(&mut backend).unwrap();
        assert_eq!(backend.draw_calls(), 2);

        assert!(manager.remove_system(a, &mut backend));
        assert!(!manager.remove_system(a, &mut backend));
        assert_eq!(manager.system_count(), 1);

        manager.clear(&mut backend);
        assert_eq!(backend.live_texture_count(), 0);
    }

    #[test]
    fn test_disabled_config_is_noop() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::with_config(ParticleConfig {
            enabled: false,
            ..Default::default()
        });
        let id = manager
            .add_system(Arc::new(ParticleSystemDef::default()), &mut backend)
            .unwrap();
        manager.update_all(0.1, &EffectParameters::new(), &mut backend);
        manager.draw_all(&mut backend).unwrap();
        assert_eq!(manager.get_system(id).map(|s| s.age()), Some(0.0));
        assert_eq!(backend.draw_calls(), 0);
    }

    #[test]
    fn test_stop_all() {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::default();
        let id = manager
            .add_system(Arc::new(ParticleSystemDef::default()), &mut backend)
            .unwrap();
        manager.stop_all();
        assert!(manager.get_system(id).is_some_and(|s| s.is_stopped()));
    }

    #[test]
    fn test_seeded_systems_are_reproducible() {
        let def = Arc::new(
            ParticleSystemDef::new(
                ParticleEmitter::filled_circle(0.0, 0.0, 10.0),
                16,
            ),
        );
        let config = ParticleConfig {
            seed: Some(7),
            ..Default::default()
        };
        let positions = |manager: &mut ParticleSystemManager, backend: &mut NullBackend| {
            let id = manager.add_system(def.clone(), backend).unwrap();
            manager.update_all(0.0, &EffectParameters::new(), backend);
            manager
                .get_system(id)
                .map(|s| s.particles().iter().map(|p| p.position).collect::<Vec<_>>())
                .unwrap()
        };

        let mut backend = NullBackend::new();
        let first = positions(&mut ParticleSystemManager::with_config(config.clone()), &mut backend);
        let second = positions(&mut ParticleSystemManager::with_config(config), &mut backend);
        assert_eq!(first, second);
    }
}
