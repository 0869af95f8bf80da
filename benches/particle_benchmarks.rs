//! 粒子系统性能基准测试
//!
//! 测试粒子更新、顶点生成和管理器批量更新的性能

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec4};
use rpg_particles::render::backend::NullBackend;
use rpg_particles::render::particles::{
    EffectParameters, Keyframe, ParticleEmitter, ParticleSystem, ParticleSystemDef,
    ParticleSystemManager,
};
use std::hint::black_box;
use std::sync::Arc;

fn smoke_def(max_particles: usize) -> ParticleSystemDef {
    let emitter = ParticleEmitter::filled_circle(0.0, 0.0, 16.0)
        .with_speed(30.0, 10.0)
        .with_omnidirectional();
    let mut def = ParticleSystemDef::new(emitter, max_particles)
        .with_lifetime(1.5, 0.5)
        .with_wind(Vec2::new(5.0, -2.0))
        .with_damping(0.9)
        .with_wave_motion(0.5, 4.0)
        .with_radial_acceleration(-10.0, 6.0)
        .with_keyframes(vec![
            Keyframe::at(0.0).with_color(Vec4::new(0.8, 0.8, 0.8, 0.0)),
            Keyframe::at(0.2)
                .with_color(Vec4::new(0.7, 0.7, 0.7, 0.8))
                .with_size_variation(0.3, 0.3),
            Keyframe::at(1.0)
                .with_color(Vec4::new(0.5, 0.5, 0.5, 0.0))
                .with_size(2.0, 2.0),
        ]);
    def.rotation_used = true;
    def
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_update");
    let params = EffectParameters::new();

    for max_particles in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_particles),
            max_particles,
            |b, &count| {
                let mut backend = NullBackend::new();
                let mut system =
                    ParticleSystem::create(Arc::new(smoke_def(count)), &mut backend, Some(1))
                        .unwrap();
                system.update(0.5, &params);

                b.iter(|| {
                    system.update(black_box(1.0 / 60.0), &params);
                    black_box(system.num_particles())
                });
            },
        );
    }

    group.finish();
}

fn bench_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("particle_draw");
    let params = EffectParameters::new();

    for max_particles in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_particles),
            max_particles,
            |b, &count| {
                let mut backend = NullBackend::new();
                let mut system =
                    ParticleSystem::create(Arc::new(smoke_def(count)), &mut backend, Some(2))
                        .unwrap();
                system.update(0.5, &params);

                b.iter(|| {
                    backend.batches.clear();
                    system.draw(&mut backend).unwrap();
                    black_box(system.vertices().len())
                });
            },
        );
    }

    group.finish();
}

fn bench_manager(c: &mut Criterion) {
    let params = EffectParameters::new();

    c.bench_function("manager_update_32_systems", |b| {
        let mut backend = NullBackend::new();
        let mut manager = ParticleSystemManager::new(32);
        let def = Arc::new(smoke_def(256));
        for _ in 0..32 {
            manager.add_system(def.clone(), &mut backend).unwrap();
        }

        b.iter(|| {
            manager.update_all(black_box(1.0 / 60.0), &params, &mut backend);
            black_box(manager.total_particles())
        });
    });
}

criterion_group!(benches, bench_update, bench_draw, bench_manager);
criterion_main!(benches);
