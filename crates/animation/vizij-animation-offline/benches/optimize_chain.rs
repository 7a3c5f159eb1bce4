//! Benchmarks for hierarchical keyframe decimation.
//!
//! Run with: cargo bench -p vizij-animation-offline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use vizij_animation_offline::{
    AnimationConstantOptimizer, AnimationOptimizer, JointTrack, Keyframe, RawAnimation, Skeleton,
};

const SAMPLES: usize = 121;

/// A single chain of `joints` bones, each swinging around z at its own phase.
fn swinging_chain(joints: usize) -> (Skeleton, RawAnimation) {
    let parents: Vec<Option<usize>> = (0..joints).map(|i| i.checked_sub(1)).collect();
    let skeleton = Skeleton::from_parents(&parents).expect("chain skeleton");

    let duration = 2.0f32;
    let step = duration / (SAMPLES - 1) as f32;
    let tracks = (0..joints)
        .map(|joint| {
            let phase = joint as f32 * 0.3;
            JointTrack {
                translations: (0..SAMPLES)
                    .map(|i| Keyframe::new(i as f32 * step, [0.0, 0.2, 0.0]))
                    .collect(),
                rotations: (0..SAMPLES)
                    .map(|i| {
                        let t = i as f32 * step;
                        let half = 0.25 * (std::f32::consts::PI * t + phase).sin();
                        Keyframe::new(t, [0.0, 0.0, half.sin(), half.cos()])
                    })
                    .collect(),
                scales: vec![Keyframe::new(0.0, [1.0, 1.0, 1.0])],
            }
        })
        .collect();

    let animation = RawAnimation {
        name: format!("chain-{joints}"),
        duration,
        tracks,
    };
    (skeleton, animation)
}

fn bench_hierarchical(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimize_chain");
    for joints in [8usize, 32, 128] {
        let (skeleton, animation) = swinging_chain(joints);
        let optimizer = AnimationOptimizer::default();
        group.throughput(Throughput::Elements(animation.num_keys() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(joints), &joints, |b, _| {
            let mut output = RawAnimation::default();
            b.iter(|| {
                optimizer
                    .optimize(black_box(&animation), &skeleton, &mut output)
                    .expect("optimize")
            });
        });
    }
    group.finish();
}

fn bench_constant(c: &mut Criterion) {
    let (_, animation) = swinging_chain(128);
    let optimizer = AnimationConstantOptimizer::default();
    c.bench_function("strip_constant_chain_128", |b| {
        let mut output = RawAnimation::default();
        b.iter(|| {
            optimizer
                .optimize(black_box(&animation), &mut output)
                .expect("strip")
        });
    });
}

criterion_group!(benches, bench_hierarchical, bench_constant);
criterion_main!(benches);
