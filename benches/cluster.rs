#![allow(dead_code)]

use fluxbench::{Bencher, flux};
use std::hint::black_box;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use topocluster::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn uniform(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
}

fn radius_inputs(
    points: usize,
    segments: usize,
    device: &CpuDevice,
) -> (Tensor<CpuRuntime>, Tensor<CpuRuntime>) {
    let x = Tensor::from_slice(&uniform(points * 3, 1), &[points, 3], device);
    let y = Tensor::from_slice(&uniform(segments * 6, 2), &[segments, 6], device);
    (x, y)
}

fn centerline_inputs(
    points: usize,
    groups: usize,
    nodes: usize,
    device: &CpuDevice,
) -> (Tensor<CpuRuntime>, Tensor<CpuRuntime>) {
    let mut rng = StdRng::seed_from_u64(3);
    let mapping: Vec<i64> = (0..points).map(|_| rng.random_range(0..nodes as i64)).collect();
    let masks: Vec<i64> = (0..groups * nodes).map(|_| rng.random_range(0..2)).collect();
    let x = Tensor::from_slice(&mapping, &[points, 1], device);
    let y = Tensor::from_slice(&masks, &[groups, nodes], device);
    (x, y)
}

// ---------------------------------------------------------------------------
// Group 1: vector_radius worker scaling (10k points, 1k segments)
// ---------------------------------------------------------------------------

fn bench_radius(b: &mut Bencher, workers: usize) {
    let device = CpuDevice::new();
    let client = CpuClient::new(device.clone());
    let (x, y) = radius_inputs(10_000, 1_000, &device);
    let options = NeighborOptions::default().with_num_workers(workers);
    b.iter(|| black_box(client.vector_radius(&x, &y, 0.1, None, None, options).unwrap()));
}

#[flux::bench(group = "vector_radius_workers")]
fn vector_radius_1worker(b: &mut Bencher) {
    bench_radius(b, 1);
}

#[flux::bench(group = "vector_radius_workers")]
fn vector_radius_4workers(b: &mut Bencher) {
    bench_radius(b, 4);
}

#[flux::bench(group = "vector_radius_workers")]
fn vector_radius_8workers(b: &mut Bencher) {
    bench_radius(b, 8);
}

// ---------------------------------------------------------------------------
// Group 2: vector_radius batched (8 examples)
// ---------------------------------------------------------------------------

#[flux::bench(group = "vector_radius_batched")]
fn vector_radius_batched_8(b: &mut Bencher) {
    let device = CpuDevice::new();
    let client = CpuClient::new(device.clone());
    let (x, y) = radius_inputs(10_000, 1_000, &device);
    let bx: Vec<i64> = (0..10_000).map(|i| i / 1_250).collect();
    let by: Vec<i64> = (0..1_000).map(|i| i / 125).collect();
    let bx = Tensor::<CpuRuntime>::from_slice(&bx, &[10_000], &device);
    let by = Tensor::<CpuRuntime>::from_slice(&by, &[1_000], &device);
    let options = NeighborOptions::default();
    b.iter(|| {
        black_box(
            client
                .vector_radius(&x, &y, 0.1, Some(&bx), Some(&by), options)
                .unwrap(),
        )
    });
}

// ---------------------------------------------------------------------------
// Group 3: centerline_group worker scaling (20k points, 500 groups, 64 nodes)
// ---------------------------------------------------------------------------

fn bench_centerline(b: &mut Bencher, workers: usize) {
    let device = CpuDevice::new();
    let client = CpuClient::new(device.clone());
    let (x, y) = centerline_inputs(20_000, 500, 64, &device);
    let options = NeighborOptions::default().with_num_workers(workers);
    b.iter(|| black_box(client.centerline_group(&x, &y, None, None, options).unwrap()));
}

#[flux::bench(group = "centerline_group_workers")]
fn centerline_group_1worker(b: &mut Bencher) {
    bench_centerline(b, 1);
}

#[flux::bench(group = "centerline_group_workers")]
fn centerline_group_4workers(b: &mut Bencher) {
    bench_centerline(b, 4);
}

// ---------------------------------------------------------------------------
// Group 4: registry overhead on a small call
// ---------------------------------------------------------------------------

#[flux::bench(group = "registry")]
fn registry_centerline_small(b: &mut Bencher) {
    let registry = OperatorRegistry::with_cluster_ops().unwrap();
    let x = HostTensor::from_slice(&[0i64, 1, 2, 3], &[4, 1], Placement::Cpu).unwrap();
    let y = HostTensor::from_slice(&[1i64, 0, 1, 0], &[1, 4], Placement::Cpu).unwrap();
    let args = [
        IValue::Tensor(x),
        IValue::Tensor(y),
        IValue::None,
        IValue::None,
        IValue::Int(32),
        IValue::Int(1),
    ];
    b.iter(|| black_box(registry.call("topocluster::centerline_group", &args).unwrap()));
}

fn main() {
    fluxbench::run().unwrap();
}
