// Backend parity tests for vector_radius
//
// Random segments against random points, flat and batched, with a cap low
// enough that some queries are truncated.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use topocluster::ops::{ClusterOps, NeighborOptions};
use topocluster::runtime::cpu::CpuRuntime;
use topocluster::tensor::Tensor;

use crate::common::{create_cpu_client, edge_list};
use crate::helpers::{to_cuda, with_cuda_backend};

#[test]
fn test_vector_radius_parity() {
    with_cuda_backend(|cuda_client, cuda_device| {
        let (cpu_client, cpu_device) = create_cpu_client();

        let mut rng = StdRng::seed_from_u64(3);
        let points: Vec<f32> = (0..400 * 3).map(|_| rng.random_range(-1.0..1.0)).collect();
        let segments: Vec<f32> = (0..60 * 6).map(|_| rng.random_range(-1.0..1.0)).collect();
        let batch_x: Vec<i64> = (0..400).map(|i| i / 100).collect();
        let batch_y: Vec<i64> = (0..60).map(|i| i / 15).collect();

        let x = Tensor::<CpuRuntime>::from_slice(&points, &[400, 3], &cpu_device);
        let y = Tensor::<CpuRuntime>::from_slice(&segments, &[60, 6], &cpu_device);
        let bx = Tensor::<CpuRuntime>::from_slice(&batch_x, &[400], &cpu_device);
        let by = Tensor::<CpuRuntime>::from_slice(&batch_y, &[60], &cpu_device);

        let options = NeighborOptions::default().with_max_num_neighbors(16);
        for batched in [false, true] {
            let (cbx, cby) = if batched { (Some(&bx), Some(&by)) } else { (None, None) };
            let cpu = cpu_client.vector_radius(&x, &y, 0.4, cbx, cby, options).unwrap();

            let gbx = cbx.map(|b| to_cuda(b, &cuda_device));
            let gby = cby.map(|b| to_cuda(b, &cuda_device));
            let gpu = cuda_client
                .vector_radius(
                    &to_cuda(&x, &cuda_device),
                    &to_cuda(&y, &cuda_device),
                    0.4,
                    gbx.as_ref(),
                    gby.as_ref(),
                    options,
                )
                .unwrap();

            assert_eq!(edge_list(&gpu), edge_list(&cpu), "batched = {batched}");
        }
    });
}

#[test]
fn test_vector_radius_parity_at_exact_cap() {
    with_cuda_backend(|cuda_client, cuda_device| {
        let (cpu_client, cpu_device) = create_cpu_client();

        // Two points inside, one far away: a cap of 2 keeps everything
        let x = Tensor::<CpuRuntime>::from_slice(
            &[0.0f64, 0.0, 0.5, 0.0, 100.0, 100.0],
            &[3, 2],
            &cpu_device,
        );
        let y =
            Tensor::<CpuRuntime>::from_slice(&[0.0f64, 0.0, 1.0, 0.0], &[1, 4], &cpu_device);

        let cpu = cpu_client.vector_radius_ptr(&x, &y, None, None, 1.0, 2, 1).unwrap();
        let gpu = cuda_client
            .vector_radius_ptr(
                &to_cuda(&x, &cuda_device),
                &to_cuda(&y, &cuda_device),
                None,
                None,
                1.0,
                2,
                1,
            )
            .unwrap();

        assert_eq!(edge_list(&cpu), vec![(0, 0), (0, 1)]);
        assert_eq!(edge_list(&gpu), edge_list(&cpu));
    });
}
