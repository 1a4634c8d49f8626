// Backend parity tests for centerline_group
//
// Random node mappings (including out-of-range values) against random masks,
// with ptr offsets that leave one example without points.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use topocluster::ops::ClusterOps;
use topocluster::runtime::cpu::CpuRuntime;
use topocluster::tensor::Tensor;

use crate::common::{create_cpu_client, edge_list};
use crate::helpers::{to_cuda, with_cuda_backend};

#[test]
fn test_centerline_group_parity() {
    with_cuda_backend(|cuda_client, cuda_device| {
        let (cpu_client, cpu_device) = create_cpu_client();

        let mut rng = StdRng::seed_from_u64(5);
        let mapping: Vec<i64> = (0..300).map(|_| rng.random_range(-1..9)).collect();
        let masks: Vec<i64> = (0..40 * 8).map(|_| rng.random_range(0..2)).collect();
        let ptr_x = [0i64, 120, 120, 300];
        let ptr_y = [0i64, 10, 25, 40];

        let x = Tensor::<CpuRuntime>::from_slice(&mapping, &[300, 1], &cpu_device);
        let y = Tensor::<CpuRuntime>::from_slice(&masks, &[40, 8], &cpu_device);
        let px = Tensor::<CpuRuntime>::from_slice(&ptr_x, &[4], &cpu_device);
        let py = Tensor::<CpuRuntime>::from_slice(&ptr_y, &[4], &cpu_device);

        let cpu = cpu_client
            .centerline_group_ptr(&x, &y, Some(&px), Some(&py), 8, 1)
            .unwrap();
        let gpu = cuda_client
            .centerline_group_ptr(
                &to_cuda(&x, &cuda_device),
                &to_cuda(&y, &cuda_device),
                Some(&to_cuda(&px, &cuda_device)),
                Some(&to_cuda(&py, &cuda_device)),
                8,
                1,
            )
            .unwrap();

        assert_eq!(edge_list(&gpu), edge_list(&cpu));
    });
}
