//! CUDA kernels and their launchers

mod cluster;
mod loader;

pub use cluster::{launch_centerline_group, launch_vector_radius};
