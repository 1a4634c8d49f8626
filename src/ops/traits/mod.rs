//! Operation traits implemented by each backend client

mod cluster;

pub use cluster::{ClusterOps, NeighborOptions};
