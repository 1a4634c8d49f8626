//! CUDA implementations of operation traits

mod cluster;
