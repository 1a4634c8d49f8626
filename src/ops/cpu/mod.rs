//! CPU implementations of operation traits

mod cluster;
