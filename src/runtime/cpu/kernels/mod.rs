//! CPU compute kernels
//!
//! Kernels work on raw pointers into contiguous storage and handle one query
//! row at a time. Batching, parallelism and output assembly live in
//! `ops::cpu`.

mod centerline;
mod radius;

pub use centerline::centerline_group_query;
pub use radius::vector_radius_query;
