//! CPU kernels for segment radius queries.

use crate::dtype::Element;
use num_traits::Float;

/// Squared Euclidean distance from point `p` to the closed segment `a -> b`.
///
/// The projection parameter is clamped to `[0, 1]`; a zero-length segment
/// degenerates to the distance from `p` to `a`.
#[inline]
pub fn point_segment_sqdist<T: Float>(p: &[T], a: &[T], b: &[T]) -> T {
    debug_assert!(p.len() == a.len() && a.len() == b.len());

    let mut seg_len2 = T::zero();
    let mut proj = T::zero();
    for k in 0..p.len() {
        let d = b[k] - a[k];
        seg_len2 = seg_len2 + d * d;
        proj = proj + (p[k] - a[k]) * d;
    }

    let t = if seg_len2 > T::zero() {
        (proj / seg_len2).max(T::zero()).min(T::one())
    } else {
        T::zero()
    };

    let mut dist2 = T::zero();
    for k in 0..p.len() {
        let closest = a[k] + t * (b[k] - a[k]);
        let diff = p[k] - closest;
        dist2 = dist2 + diff * diff;
    }
    dist2
}

/// Collect the points of `x[x_start..x_end]` strictly within `r` of one segment.
///
/// Candidates are scanned in ascending row order and matching global row
/// indices are appended to `out` until `max_neighbors` are found.
/// Returns `true` when the cap dropped at least one further match.
///
/// # Safety
///
/// - `x` must point to valid data of length at least `x_end * dim`
/// - `segment` must point to `2 * dim` valid elements (start, then end)
#[inline]
pub unsafe fn vector_radius_query<T: Element + Float>(
    x: *const T,
    segment: *const T,
    dim: usize,
    x_start: usize,
    x_end: usize,
    r2: T,
    max_neighbors: usize,
    out: &mut Vec<i64>,
) -> bool {
    let seg = unsafe { std::slice::from_raw_parts(segment, 2 * dim) };
    let (start, end) = seg.split_at(dim);

    let within = |j: usize| {
        let p = unsafe { std::slice::from_raw_parts(x.add(j * dim), dim) };
        point_segment_sqdist(p, start, end) < r2
    };

    let mut found = 0;
    for j in x_start..x_end {
        if within(j) {
            out.push(j as i64);
            found += 1;
            if found == max_neighbors {
                return (j + 1..x_end).any(&within);
            }
        }
    }
    false
}
