//! CPU kernels for centerline grouping.

use crate::dtype::Element;

/// Resolve a stored centerline mapping to a node index in `0..num_nodes`.
///
/// Non-integral, negative, non-finite or out-of-range values map to `None`.
#[inline]
pub fn centerline_node<T: Element>(value: T, num_nodes: usize) -> Option<usize> {
    let v = value.to_f64();
    if v >= 0.0 && v < num_nodes as f64 && v.fract() == 0.0 {
        Some(v as usize)
    } else {
        None
    }
}

/// Collect the points of `x[x_start..x_end]` whose centerline node is set in `mask_row`.
///
/// Candidates are scanned in ascending row order and matching global row
/// indices are appended to `out` until `max_neighbors` are found.
/// Returns `true` when the cap dropped at least one further match.
///
/// # Safety
///
/// - `x` must point to valid data of length at least `x_end`
/// - `mask_row` must point to `num_nodes` valid elements
#[inline]
pub unsafe fn centerline_group_query<T: Element>(
    x: *const T,
    mask_row: *const T,
    num_nodes: usize,
    x_start: usize,
    x_end: usize,
    max_neighbors: usize,
    out: &mut Vec<i64>,
) -> bool {
    let mask = unsafe { std::slice::from_raw_parts(mask_row, num_nodes) };
    let zero = T::zeroed();

    let in_group = |j: usize| {
        let value = unsafe { *x.add(j) };
        centerline_node(value, num_nodes).is_some_and(|node| mask[node] != zero)
    };

    let mut found = 0;
    for j in x_start..x_end {
        if in_group(j) {
            out.push(j as i64);
            found += 1;
            if found == max_neighbors {
                return (j + 1..x_end).any(&in_group);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centerline_node() {
        assert_eq!(centerline_node(2i64, 4), Some(2));
        assert_eq!(centerline_node(3.0f32, 4), Some(3));
        assert_eq!(centerline_node(4i32, 4), None);
        assert_eq!(centerline_node(-1i64, 4), None);
        assert_eq!(centerline_node(1.5f64, 4), None);
        assert_eq!(centerline_node(f64::NAN, 4), None);
    }

    #[test]
    fn test_query_matches_flagged_nodes() {
        let x: [i64; 6] = [0, 0, 1, 1, 2, 3];
        let mask: [i64; 4] = [1, 0, 1, 1];

        let mut out = Vec::new();
        let truncated =
            unsafe { centerline_group_query(x.as_ptr(), mask.as_ptr(), 4, 0, 6, 32, &mut out) };
        assert_eq!(out, vec![0, 1, 4, 5]);
        assert!(!truncated);
    }

    #[test]
    fn test_query_cap() {
        let x: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
        let mask: [f32; 1] = [1.0];

        let mut out = Vec::new();
        let truncated =
            unsafe { centerline_group_query(x.as_ptr(), mask.as_ptr(), 1, 1, 4, 2, &mut out) };
        assert_eq!(out, vec![1, 2]);
        assert!(truncated);
    }

    #[test]
    fn test_cap_reached_without_dropped_matches() {
        // Rows 2 and 3 map to an unflagged node and an out-of-range node
        let x: [i64; 4] = [0, 0, 1, 7];
        let mask: [i64; 2] = [1, 0];

        let mut out = Vec::new();
        let truncated =
            unsafe { centerline_group_query(x.as_ptr(), mask.as_ptr(), 2, 0, 4, 2, &mut out) };
        assert_eq!(out, vec![0, 1]);
        assert!(!truncated);
    }
}
