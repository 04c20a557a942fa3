//! Unique-and-compact: renumber node IDs into a dense local index space.
//!
//! The IDs in `unique_dst_ids` come first and keep their order, so the
//! destination nodes of a sampled layer occupy local indices `0..n`. Source
//! IDs not already seen are appended in first-occurrence order.

use crate::error::{Error, Result};
use rayon::prelude::*;
use std::collections::HashMap;

/// Output of [`unique_and_compact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactedIds {
    /// Original IDs, indexed by their local index.
    pub unique_ids: Vec<i64>,
    /// `src_ids` mapped to local indices.
    pub compacted_src: Vec<i64>,
    /// `dst_ids` mapped to local indices.
    pub compacted_dst: Vec<i64>,
}

/// Compact `src_ids` and `dst_ids` against `unique_dst_ids ++ src_ids`.
///
/// Every ID in `dst_ids` must appear in `unique_dst_ids` or `src_ids`;
/// otherwise this fails with [`Error::NodeNotFound`].
///
/// # Example
///
/// ```rust
/// use lattix_link::compact::unique_and_compact;
///
/// let out = unique_and_compact(&[9, 4, 7, 4], &[2, 7], &[7, 2]).unwrap();
/// assert_eq!(out.unique_ids, vec![7, 2, 9, 4]);
/// assert_eq!(out.compacted_src, vec![2, 3, 0, 3]);
/// assert_eq!(out.compacted_dst, vec![1, 0]);
/// ```
pub fn unique_and_compact(
    src_ids: &[i64],
    dst_ids: &[i64],
    unique_dst_ids: &[i64],
) -> Result<CompactedIds> {
    let mut id_map: HashMap<i64, i64> =
        HashMap::with_capacity(unique_dst_ids.len() + src_ids.len());
    let mut unique_ids = Vec::with_capacity(unique_dst_ids.len());

    for &id in unique_dst_ids.iter().chain(src_ids) {
        id_map.entry(id).or_insert_with(|| {
            unique_ids.push(id);
            (unique_ids.len() - 1) as i64
        });
    }

    let compacted_src = map_ids(&id_map, src_ids)?;
    let compacted_dst = map_ids(&id_map, dst_ids)?;

    Ok(CompactedIds {
        unique_ids,
        compacted_src,
        compacted_dst,
    })
}

/// Sorted unique IDs plus the index of each input ID within them.
///
/// Matches `unique(ids, return_inverse=True)` semantics.
pub fn unique_inverse(ids: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let mut unique = ids.to_vec();
    unique.par_sort_unstable();
    unique.dedup();
    let inverse = ids
        .par_iter()
        // `unique` holds every id, so the search always hits.
        .map(|id| match unique.binary_search(id) {
            Ok(rank) | Err(rank) => rank as i64,
        })
        .collect();
    (unique, inverse)
}

fn map_ids(id_map: &HashMap<i64, i64>, ids: &[i64]) -> Result<Vec<i64>> {
    ids.par_iter()
        .map(|id| id_map.get(id).copied().ok_or(Error::NodeNotFound(*id)))
        .collect()
}
