//! Range-end index: per-list cursor tables, one entry per tile.
//!
//! `table[i]` is the count of list elements whose value fits into tiles
//! `0..=i`, which is exactly the exclusive cursor bound the 512-bit kernel
//! needs when it processes tile `i`.

use crate::{max_doc_id, DocId, Error, Result};

/// Walks `list` once and records, for every tile `[s, s + range_size)` up to
/// `max_id`, how many elements are <= the tile's last id. The table has
/// `ceil((max_id + 1) / range_size)` entries and is non-decreasing; its last
/// entry equals `list.len()` when `max_id` is the list-wide maximum.
pub fn build_range_ends(max_id: DocId, range_size: usize, list: &[DocId]) -> Result<Vec<u32>> {
    if range_size == 0 {
        return Err(Error::BadRangeSize);
    }
    let tiles = (max_id as u64 / range_size as u64 + 1) as usize;
    let mut ends = Vec::with_capacity(tiles);
    let mut end = 0usize;

    let mut start = 0u64;
    while start <= max_id as u64 {
        let curr_max = (max_id as u64).min(start + range_size as u64 - 1);
        while end < list.len() && list[end] as u64 <= curr_max {
            end += 1;
        }
        ends.push(end as u32);
        start += range_size as u64;
    }
    Ok(ends)
}

/// Builds the table for every list against the shared global maximum, so all
/// tables come out the same length, the shape the 512-bit kernel requires.
pub fn build_all_range_ends(lists: &[&[DocId]], range_size: usize) -> Result<Vec<Vec<u32>>> {
    let max_id = max_doc_id(lists).unwrap_or(0);
    lists
        .iter()
        .map(|list| build_range_ends(max_id, range_size, list))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_the_whole_list() {
        let list: Vec<DocId> = vec![1, 99, 100, 250, 901];
        let ends = build_range_ends(901, 100, &list).unwrap();
        assert_eq!(ends, vec![2, 3, 4, 4, 4, 4, 4, 4, 4, 5]);
        assert_eq!(*ends.last().unwrap() as usize, list.len());
    }

    #[test]
    fn boundary_values_land_in_the_lower_tile() {
        let list: Vec<DocId> = vec![99, 100];
        let ends = build_range_ends(100, 100, &list).unwrap();
        assert_eq!(ends, vec![1, 2]);
    }

    #[test]
    fn zero_range_size_is_rejected() {
        assert!(matches!(
            build_range_ends(10, 0, &[1, 2]),
            Err(Error::BadRangeSize)
        ));
    }

    #[test]
    fn tables_share_a_length() {
        let a: Vec<DocId> = vec![5];
        let b: Vec<DocId> = vec![1, 450];
        let tables = build_all_range_ends(&[&a, &b], 100).unwrap();
        assert_eq!(tables[0].len(), 5);
        assert_eq!(tables[1].len(), 5);
        assert_eq!(tables[0], vec![1, 1, 1, 1, 1]);
        assert_eq!(tables[1], vec![1, 1, 1, 1, 2]);
    }

    #[test]
    fn empty_list_yields_zeros() {
        let ends = build_range_ends(250, 100, &[]).unwrap();
        assert_eq!(ends, vec![0, 0, 0]);
    }

    #[test]
    fn no_lists_at_all() {
        assert!(build_all_range_ends(&[], 100).unwrap().is_empty());
    }
}
