//! Cache-blocked scalar kernel.
//!
//! The id universe is swept in tiles of [`RANGE_SIZE`] ids. For each tile
//! every participating list advances a cursor, bumping a dense byte counter
//! per id; an id is emitted at the exact moment its counter first exceeds the
//! threshold, so it comes out once and only once.

use crate::{max_doc_id, DocId};

/// Tile width of the scalar and 256-bit kernels, sized to sit in L1d.
pub const RANGE_SIZE: usize = 32768;

/// Appends every id occurring in strictly more than `threshold` of `lists`
/// to `out` (`out` is cleared first).
///
/// Lists must be strictly increasing and duplicate-free, and the query small
/// enough that no counter passes 255. Hits are ordered list-then-position
/// within a tile, tiles ascending.
pub fn scan_blocked(lists: &[&[DocId]], threshold: u8, out: &mut Vec<DocId>) {
    out.clear();
    let Some(max_id) = max_doc_id(lists) else {
        return;
    };
    // A count strictly above 255 is unreachable with byte counters.
    let Some(target) = threshold.checked_add(1) else {
        return;
    };

    let mut counters = vec![0u8; RANGE_SIZE];
    let mut cursors = vec![0usize; lists.len()];

    let mut start = 0u64;
    while start <= max_id as u64 {
        let tile_end = start + RANGE_SIZE as u64;
        counters.fill(0);
        for (list, cursor) in lists.iter().zip(cursors.iter_mut()) {
            if *cursor == list.len() {
                continue; // exhausted
            }
            let near_the_end = (list[list.len() - 1] as u64) < tile_end;
            *cursor = if near_the_end {
                final_check(&mut counters, list, *cursor, start, target, out)
            } else {
                main_check(&mut counters, list, *cursor, start, tile_end, target, out)
            };
        }
        start = tile_end;
    }
}

/// Consumes the rest of `list`; the whole suffix fits in the current tile.
fn final_check(
    counters: &mut [u8],
    list: &[DocId],
    it: usize,
    start: u64,
    target: u8,
    out: &mut Vec<DocId>,
) -> usize {
    for &val in &list[it..] {
        let c = &mut counters[(val as u64 - start) as usize];
        *c += 1;
        if *c == target {
            out.push(val);
        }
    }
    list.len()
}

/// Consumes elements below `tile_end`. The caller guarantees the list's last
/// element is >= `tile_end`, so the boundary test fails before the cursor can
/// leave the slice.
fn main_check(
    counters: &mut [u8],
    list: &[DocId],
    mut i: usize,
    start: u64,
    tile_end: u64,
    target: u8,
    out: &mut Vec<DocId>,
) -> usize {
    // Four increments per boundary test while the element three ahead is
    // still inside the tile.
    while i + 3 < list.len() && (list[i + 3] as u64) < tile_end {
        for &val in &list[i..i + 4] {
            let c = &mut counters[(val as u64 - start) as usize];
            *c += 1;
            if *c == target {
                out.push(val);
            }
        }
        i += 4;
    }
    while (list[i] as u64) < tile_end {
        let val = list[i];
        let c = &mut counters[(val as u64 - start) as usize];
        *c += 1;
        if *c == target {
            out.push(val);
        }
        i += 1;
    }
    i
}

/// Tile update without emission, for the variants that find hits in a
/// post-pass over the finished tile. Returns the new cursor.
pub(crate) fn update_tile(
    counters: &mut [u8],
    list: &[DocId],
    it: usize,
    start: u64,
    tile_end: u64,
) -> usize {
    if (list[list.len() - 1] as u64) < tile_end {
        for &val in &list[it..] {
            counters[(val as u64 - start) as usize] += 1;
        }
        return list.len();
    }
    let mut i = it;
    while i + 3 < list.len() && (list[i + 3] as u64) < tile_end {
        for &val in &list[i..i + 4] {
            counters[(val as u64 - start) as usize] += 1;
        }
        i += 4;
    }
    while (list[i] as u64) < tile_end {
        counters[(list[i] as u64 - start) as usize] += 1;
        i += 1;
    }
    i
}

/// Scalar hit scan over a finished tile, ascending within the tile.
pub(crate) fn populate_hits_scalar(
    counters: &[u8],
    threshold: u8,
    start: u64,
    out: &mut Vec<DocId>,
) {
    for (i, &c) in counters.iter().enumerate() {
        if c > threshold {
            out.push((start + i as u64) as DocId);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lists: &[&[DocId]], threshold: u8) -> Vec<DocId> {
        let mut out = Vec::new();
        scan_blocked(lists, threshold, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn small_overlap() {
        let lists: [&[DocId]; 3] = [&[1, 2, 3], &[2, 3, 4], &[3, 4, 5]];
        assert_eq!(scan(&lists, 1), vec![2, 3, 4]);
        assert_eq!(scan(&lists, 2), vec![3]);
        assert_eq!(scan(&lists, 3), vec![]);
    }

    #[test]
    fn id_straddling_tiles_counted_once() {
        let lists: [&[DocId]; 2] = [&[0, 100_000], &[100_000, 200_000]];
        assert_eq!(scan(&lists, 0), vec![0, 100_000, 200_000]);
        assert_eq!(scan(&lists, 1), vec![100_000]);
    }

    #[test]
    fn ids_on_the_tile_boundary() {
        let r = RANGE_SIZE as DocId;
        let lists: [&[DocId]; 2] = [&[r - 1, r], &[r - 1, r]];
        assert_eq!(scan(&lists, 1), vec![r - 1, r]);
    }

    #[test]
    fn same_list_twice() {
        let ids: Vec<DocId> = (0..100).collect();
        let lists = [ids.as_slice(), ids.as_slice()];
        assert_eq!(scan(&lists, 1), vec![]);
        assert_eq!(scan(&lists, 0), ids);
    }

    #[test]
    fn single_id_in_many_lists() {
        let one = [42];
        let lists: Vec<&[DocId]> = (0..100).map(|_| &one[..]).collect();
        assert_eq!(scan(&lists, 50), vec![42]);
        assert_eq!(scan(&lists, 100), vec![]);
    }

    #[test]
    fn single_list_identity() {
        let ids: Vec<DocId> = vec![3, 70_000, 70_001, 1_000_000];
        let lists = [ids.as_slice()];
        assert_eq!(scan(&lists, 0), ids);
    }

    #[test]
    fn no_lists() {
        assert_eq!(scan(&[], 0), vec![]);
    }

    #[test]
    fn empty_lists_are_skipped() {
        let lists: [&[DocId]; 3] = [&[], &[7], &[]];
        assert_eq!(scan(&lists, 0), vec![7]);
        assert_eq!(scan(&lists, 1), vec![]);
    }

    #[test]
    fn universe_of_a_single_id() {
        let lists: [&[DocId]; 1] = [&[0]];
        assert_eq!(scan(&lists, 0), vec![0]);
    }

    #[test]
    fn saturated_threshold_is_empty() {
        let lists: [&[DocId]; 1] = [&[1, 2, 3]];
        assert_eq!(scan(&lists, u8::MAX), vec![]);
    }

    #[test]
    fn emits_at_the_crossing_increment() {
        // With t = 1 the crossing happens while the second list runs, so the
        // raw order is already ascending here.
        let lists: [&[DocId]; 2] = [&[5, 9], &[5, 9]];
        let mut out = Vec::new();
        scan_blocked(&lists, 1, &mut out);
        assert_eq!(out, vec![5, 9]);
    }
}
