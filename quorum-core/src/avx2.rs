//! 256-bit blocked kernel: scalar counter updates, vectorized hit scan.
//!
//! Counter increments stay scalar; once every list has finished a tile, the
//! tile is scanned 32 bytes at a time with a byte compare against the
//! threshold and the resulting bitmask is drained by trailing-zero counts.
//! The hit set matches [`scan_blocked`](crate::scan_blocked) exactly, only
//! the intra-tile order differs (the post-pass emits ascending).

use crate::scalar::{populate_hits_scalar, update_tile, RANGE_SIZE};
use crate::{has_avx2, max_doc_id, DocId};

/// Blocked scan with an AVX2 hit scan; falls back to the scalar post-pass
/// (same output order) when AVX2 is missing.
pub fn scan_blocked_256(lists: &[&[DocId]], threshold: u8, out: &mut Vec<DocId>) {
    out.clear();
    let Some(max_id) = max_doc_id(lists) else {
        return;
    };
    if threshold == u8::MAX {
        return;
    }
    let wide = has_avx2();

    let mut counters = vec![0u8; RANGE_SIZE];
    let mut cursors = vec![0usize; lists.len()];

    let mut start = 0u64;
    while start <= max_id as u64 {
        let tile_end = start + RANGE_SIZE as u64;
        counters.fill(0);
        for (list, cursor) in lists.iter().zip(cursors.iter_mut()) {
            if *cursor < list.len() {
                *cursor = update_tile(&mut counters, list, *cursor, start, tile_end);
            }
        }
        if wide {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                populate_hits_256(&counters, threshold, start, out)
            };
        } else {
            populate_hits_scalar(&counters, threshold, start, out);
        }
        start = tile_end;
    }
}

/// Hit scan, 32 counters per vector. `_mm256_cmpgt_epi8` compares signed, so
/// bytes above the threshold are found unsigned-style instead: saturating
/// subtraction leaves zero exactly for counters <= threshold, and the
/// inverted equality mask marks the rest.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn populate_hits_256(counters: &[u8], threshold: u8, start: u64, out: &mut Vec<DocId>) {
    use std::arch::x86_64::*;

    let vsize = counters.len() / 32;
    let comprand = _mm256_set1_epi8(threshold as i8);
    let zero = _mm256_setzero_si256();
    for i in 0..vsize {
        let v = _mm256_loadu_si256(counters.as_ptr().add(i * 32) as *const __m256i);
        let below = _mm256_cmpeq_epi8(_mm256_subs_epu8(v, comprand), zero);
        let mut bits = !(_mm256_movemask_epi8(below) as u32);
        let base = start + (i * 32) as u64;
        while bits != 0 {
            let lane = bits.trailing_zeros();
            out.push((base + lane as u64) as DocId);
            bits &= bits - 1;
        }
    }
    for i in vsize * 32..counters.len() {
        if counters[i] > threshold {
            out.push((start + i as u64) as DocId);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_blocked;
    use rand::prelude::*;

    fn random_list(rng: &mut StdRng, len: usize, universe: u32) -> Vec<DocId> {
        let mut ids: Vec<DocId> = (0..len).map(|_| rng.gen_range(0..universe)).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    #[test]
    fn matches_the_scalar_kernel() {
        let mut rng = StdRng::seed_from_u64(7);
        for threshold in [0u8, 1, 3, 7] {
            let lists: Vec<Vec<DocId>> = (0..8)
                .map(|_| random_list(&mut rng, 2_000, 300_000))
                .collect();
            let borrowed: Vec<&[DocId]> = lists.iter().map(Vec::as_slice).collect();

            let mut expected = Vec::new();
            scan_blocked(&borrowed, threshold, &mut expected);
            expected.sort_unstable();

            let mut actual = Vec::new();
            scan_blocked_256(&borrowed, threshold, &mut actual);
            // post-pass emission is ascending across the whole sweep
            assert!(actual.windows(2).all(|pair| pair[0] < pair[1]));
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn hits_at_the_tile_boundary() {
        let r = RANGE_SIZE as DocId;
        let lists: [&[DocId]; 2] = [&[r - 1, r], &[r - 1, r]];
        let mut out = Vec::new();
        scan_blocked_256(&lists, 1, &mut out);
        assert_eq!(out, vec![r - 1, r]);
    }

    #[test]
    fn saturated_threshold_is_empty() {
        let lists: [&[DocId]; 1] = [&[1, 2, 3]];
        let mut out = Vec::new();
        scan_blocked_256(&lists, u8::MAX, &mut out);
        assert!(out.is_empty());
    }
}
