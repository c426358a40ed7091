//! 512-bit blocked kernel.
//!
//! Counter updates go through gather-increment-blend-scatter over 16 ids at
//! a time; cursor advance comes straight from precomputed range-end tables,
//! so the update loop runs with no per-element boundary test. Hits are found
//! in a post-pass comparing 64 counters per vector into a bitmask.

use crate::scalar::populate_hits_scalar;
use crate::{has_avx512, DocId, Error, Result};

/// Tile width of the 512-bit kernel; the range-end tables must be built with
/// the same stride.
pub const RANGE_SIZE_512: usize = 40000;

/// The word gather at the last in-tile byte reads three bytes past it, and
/// the scatter writes them back unchanged.
const TILE_SLACK: usize = 3;

/// Blocked scan driven by range-end tables (one per list, all the same
/// length; see [`build_all_range_ends`](crate::build_all_range_ends)).
/// Falls back to an equivalent scalar schedule when AVX-512 is missing.
pub fn scan_blocked_512(
    range_size: usize,
    lists: &[&[DocId]],
    range_ends: &[&[u32]],
    threshold: u8,
    out: &mut Vec<DocId>,
) -> Result<()> {
    out.clear();
    if range_size == 0 {
        return Err(Error::BadRangeSize);
    }
    if lists.len() != range_ends.len() {
        return Err(Error::BadRangeEnds(format!(
            "{} lists with {} range-end tables",
            lists.len(),
            range_ends.len()
        )));
    }
    if lists.is_empty() {
        return Ok(());
    }
    let tiles = range_ends[0].len();
    if let Some(bad) = range_ends.iter().position(|table| table.len() != tiles) {
        return Err(Error::BadRangeEnds(format!(
            "table {} covers {} tiles, table 0 covers {}",
            bad,
            range_ends[bad].len(),
            tiles
        )));
    }
    if threshold == u8::MAX {
        return Ok(());
    }

    let wide = has_avx512();
    let mut counters = vec![0u8; range_size + TILE_SLACK];
    let mut cursors = vec![0usize; lists.len()];

    for tile in 0..tiles {
        counters.fill(0);
        let start = tile as u64 * range_size as u64;
        for (k, list) in lists.iter().enumerate() {
            let it = cursors[k];
            let end = range_ends[k][tile] as usize;
            debug_assert!(it <= end && end <= list.len(), "cursor overrun");
            if it < end {
                // Every element in [it, end) must fall inside the tile, or
                // the scatter below would write outside the counter array.
                let (lo, hi) = (list[it] as u64, list[end - 1] as u64);
                if lo < start || hi >= start + range_size as u64 {
                    return Err(Error::BadRangeEnds(format!(
                        "table {k} sends ids {lo}..={hi} into tile {tile}"
                    )));
                }
                if wide {
                    #[cfg(target_arch = "x86_64")]
                    unsafe {
                        update_counters_512(&list[..end], it, counters.as_mut_ptr(), start as u32)
                    };
                } else {
                    for &val in &list[it..end] {
                        counters[(val as u64 - start) as usize] += 1;
                    }
                }
            }
            cursors[k] = end;
        }
        if wide {
            #[cfg(target_arch = "x86_64")]
            unsafe {
                populate_hits_512(&counters[..range_size], threshold, start, out)
            };
        } else {
            populate_hits_scalar(&counters[..range_size], threshold, start, out);
        }
    }
    Ok(())
}

/// Bumps the tile counter of 16 ids per iteration. The gather pulls a whole
/// 32-bit word per id, the add bumps its low byte, the byte blend restores
/// the three neighbors exactly as read, and the scatter writes the word
/// back; memory-overlapping lanes resolve in lane order, which keeps
/// neighbor counters intact because each lane rewrites the very bytes it
/// read. Two equal ids inside one block would lose an increment; strict
/// ascension within a list rules that out.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn update_counters_512(list: &[DocId], it: usize, counters: *mut u8, start: u32) {
    use std::arch::x86_64::*;

    let qty = list.len() - it;
    let vsize = qty / 16;
    let add1 = _mm512_set1_epi32(1);
    let shift = _mm512_set1_epi32(start as i32);
    const BLEND: __mmask64 = 0x1111_1111_1111_1111;

    let mut ptr = list.as_ptr().add(it);
    for _ in 0..vsize {
        let ids = _mm512_loadu_epi32(ptr as *const i32);
        let idx = _mm512_sub_epi32(ids, shift);
        let orig = _mm512_i32gather_epi32::<1>(idx, counters as *const i32);
        let inc = _mm512_add_epi32(orig, add1);
        let v = _mm512_mask_blend_epi8(BLEND, orig, inc);
        _mm512_i32scatter_epi32::<1>(counters as *mut i32, idx, v);
        ptr = ptr.add(16);
    }

    for &val in &list[it + vsize * 16..] {
        *counters.add((val - start) as usize) += 1;
    }
}

/// Hit scan, 64 counters per vector through an unsigned byte compare mask.
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx512f,avx512bw")]
unsafe fn populate_hits_512(counters: &[u8], threshold: u8, start: u64, out: &mut Vec<DocId>) {
    use std::arch::x86_64::*;

    let vsize = counters.len() / 64;
    let comprand = _mm512_set1_epi8(threshold as i8);
    for i in 0..vsize {
        let v = _mm512_loadu_si512(counters.as_ptr().add(i * 64) as *const __m512i);
        let mut bits = _mm512_cmpgt_epu8_mask(v, comprand);
        let base = start + (i * 64) as u64;
        while bits != 0 {
            let lane = bits.trailing_zeros();
            out.push((base + lane as u64) as DocId);
            bits &= bits - 1;
        }
    }
    for i in vsize * 64..counters.len() {
        if counters[i] > threshold {
            out.push((start + i as u64) as DocId);
        }
    }
}
