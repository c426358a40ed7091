pub mod demo;
pub mod scan;

use anyhow::bail;
use quorum::prelude::*;
use quorum_core::{Kernel, ScanDatabase};
use std::time::{Duration, Instant};

/// Wall-clock totals per kernel across a run.
pub struct Measurements {
    elapsed: [Duration; Kernel::ALL.len()],
    elements: u64,
}

impl Measurements {
    pub fn new() -> Self {
        Self {
            elapsed: [Duration::ZERO; Kernel::ALL.len()],
            elements: 0,
        }
    }

    pub fn report(&self) {
        println!("Elements per millisecond:");
        for (kernel, elapsed) in Kernel::ALL.iter().zip(&self.elapsed) {
            if elapsed.is_zero() {
                continue;
            }
            let per_ms = self.elements as f64 / elapsed.as_secs_f64() / 1e3;
            println!("  {:<12} {:>12.0}", kernel.name(), per_ms);
        }
    }
}

/// Checks every CPU-native variant against the reference answer for this
/// query, then times each one `repeats` times. Returns the hit count.
pub fn verify_and_measure(
    db: &ScanDatabase,
    query: &[u32],
    threshold: u8,
    repeats: usize,
    m: &mut Measurements,
) -> Result<usize> {
    let mut expected = db.execute(query, threshold, Kernel::Reference)?;
    expected.sort_unstable();

    for kernel in Kernel::ALL {
        if !kernel.is_native() {
            continue;
        }
        let mut answer = db.execute(query, threshold, kernel)?;
        answer.sort_unstable();
        if answer != expected {
            bail!(
                "{} disagrees with the reference: {} hits vs {}",
                kernel.name(),
                answer.len(),
                expected.len()
            );
        }
    }

    m.elements += (db.query_weight(query)? * repeats) as u64;
    for (slot, kernel) in Kernel::ALL.iter().enumerate() {
        if !kernel.is_native() {
            continue;
        }
        for _ in 0..repeats {
            let clock = Instant::now();
            let answer = db.execute(query, threshold, *kernel)?;
            m.elapsed[slot] += clock.elapsed();
            debug_assert_eq!(answer.len(), expected.len());
        }
    }

    Ok(expected.len())
}
