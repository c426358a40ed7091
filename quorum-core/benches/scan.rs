use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use quorum_core::{Kernel, ScanDatabase};
use rand::prelude::*;

fn synthetic_database(lists: usize, len: usize, universe: u32) -> (ScanDatabase, Vec<u32>, u64) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut elements = 0u64;
    let mut data = Vec::with_capacity(lists);
    for _ in 0..lists {
        let mut ids: Vec<u32> = (0..len).map(|_| rng.gen_range(0..universe)).collect();
        ids.sort_unstable();
        ids.dedup();
        elements += ids.len() as u64;
        data.push(ids);
    }
    let query: Vec<u32> = (0..lists as u32).collect();
    (ScanDatabase::new(data).unwrap(), query, elements)
}

pub fn scan_variants(c: &mut Criterion) {
    let (db, query, elements) = synthetic_database(100, 50_000, 20_000_000);

    let mut g = c.benchmark_group("Threshold Scan");
    g.sample_size(10);
    g.throughput(Throughput::Elements(elements));
    for kernel in Kernel::ALL {
        if !kernel.is_native() {
            continue;
        }
        g.bench_function(kernel.name(), |bench| {
            bench.iter(|| black_box(db.execute(&query, 3, kernel).unwrap()));
        });
    }
    g.finish();
}

pub fn scan_thresholds(c: &mut Criterion) {
    let (db, query, elements) = synthetic_database(100, 50_000, 20_000_000);
    let kernel = quorum_core::preferred_kernel();

    let mut g = c.benchmark_group("Threshold Sweep");
    g.sample_size(10);
    g.throughput(Throughput::Elements(elements));
    for threshold in [1u8, 3, 9] {
        g.bench_function(format!("t={}", threshold), |bench| {
            bench.iter(|| black_box(db.execute(&query, threshold, kernel).unwrap()));
        });
    }
    g.finish();
}

criterion_group!(benches, scan_variants, scan_thresholds);
criterion_main!(benches);
