use super::{verify_and_measure, Measurements};
use quorum::config::DemoConfig;
use quorum::prelude::*;
use quorum_core::{preferred_kernel, ScanDatabase};
use rand::prelude::*;

/// Synthetic benchmark: random posting lists, one query naming all of them,
/// a full verify-and-measure pass per configured threshold.
pub fn run(config: &DemoConfig) -> Result<()> {
    info!("{} kernel", preferred_kernel().name());
    let mut rng = thread_rng();

    for &threshold in &config.thresholds {
        println!("demo threshold: {}", threshold);
        let mut lists = Vec::with_capacity(config.list_count);
        for _ in 0..config.list_count {
            let mut ids: Vec<u32> = (0..config.list_len)
                .map(|_| rng.gen_range(0..config.universe))
                .collect();
            ids.sort_unstable();
            ids.dedup();
            lists.push(ids);
        }
        let query: Vec<u32> = (0..lists.len() as u32).collect();
        let db = ScanDatabase::new(lists)?;

        let mut m = Measurements::new();
        let hits = verify_and_measure(&db, &query, threshold, config.repeats, &mut m)?;
        println!("got {} hits", hits);
        m.report();
        println!("=======================");
    }
    Ok(())
}
