use super::{verify_and_measure, Measurements};
use quorum::encoding::{is_strictly_increasing, GapReader};
use quorum::prelude::*;
use quorum_core::{preferred_kernel, ScanDatabase};
use std::path::Path;

/// Answers every query from `queries` against `postings`, verifying the
/// vector variants along the way.
pub fn run(postings: &Path, queries: &Path, threshold: u8) -> Result<()> {
    let lists = GapReader::open(postings)
        .context(OpeningPostingsFile(postings.to_path_buf()))?
        .read_all()?;
    for (index, list) in lists.iter().enumerate() {
        if !is_strictly_increasing(list) {
            return Err(NotAscending(index).into());
        }
    }
    let queries = GapReader::open(queries)
        .context(OpeningQueriesFile(queries.to_path_buf()))?
        .read_all()?;
    info!(
        "{} posting lists, {} queries, {} kernel",
        lists.len(),
        queries.len(),
        preferred_kernel().name()
    );

    let db = ScanDatabase::new(lists)?;
    let mut m = Measurements::new();
    for (qid, query) in queries.iter().enumerate() {
        let hits = verify_and_measure(&db, query, threshold, 1, &mut m)?;
        println!("query {}: {} hits", qid, hits);
    }
    m.report();
    Ok(())
}
