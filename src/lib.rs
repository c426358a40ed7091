pub mod config;
pub mod encoding;

pub mod prelude {
    use std::path::PathBuf;
    use thiserror::Error;

    pub type Result<T> = anyhow::Result<T>;
    pub type IoResult<T> = std::io::Result<T>;

    pub use anyhow::Context;
    pub use Error::*;

    pub use log::{debug, error, info, log, trace, warn};

    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Opening postings file: {0}")]
        OpeningPostingsFile(PathBuf),

        #[error("Opening queries file: {0}")]
        OpeningQueriesFile(PathBuf),

        #[error("Record {0} ends before its declared length")]
        TruncatedRecord(usize),

        #[error("Gap value overflows 32 bits in record {0}")]
        GapOverflow(usize),

        #[error("Posting list {0} is not strictly increasing")]
        NotAscending(usize),

        #[error("--postings, --queries and --threshold must be given together")]
        IncompleteArguments,
    }
}
