mod cli;

use clap::Parser;
use quorum::{config, config::DemoConfig, prelude::*};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Gap-compressed postings file
    #[clap(long)]
    postings: Option<PathBuf>,

    /// Gap-compressed queries file; each record lists posting ids
    #[clap(long)]
    queries: Option<PathBuf>,

    /// Emit ids occurring in strictly more than this many lists
    #[clap(long)]
    threshold: Option<u8>,

    /// Demo settings in YAML, used when no files are given
    #[clap(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    match (args.postings, args.queries, args.threshold) {
        (Some(postings), Some(queries), Some(threshold)) => {
            cli::scan::run(&postings, &queries, threshold)
        }
        (None, None, None) => {
            let config = match args.config {
                Some(path) => config::read_config(&path)?,
                None => DemoConfig::default(),
            };
            cli::demo::run(&config)
        }
        _ => Err(IncompleteArguments.into()),
    }
}
