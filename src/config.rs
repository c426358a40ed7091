//! Demo workload settings in YAML format.
use crate::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

#[derive(Deserialize, PartialEq, Debug)]
#[serde(default)]
pub struct DemoConfig {
    /// Ids are drawn uniformly from `[0, universe)`.
    pub universe: u32,
    pub list_len: usize,
    pub list_count: usize,
    /// One full verify-and-measure run per threshold.
    pub thresholds: Vec<u8>,
    pub repeats: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            universe: 20_000_000,
            list_len: 50_000,
            list_count: 100,
            thresholds: (1..10).collect(),
            repeats: 10,
        }
    }
}

pub fn read_config(path: &Path) -> Result<DemoConfig> {
    let file = File::open(path)?;
    let config = serde_yaml::from_reader(file)?;
    Ok(config)
}
