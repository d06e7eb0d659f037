use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::decoder::RecoLayout;

pub const INPUT_TOPIC: &str = "raw_recos";
pub const OUTPUT_TOPIC: &str = "filtered_recos";
pub const FILTER_GROUP_ID: &str = "filtering";

pub const DEFAULT_KAFKA_URL: &str = "localhost:1234";
pub const DEFAULT_DATASET_PATH: &str = "./travel_data_sample.csv.gz";

pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub kafka_url: String,
    pub dataset_path: PathBuf,
    /// Searches per second; `None` publishes as fast as possible.
    pub msg_per_sec: Option<u32>,
    pub layout: RecoLayout,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            kafka_url: DEFAULT_KAFKA_URL.to_string(),
            dataset_path: PathBuf::from(DEFAULT_DATASET_PATH),
            msg_per_sec: None,
            layout: RecoLayout::default(),
        }
    }
}

impl Config {
    /// Reads `KAFKA_URL`, `DATASET_PATH`, `MSG_PER_SEC` and `RECO_LAYOUT`.
    pub fn from_env() -> Config {
        Config::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("KAFKA_URL") {
            config.kafka_url = url;
        }
        if let Some(path) = lookup("DATASET_PATH") {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(rate) = lookup("MSG_PER_SEC") {
            config.msg_per_sec = match rate.trim().parse::<i64>() {
                Ok(rate) if rate > 0 => Some(rate.min(u32::MAX as i64) as u32),
                Ok(_) => None,
                Err(e) => {
                    log::warn!("ignoring MSG_PER_SEC={:?}: {}", rate, e);
                    None
                }
            };
        }
        if let Some(layout) = lookup("RECO_LAYOUT") {
            match layout.parse() {
                Ok(layout) => config.layout = layout,
                Err(e) => log::warn!("ignoring RECO_LAYOUT: {}", e),
            }
        }

        config
    }

    pub fn throttle(&self) -> Option<Duration> {
        self.msg_per_sec
            .map(|rate| Duration::from_secs_f64(1.0 / f64::from(rate)))
    }
}
