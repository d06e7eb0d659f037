use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to open dataset {}: {}", .path.display(), .source)]
    Dataset {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("dataset {0} contains no usable rows")]
    EmptyDataset(String),
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),
    #[error("failed to encode search: {0}")]
    Json(#[from] serde_json::Error),
    #[error("channel closed")]
    Closed,
}
