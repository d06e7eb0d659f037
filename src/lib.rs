//! Synthesizes a stream of flight searches from a historical dataset.
//!
//! The `generator` binary replays the dataset forever, groups recos into
//! [`Search`] aggregates, moves their dates to the present and publishes
//! them to Kafka. The `filter` binary samples 1% of that stream onto a
//! second topic.

pub mod aggregator;
pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod filter;
pub mod generator;
pub mod model;
pub mod publisher;
pub mod replay;
pub mod temporal;

pub use driver::{Driver, Message, Source};
pub use error::{Error, Result};
pub use model::{CompressedReco, Flight, Reco, Search};
