//! Second stage: forwards a random 1% of the published searches.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::driver::{Driver, Message, Source};
use crate::model::Search;

pub const SAMPLE_RANGE: u32 = 100;
pub const ACCEPT_DRAW: u32 = 99;

const LOG_EVERY: u64 = 1000;

pub trait Sampler {
    fn accept(&mut self) -> bool;
}

pub struct OneInHundred {
    rng: StdRng,
}

impl OneInHundred {
    pub fn new() -> OneInHundred {
        OneInHundred::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> OneInHundred {
        OneInHundred { rng }
    }
}

impl Default for OneInHundred {
    fn default() -> Self {
        OneInHundred::new()
    }
}

impl Sampler for OneInHundred {
    fn accept(&mut self) -> bool {
        self.rng.gen_range(0..SAMPLE_RANGE) == ACCEPT_DRAW
    }
}

#[derive(Debug)]
pub enum FilterOutcome {
    Forward,
    Reject,
    Malformed(serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounters {
    pub received: u64,
    pub malformed: u64,
    pub forwarded: u64,
    pub failed: u64,
}

impl fmt::Display for FilterCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received {} messages, {} malformed, {} forwarded, {} failed",
            self.received, self.malformed, self.forwarded, self.failed
        )
    }
}

pub struct SamplingFilter<S> {
    sampler: S,
    output_topic: String,
    counters: FilterCounters,
}

impl<S: Sampler> SamplingFilter<S> {
    pub fn new(sampler: S, output_topic: impl Into<String>) -> SamplingFilter<S> {
        SamplingFilter {
            sampler,
            output_topic: output_topic.into(),
            counters: FilterCounters::default(),
        }
    }

    pub fn counters(&self) -> FilterCounters {
        self.counters
    }

    /// Classifies one payload. Only well-formed searches take part in the
    /// draw.
    pub fn inspect(&mut self, payload: &[u8]) -> FilterOutcome {
        self.counters.received += 1;

        if let Err(e) = serde_json::from_slice::<Search>(payload) {
            self.counters.malformed += 1;
            return FilterOutcome::Malformed(e);
        }

        if self.sampler.accept() {
            FilterOutcome::Forward
        } else {
            FilterOutcome::Reject
        }
    }

    /// Consumes `source` until it closes or fails, forwarding accepted
    /// payloads unchanged to `sink`.
    pub async fn run<Src, D>(&mut self, source: &mut Src, sink: &D) -> FilterCounters
    where
        Src: Source,
        D: Driver,
    {
        loop {
            let message = match source.read().await {
                Some(Ok(message)) => message,
                Some(Err(e)) => {
                    log::error!("failed to consume: {}", e);
                    break;
                }
                None => {
                    log::info!("input closed");
                    break;
                }
            };

            match self.inspect(&message.payload) {
                FilterOutcome::Forward => {
                    let forward = Message {
                        topic: self.output_topic.clone(),
                        key: message.key,
                        payload: message.payload,
                    };
                    match sink.write(forward).await {
                        Ok(()) => self.counters.forwarded += 1,
                        Err(e) => {
                            log::warn!("failed to forward message: {}", e);
                            self.counters.failed += 1;
                        }
                    }
                }
                FilterOutcome::Reject => {}
                FilterOutcome::Malformed(e) => log::debug!("dropping malformed message: {}", e),
            }

            if self.counters.received % LOG_EVERY == 0 {
                log::info!("{}", self.counters);
            }
        }

        self.counters
    }
}
