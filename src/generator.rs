//! First stage: replayed rows in, realistic searches out.

use std::fmt;
use std::time::Duration;

use crate::aggregator::SearchAggregator;
use crate::decoder::{decode_line, RecoLayout};
use crate::driver::Driver;
use crate::model::Search;
use crate::publisher::{PublishOutcome, Publisher};
use crate::temporal::Synthesizer;
use crate::Result;

const LOG_EVERY: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorCounters {
    pub reco_read: u64,
    pub reco_decoded: u64,
    pub reco_malformed: u64,
    pub search_read: u64,
    pub search_encoded: u64,
    pub search_sent: u64,
    pub search_discarded: u64,
    pub search_failed: u64,
}

impl fmt::Display for GeneratorCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {} reco, decoded {} reco ({} malformed), read {} search, encoded {} search \
             (sent {}, discarded {}, failed {})",
            self.reco_read,
            self.reco_decoded,
            self.reco_malformed,
            self.search_read,
            self.search_encoded,
            self.search_sent,
            self.search_discarded,
            self.search_failed
        )
    }
}

pub struct Generator<I, D> {
    rows: I,
    layout: RecoLayout,
    aggregator: SearchAggregator,
    synthesizer: Synthesizer,
    publisher: Publisher<D>,
    throttle: Option<Duration>,
    counters: GeneratorCounters,
}

impl<I, D> Generator<I, D>
where
    I: Iterator<Item = Result<Vec<String>>>,
    D: Driver,
{
    pub fn new(
        rows: I,
        layout: RecoLayout,
        synthesizer: Synthesizer,
        publisher: Publisher<D>,
    ) -> Generator<I, D> {
        Generator {
            rows,
            layout,
            aggregator: SearchAggregator::new(),
            synthesizer,
            publisher,
            throttle: None,
            counters: GeneratorCounters::default(),
        }
    }

    pub fn with_throttle(mut self, throttle: Option<Duration>) -> Generator<I, D> {
        self.throttle = throttle;
        self
    }

    pub fn counters(&self) -> GeneratorCounters {
        self.counters
    }

    /// Processes rows until `limit` searches have been published, or forever
    /// when there is no limit. If the rows run out, the search in progress is
    /// flushed before returning. A row source error ends the run.
    pub async fn run(&mut self, limit: Option<u64>) -> Result<GeneratorCounters> {
        while limit.map_or(true, |limit| self.counters.search_encoded < limit) {
            let fields = match self.rows.next() {
                Some(row) => row?,
                None => {
                    if let Some(search) = self.aggregator.finish() {
                        self.emit(search).await?;
                    }
                    break;
                }
            };
            self.counters.reco_read += 1;

            let reco = match decode_line(&fields, self.layout) {
                Ok(reco) if !reco.is_malformed() => reco,
                Ok(reco) => {
                    log::debug!("dropping reco of search {} with bad flight count", reco.search_id);
                    self.counters.reco_malformed += 1;
                    continue;
                }
                Err(e) => {
                    log::debug!("dropping undecodable row: {}", e);
                    self.counters.reco_malformed += 1;
                    continue;
                }
            };
            self.counters.reco_decoded += 1;

            if let Some(search) = self.aggregator.push(reco) {
                self.emit(search).await?;
            }
        }

        Ok(self.counters)
    }

    async fn emit(&mut self, mut search: Search) -> Result<()> {
        self.counters.search_read += 1;
        self.synthesizer.make_realistic(&mut search);

        let outcome = self.publisher.publish(&search).await?;
        self.counters.search_encoded += 1;
        match outcome {
            PublishOutcome::Sent => self.counters.search_sent += 1,
            PublishOutcome::Discarded => self.counters.search_discarded += 1,
            PublishOutcome::Failed => self.counters.search_failed += 1,
        }

        if self.counters.search_encoded % LOG_EVERY == 0 {
            log::info!("{}", self.counters);
        }

        if let Some(pause) = self.throttle {
            tokio::time::sleep(pause).await;
        }

        Ok(())
    }
}
