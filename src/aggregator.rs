use std::mem;

use crate::model::{CompressedReco, Reco, Search};

const PENDING_WARN_THRESHOLD: usize = 10_000;

/// Groups contiguous recos sharing a search id into [`Search`] aggregates.
///
/// The input is expected to be sorted by search id; an id that shows up
/// again later simply starts another aggregate. The buffer is unbounded: a
/// dataset holding a single search id never emits anything on replay.
#[derive(Debug, Default)]
pub struct SearchAggregator {
    buffer: Vec<Reco>,
    current_id: Option<String>,
}

impl SearchAggregator {
    pub fn new() -> SearchAggregator {
        SearchAggregator::default()
    }

    /// Adds a reco, returning the previous group once the search id changes.
    pub fn push(&mut self, reco: Reco) -> Option<Search> {
        if reco.is_malformed() {
            log::debug!("ignoring malformed reco of search {}", reco.search_id);
            return None;
        }

        let finished = if self.current_id.as_deref() != Some(reco.search_id.as_str()) {
            self.current_id = Some(reco.search_id.clone());
            self.flush()
        } else {
            None
        };

        self.buffer.push(reco);
        if self.buffer.len() % PENDING_WARN_THRESHOLD == 0 {
            log::warn!(
                "search {:?} has {} recos pending without a search id change",
                self.current_id,
                self.buffer.len()
            );
        }
        finished
    }

    /// Flushes the group in progress, if any.
    pub fn finish(&mut self) -> Option<Search> {
        self.current_id = None;
        self.flush()
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) -> Option<Search> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(finalize(mem::take(&mut self.buffer)))
    }
}

fn finalize(group: Vec<Reco>) -> Search {
    let first = &group[0];
    let mut search = Search {
        version_nb: first.version_nb.clone(),
        search_id: first.search_id.clone(),
        search_country: first.search_country.clone(),
        search_date: first.search_date.clone(),
        search_time: first.search_time.clone(),
        origin_city: first.origin_city.clone(),
        destination_city: first.destination_city.clone(),
        request_dep_date: first.request_dep_date.clone(),
        request_return_date: first.request_return_date.clone(),
        passengers_string: first.passengers_string.clone(),
        currency: first.currency.clone(),
        recos: Vec::with_capacity(group.len()),
    };

    search.recos = group.into_iter().map(compress).collect();
    search
}

fn compress(reco: Reco) -> CompressedReco {
    let mut flights = reco.flights;
    for flight in flights.iter_mut() {
        if flight.operating_airline.is_empty() {
            flight.operating_airline = flight.marketing_airline.clone();
        }
    }

    CompressedReco {
        price: parse_amount(&reco.price),
        taxes: parse_amount(&reco.taxes),
        fees: parse_amount(&reco.fees),
        nb_of_flights: reco.nb_of_flights,
        flights,
    }
}

fn parse_amount(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => amount,
        Ok(_) => {
            log::debug!("non-finite amount {:?}", raw);
            0.0
        }
        Err(e) => {
            log::debug!("unparsable amount {:?}: {}", raw, e);
            0.0
        }
    }
}
