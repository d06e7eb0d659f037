//! Rewrites the dates of replayed searches so they look like live traffic:
//! searched right now, departing within the next few months.

use std::ops::Range;

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::Search;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

pub const DEPARTURE_WINDOW_DAYS: Range<i64> = 3..100;
pub const FLIGHT_JITTER_DAYS: Range<i64> = -2..2;

pub trait Clock: Send {
    fn now(&self) -> NaiveDateTime;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub struct Synthesizer {
    rng: StdRng,
    clock: Box<dyn Clock>,
}

impl Synthesizer {
    pub fn new() -> Synthesizer {
        Synthesizer::with_rng_and_clock(StdRng::from_entropy(), Box::new(SystemClock))
    }

    pub fn with_rng_and_clock(rng: StdRng, clock: Box<dyn Clock>) -> Synthesizer {
        Synthesizer { rng, clock }
    }

    /// Moves the search to the present.
    ///
    /// The stay duration of round trips is kept. Every flight gets its own
    /// date near the new departure; arrival is set to the departure day.
    pub fn make_realistic(&mut self, search: &mut Search) {
        let now = self.clock.now();
        search.search_date = now.format(DATE_FORMAT).to_string();
        search.search_time = now.format(TIME_FORMAT).to_string();

        let stay = stay_duration(&search.request_dep_date, &search.request_return_date);

        let departure = now.date() + Duration::days(self.rng.gen_range(DEPARTURE_WINDOW_DAYS));
        search.request_dep_date = departure.format(DATE_FORMAT).to_string();

        if search.is_round_trip() {
            search.request_return_date = (departure + stay).format(DATE_FORMAT).to_string();
        }

        for reco in search.recos.iter_mut() {
            for flight in reco.flights.iter_mut() {
                let day = departure + Duration::days(self.rng.gen_range(FLIGHT_JITTER_DAYS));
                flight.dep_date = day.format(DATE_FORMAT).to_string();
                flight.arr_date = flight.dep_date.clone();
            }
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Synthesizer::new()
    }
}

fn stay_duration(departure: &str, return_date: &str) -> Duration {
    if return_date.is_empty() {
        return Duration::zero();
    }
    match (
        NaiveDate::parse_from_str(departure, DATE_FORMAT),
        NaiveDate::parse_from_str(return_date, DATE_FORMAT),
    ) {
        (Ok(departure), Ok(return_date)) => return_date - departure,
        _ => {
            log::debug!(
                "cannot compute stay between {:?} and {:?}, assuming same day return",
                departure,
                return_date
            );
            Duration::zero()
        }
    }
}
