use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub dep_airport: String,
    pub dep_date: String,
    pub dep_time: String,
    pub arr_airport: String,
    pub arr_date: String,
    pub arr_time: String,
    pub operating_airline: String,
    pub marketing_airline: String,
    pub flight_nb: String,
    pub cabin: String,
}

impl Flight {
    /// The carrier actually flying the leg, falling back to the marketing
    /// carrier when the dataset leaves it blank.
    pub fn effective_operating_airline(&self) -> &str {
        if self.operating_airline.is_empty() {
            &self.marketing_airline
        } else {
            &self.operating_airline
        }
    }
}

/// A decoded dataset row: one priced itinerary of a search.
///
/// Monetary fields are kept as text until the reco is compressed into a
/// [`Search`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reco {
    pub version_nb: String,
    pub search_id: String,
    pub search_country: String,
    pub search_date: String,
    pub search_time: String,
    pub origin_city: String,
    pub destination_city: String,
    pub request_dep_date: String,
    pub request_return_date: String,
    pub passengers_string: String,
    pub currency: String,
    pub price: String,
    pub taxes: String,
    pub fees: String,
    pub nb_of_flights: i32,
    pub flights: Vec<Flight>,
}

impl Reco {
    /// Flight count of a row whose count field could not be parsed.
    pub const MALFORMED: i32 = -1;

    pub fn is_malformed(&self) -> bool {
        self.nb_of_flights == Reco::MALFORMED
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedReco {
    pub price: f64,
    pub taxes: f64,
    pub fees: f64,
    pub nb_of_flights: i32,
    pub flights: Vec<Flight>,
}

/// The aggregate published downstream: the search context shared by a run
/// of recos plus the compressed recos themselves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Search {
    pub version_nb: String,
    pub search_id: String,
    pub search_country: String,
    pub search_date: String,
    pub search_time: String,
    pub origin_city: String,
    pub destination_city: String,
    pub request_dep_date: String,
    /// Empty for one-way searches.
    pub request_return_date: String,
    pub passengers_string: String,
    pub currency: String,
    pub recos: Vec<CompressedReco>,
}

impl Search {
    pub fn is_round_trip(&self) -> bool {
        !self.request_return_date.is_empty()
    }

    pub fn flights(&self) -> impl Iterator<Item = &Flight> {
        self.recos.iter().flat_map(|reco| reco.flights.iter())
    }
}
