use std::fmt;
use std::str::FromStr;

use crate::model::{Flight, Reco};

/// Number of fixed reco fields preceding the flight blocks in the current
/// dataset layout.
pub const BASE_FIELD_COUNT: usize = 15;

pub const FLIGHT_FIELD_COUNT: usize = 10;
pub const DELIMITER: u8 = b'^';

const SEARCH_TIME_INDEX: usize = 4;
const FLIGHT_COUNT_INDEX: usize = BASE_FIELD_COUNT - 1;

/// Column layout of the fixed reco prefix.
///
/// `V1` is the legacy export without a `search_time` column, `V2` the
/// current superset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoLayout {
    V1,
    V2,
}

impl RecoLayout {
    pub fn base_field_count(self) -> usize {
        match self {
            RecoLayout::V1 => BASE_FIELD_COUNT - 1,
            RecoLayout::V2 => BASE_FIELD_COUNT,
        }
    }
}

impl Default for RecoLayout {
    fn default() -> Self {
        RecoLayout::V2
    }
}

impl FromStr for RecoLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(RecoLayout::V1),
            "v2" => Ok(RecoLayout::V2),
            other => Err(format!("unknown reco layout {:?}", other)),
        }
    }
}

impl fmt::Display for RecoLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoLayout::V1 => write!(f, "v1"),
            RecoLayout::V2 => write!(f, "v2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("row has {found} fields, at least {expected} required")]
    TooShort { expected: usize, found: usize },
    #[error("row declares {declared} flights but only has {found} fields")]
    Truncated { declared: usize, found: usize },
}

/// Decodes one dataset row into a [`Reco`].
///
/// An unparsable flight count is not an error: the reco comes back with
/// [`Reco::MALFORMED`] as its count and no flights, and callers skip it.
pub fn decode_line<S: AsRef<str>>(fields: &[S], layout: RecoLayout) -> Result<Reco, DecodeError> {
    let base = layout.base_field_count();
    if fields.len() < base {
        return Err(DecodeError::TooShort {
            expected: base,
            found: fields.len(),
        });
    }

    let mut fixed: Vec<&str> = fields[..base].iter().map(|f| f.as_ref()).collect();
    if layout == RecoLayout::V1 {
        fixed.insert(SEARCH_TIME_INDEX, "");
    }

    let mut reco = Reco {
        version_nb: fixed[0].to_owned(),
        search_id: fixed[1].to_owned(),
        search_country: fixed[2].to_owned(),
        search_date: fixed[3].to_owned(),
        search_time: fixed[4].to_owned(),
        origin_city: fixed[5].to_owned(),
        destination_city: fixed[6].to_owned(),
        request_dep_date: fixed[7].to_owned(),
        request_return_date: fixed[8].to_owned(),
        passengers_string: fixed[9].to_owned(),
        currency: fixed[10].to_owned(),
        price: fixed[11].to_owned(),
        taxes: fixed[12].to_owned(),
        fees: fixed[13].to_owned(),
        nb_of_flights: Reco::MALFORMED,
        flights: Vec::new(),
    };

    let count = match parse_flight_count(fixed[FLIGHT_COUNT_INDEX]) {
        Some(count) => count,
        None => return Ok(reco),
    };

    let needed = base + count * FLIGHT_FIELD_COUNT;
    if fields.len() < needed {
        return Err(DecodeError::Truncated {
            declared: count,
            found: fields.len(),
        });
    }

    reco.flights = fields[base..needed]
        .chunks(FLIGHT_FIELD_COUNT)
        .map(decode_flight)
        .collect();
    reco.nb_of_flights = count as i32;

    Ok(reco)
}

// Counts may be written as decimals ("2.0") by some exports.
fn parse_flight_count(raw: &str) -> Option<usize> {
    let count: f64 = raw.trim().parse().ok()?;
    if !count.is_finite() || count < 0.0 || count > i32::MAX as f64 {
        return None;
    }
    Some(count as usize)
}

fn decode_flight<S: AsRef<str>>(block: &[S]) -> Flight {
    let field = |i: usize| block[i].as_ref().to_owned();
    Flight {
        dep_airport: field(0),
        dep_date: field(1),
        dep_time: field(2),
        arr_airport: field(3),
        arr_date: field(4),
        arr_time: field(5),
        operating_airline: field(6),
        marketing_airline: field(7),
        flight_nb: field(8),
        cabin: field(9),
    }
}

impl Reco {
    /// Re-encodes the fixed prefix of the row in the given layout.
    pub fn fixed_fields(&self, layout: RecoLayout) -> Vec<String> {
        let mut fields = vec![
            self.version_nb.clone(),
            self.search_id.clone(),
            self.search_country.clone(),
            self.search_date.clone(),
            self.search_time.clone(),
            self.origin_city.clone(),
            self.destination_city.clone(),
            self.request_dep_date.clone(),
            self.request_return_date.clone(),
            self.passengers_string.clone(),
            self.currency.clone(),
            self.price.clone(),
            self.taxes.clone(),
            self.fees.clone(),
            self.nb_of_flights.to_string(),
        ];
        if layout == RecoLayout::V1 {
            fields.remove(SEARCH_TIME_INDEX);
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: &str) -> Vec<String> {
        line.split(DELIMITER as char).map(str::to_owned).collect()
    }

    const TWO_FLIGHTS: &str = "2^S1^FR^2020-01-10^10:11:12^PAR^NYC^2020-03-01^2020-03-08^\
ADT=1^EUR^512.30^80.10^5.00^2^\
CDG^2020-03-01^10:00^LHR^2020-03-01^10:30^^AF^1680^M^\
LHR^2020-03-01^13:00^JFK^2020-03-01^16:00^BA^BA^117^M";

    #[test]
    fn decodes_fixed_fields_and_flights() {
        let reco = decode_line(&row(TWO_FLIGHTS), RecoLayout::V2).unwrap();

        assert_eq!(reco.search_id, "S1");
        assert_eq!(reco.search_time, "10:11:12");
        assert_eq!(reco.request_return_date, "2020-03-08");
        assert_eq!(reco.price, "512.30");
        assert_eq!(reco.nb_of_flights, 2);
        assert_eq!(reco.flights.len(), 2);
        assert_eq!(reco.flights[0].dep_airport, "CDG");
        assert_eq!(reco.flights[0].operating_airline, "");
        assert_eq!(reco.flights[0].marketing_airline, "AF");
        assert_eq!(reco.flights[1].arr_airport, "JFK");
        assert_eq!(reco.flights[1].cabin, "M");
    }

    #[test]
    fn fixed_fields_round_trip() {
        let fields = row(TWO_FLIGHTS);
        let reco = decode_line(&fields, RecoLayout::V2).unwrap();
        assert_eq!(reco.fixed_fields(RecoLayout::V2), fields[..BASE_FIELD_COUNT].to_vec());
    }

    #[test]
    fn legacy_layout_has_no_search_time() {
        let mut fields = row(TWO_FLIGHTS);
        fields.remove(SEARCH_TIME_INDEX);

        let reco = decode_line(&fields, RecoLayout::V1).unwrap();
        assert_eq!(reco.search_time, "");
        assert_eq!(reco.origin_city, "PAR");
        assert_eq!(reco.flights.len(), 2);
        assert_eq!(reco.fixed_fields(RecoLayout::V1), fields[..BASE_FIELD_COUNT - 1].to_vec());
    }

    #[test]
    fn unparsable_flight_count_marks_reco_malformed() {
        let mut fields = row(TWO_FLIGHTS);
        fields[FLIGHT_COUNT_INDEX] = "two".to_string();

        let reco = decode_line(&fields, RecoLayout::V2).unwrap();
        assert!(reco.is_malformed());
        assert_eq!(reco.nb_of_flights, -1);
        assert!(reco.flights.is_empty());
        assert_eq!(reco.search_id, "S1");
    }

    #[test]
    fn decimal_flight_count_is_accepted() {
        let mut fields = row(TWO_FLIGHTS);
        fields[FLIGHT_COUNT_INDEX] = "2.0".to_string();

        let reco = decode_line(&fields, RecoLayout::V2).unwrap();
        assert_eq!(reco.nb_of_flights, 2);
    }

    #[test]
    fn short_rows_are_rejected() {
        let fields = row("2^S1^FR");
        assert_eq!(
            decode_line(&fields, RecoLayout::V2),
            Err(DecodeError::TooShort {
                expected: BASE_FIELD_COUNT,
                found: 3
            })
        );

        let mut fields = row(TWO_FLIGHTS);
        fields[FLIGHT_COUNT_INDEX] = "3".to_string();
        assert_eq!(
            decode_line(&fields, RecoLayout::V2),
            Err(DecodeError::Truncated {
                declared: 3,
                found: BASE_FIELD_COUNT + 2 * FLIGHT_FIELD_COUNT
            })
        );
    }

    #[test]
    fn layout_parses_from_config_strings() {
        assert_eq!("v1".parse::<RecoLayout>(), Ok(RecoLayout::V1));
        assert_eq!(" V2 ".parse::<RecoLayout>(), Ok(RecoLayout::V2));
        assert!("v3".parse::<RecoLayout>().is_err());
        assert_eq!(RecoLayout::default().to_string(), "v2");
    }
}
