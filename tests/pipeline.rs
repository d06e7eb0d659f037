use chrono::{Local, NaiveDate};

use searchstream::config::{INPUT_TOPIC, OUTPUT_TOPIC};
use searchstream::decoder::{RecoLayout, BASE_FIELD_COUNT};
use searchstream::driver::in_memory;
use searchstream::filter::{Sampler, SamplingFilter};
use searchstream::generator::Generator;
use searchstream::publisher::Publisher;
use searchstream::replay::{InMemory, ReplaySource};
use searchstream::temporal::{Synthesizer, DATE_FORMAT};
use searchstream::Search;

const HEADER: &str = "version_nb^search_id^search_country^search_date^search_time^origin_city^\
destination_city^request_dep_date^request_return_date^passengers_string^currency^\
price^taxes^fees^nb_of_flights";

fn dataset() -> String {
    [
        HEADER,
        "2^S1^FR^2019-06-01^08:00:00^PAR^NYC^2019-06-20^2019-06-27^ADT=1^EUR^400.0^50.0^0^1^\
CDG^2019-06-20^10:00^JFK^2019-06-20^12:30^^AF^6^Y",
        "2^S1^FR^2019-06-01^08:00:00^PAR^NYC^2019-06-20^2019-06-27^ADT=1^EUR^450.0^55.0^0^2^\
CDG^2019-06-20^07:00^LHR^2019-06-20^07:30^BA^BA^303^Y^\
LHR^2019-06-20^11:00^JFK^2019-06-20^14:00^BA^BA^117^Y",
        "2^S2^DE^2019-06-02^09:30:00^BER^ROM^2019-07-01^^ADT=2^EUR^120.5^20.0^1.5^1^\
BER^2019-07-01^06:00^FCO^2019-07-01^08:05^^LH^232^M",
    ]
    .join("\n")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
}

struct Always;

impl Sampler for Always {
    fn accept(&mut self) -> bool {
        true
    }
}

#[tokio::test]
async fn two_searches_flow_from_dataset_to_filter() {
    let rows = ReplaySource::open(InMemory::new(dataset()), BASE_FIELD_COUNT).unwrap();
    let (driver, mut raw) = in_memory::channel();
    let mut generator = Generator::new(
        rows,
        RecoLayout::V2,
        Synthesizer::new(),
        Publisher::connected(driver, INPUT_TOPIC),
    );

    let counters = generator.run(Some(2)).await.unwrap();
    assert_eq!(counters.search_sent, 2);

    let published = raw.drain();
    assert_eq!(published.len(), 2);
    assert!(published.iter().all(|m| m.topic == INPUT_TOPIC));

    let searches: Vec<Search> = published
        .iter()
        .map(|m| serde_json::from_slice(&m.payload).unwrap())
        .collect();
    assert_eq!(searches[0].search_id, "S1");
    assert_eq!(searches[0].recos.len(), 2);
    assert_eq!(searches[0].recos[1].nb_of_flights, 2);
    assert_eq!(searches[1].search_id, "S2");
    assert_eq!(searches[1].recos.len(), 1);
    assert_eq!(searches[1].recos[0].price, 120.5);
    assert_eq!(searches[1].recos[0].flights[0].operating_airline, "LH");

    let today = Local::now().date_naive();
    for search in &searches {
        let departure = date(&search.request_dep_date);
        let ahead = (departure - today).num_days();
        assert!((2..=100).contains(&ahead), "departure {} days ahead", ahead);
    }
    assert_eq!(
        (date(&searches[0].request_return_date) - date(&searches[0].request_dep_date)).num_days(),
        7
    );
    assert!(searches[1].request_return_date.is_empty());

    // Feed the published messages to the filter and check they come out untouched.
    let (input, mut inbound) = in_memory::channel();
    let (output, mut filtered) = in_memory::channel();
    for message in published.iter().cloned() {
        searchstream::Driver::write(&input, message).await.unwrap();
    }
    drop(input);

    let mut filter = SamplingFilter::new(Always, OUTPUT_TOPIC);
    let counters = filter.run(&mut inbound, &output).await;
    assert_eq!(counters.received, 2);
    assert_eq!(counters.forwarded, 2);

    let forwarded = filtered.drain();
    assert_eq!(forwarded.len(), 2);
    for (original, copy) in published.iter().zip(forwarded.iter()) {
        assert_eq!(copy.topic, OUTPUT_TOPIC);
        assert_eq!(copy.payload, original.payload);
    }
}

#[tokio::test]
async fn non_finite_amounts_still_pass_the_filter() {
    let data = [
        HEADER,
        "2^S1^FR^2019-06-01^08:00:00^PAR^NYC^2019-06-20^^ADT=1^EUR^NaN^inf^0^1^\
CDG^2019-06-20^10:00^JFK^2019-06-20^12:30^^AF^6^Y",
        "2^S2^FR^2019-06-01^08:00:00^PAR^NYC^2019-06-20^^ADT=1^EUR^10^infinity^-inf^1^\
CDG^2019-06-20^10:00^JFK^2019-06-20^12:30^^AF^6^Y",
    ]
    .join("\n");
    let rows = ReplaySource::open(InMemory::new(data), BASE_FIELD_COUNT).unwrap();
    let (driver, mut raw) = in_memory::channel();
    let mut generator = Generator::new(
        rows,
        RecoLayout::V2,
        Synthesizer::new(),
        Publisher::connected(driver, INPUT_TOPIC),
    );
    generator.run(Some(2)).await.unwrap();

    let mut filter = SamplingFilter::new(Always, OUTPUT_TOPIC);
    for message in raw.drain() {
        let search: Search = serde_json::from_slice(&message.payload).unwrap();
        let reco = &search.recos[0];
        assert!(reco.price.is_finite() && reco.taxes.is_finite() && reco.fees.is_finite());
        filter.inspect(&message.payload);
    }

    let counters = filter.counters();
    assert_eq!(counters.received, 2);
    assert_eq!(counters.malformed, 0);
}
