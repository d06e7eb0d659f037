use log::LevelFilter;

use searchstream::config::{Config, FILTER_GROUP_ID, INPUT_TOPIC, OUTPUT_TOPIC, WRITE_DEADLINE};
use searchstream::driver::kafka;
use searchstream::filter::{OneInHundred, SamplingFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .init();

    log::info!("starting filtering service");
    let config = Config::from_env();

    let mut consumer = kafka::Consumer::subscribe(&config.kafka_url, FILTER_GROUP_ID, INPUT_TOPIC)?;
    let producer = kafka::Producer::new(&config.kafka_url, WRITE_DEADLINE)?;

    let mut filter = SamplingFilter::new(OneInHundred::new(), OUTPUT_TOPIC);
    let counters = filter.run(&mut consumer, &producer).await;
    log::info!("filtering stopped: {}", counters);

    Ok(())
}
