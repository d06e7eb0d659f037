use log::LevelFilter;

use searchstream::config::{Config, INPUT_TOPIC, WRITE_DEADLINE};
use searchstream::driver::kafka;
use searchstream::generator::Generator;
use searchstream::publisher::Publisher;
use searchstream::replay::{GzipFile, ReplaySource};
use searchstream::temporal::Synthesizer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_env("RUST_LOG")
        .format_timestamp_millis()
        .init();

    let config = Config::from_env();
    log::info!("starting stream from {}", config.dataset_path.display());

    let rows = ReplaySource::open(
        GzipFile::new(&config.dataset_path),
        config.layout.base_field_count(),
    )?;

    let publisher = match kafka::Producer::connect(&config.kafka_url, WRITE_DEADLINE) {
        Ok(producer) => Publisher::connected(producer, INPUT_TOPIC),
        Err(e) => {
            log::error!("no brokers available at {}: {}", config.kafka_url, e);
            log::error!("make sure to start Kafka and set KAFKA_URL to its address");
            log::info!("starting stream anyway, searches will be discarded");
            Publisher::disconnected(INPUT_TOPIC)
        }
    };

    let mut generator = Generator::new(rows, config.layout, Synthesizer::new(), publisher)
        .with_throttle(config.throttle());

    let counters = generator.run(None).await?;
    log::info!("stream stopped: {}", counters);

    Ok(())
}
