use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use maplit::hashmap;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer as _, StreamConsumer};
use rdkafka::message::Message as _;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer as _};

use super::Message;
use crate::Result;

pub fn producer_config(
    bootstrap_servers: &str,
    write_deadline: Duration,
    config_overrides: Option<HashMap<&str, &str>>,
) -> ClientConfig {
    let mut config = ClientConfig::new();

    config.set("bootstrap.servers", bootstrap_servers);
    config.set("message.timeout.ms", write_deadline.as_millis().to_string());
    config.set("api.version.request", "true");

    if let Some(overrides) = config_overrides {
        for (key, value) in overrides {
            config.set(key, value);
        }
    }

    config
}

pub fn consumer_config(
    bootstrap_servers: &str,
    group_id: &str,
    config_overrides: Option<HashMap<&str, &str>>,
) -> ClientConfig {
    let mut config = ClientConfig::new();

    config.set("group.id", group_id);
    config.set("bootstrap.servers", bootstrap_servers);
    config.set("enable.partition.eof", "false");
    config.set("session.timeout.ms", "6000");
    config.set("enable.auto.commit", "true");
    config.set("api.version.request", "true");
    config.set("auto.offset.reset", "earliest");

    if let Some(overrides) = config_overrides {
        for (key, value) in overrides {
            config.set(key, value);
        }
    }

    config
}

/// Publishes messages to Kafka, giving up on each one after the write
/// deadline.
pub struct Producer {
    inner: FutureProducer,
    write_deadline: Duration,
}

impl Producer {
    pub fn new(bootstrap_servers: &str, write_deadline: Duration) -> Result<Producer> {
        let inner = producer_config(bootstrap_servers, write_deadline, None).create()?;
        Ok(Producer {
            inner,
            write_deadline,
        })
    }

    /// Like [`Producer::new`], but also fails when no broker answers a
    /// metadata request within the write deadline.
    pub fn connect(bootstrap_servers: &str, write_deadline: Duration) -> Result<Producer> {
        let producer = Producer::new(bootstrap_servers, write_deadline)?;
        let metadata = producer
            .inner
            .client()
            .fetch_metadata(None, write_deadline)?;
        log::info!(
            "connected to {} ({} brokers)",
            bootstrap_servers,
            metadata.brokers().len()
        );
        Ok(producer)
    }
}

#[async_trait]
impl super::Driver for Producer {
    async fn write(&self, message: Message) -> Result<()> {
        let mut record: FutureRecord<Vec<u8>, Vec<u8>> =
            FutureRecord::to(&message.topic).payload(&message.payload);
        if let Some(key) = &message.key {
            record = record.key(key);
        }

        self.inner
            .send(record, self.write_deadline)
            .await
            .map(|_| ())
            .map_err(|(e, _)| e.into())
    }
}

pub struct Consumer {
    inner: StreamConsumer,
}

impl Consumer {
    pub fn subscribe(bootstrap_servers: &str, group_id: &str, topic: &str) -> Result<Consumer> {
        let overrides = hashmap! {
            "client.id" => group_id,
        };
        let inner: StreamConsumer =
            consumer_config(bootstrap_servers, group_id, Some(overrides)).create()?;
        inner.subscribe(&[topic])?;
        log::info!("subscribed to {} on {}", topic, bootstrap_servers);
        Ok(Consumer { inner })
    }
}

#[async_trait]
impl super::Source for Consumer {
    async fn read(&mut self) -> Option<Result<Message>> {
        let message = match self.inner.recv().await {
            Ok(m) => Message {
                topic: m.topic().to_owned(),
                key: m.key().map(<[u8]>::to_vec),
                payload: m.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            },
            Err(e) => return Some(Err(e.into())),
        };
        Some(Ok(message))
    }
}
