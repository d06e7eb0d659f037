use crate::driver::{Driver, Message};
use crate::model::Search;
use crate::Result;

/// Where published searches go. A disconnected channel still encodes
/// every search but drops the bytes.
pub enum Channel<D> {
    Connected(D),
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Sent,
    Discarded,
    Failed,
}

pub struct Publisher<D> {
    topic: String,
    channel: Channel<D>,
}

impl<D: Driver> Publisher<D> {
    pub fn connected(driver: D, topic: impl Into<String>) -> Publisher<D> {
        Publisher {
            topic: topic.into(),
            channel: Channel::Connected(driver),
        }
    }

    pub fn disconnected(topic: impl Into<String>) -> Publisher<D> {
        Publisher {
            topic: topic.into(),
            channel: Channel::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.channel, Channel::Connected(_))
    }

    /// Encodes the search as JSON and hands it to the channel. Write
    /// failures are logged and reported, never retried.
    pub async fn publish(&self, search: &Search) -> Result<PublishOutcome> {
        let payload = serde_json::to_vec(search)?;

        match &self.channel {
            Channel::Connected(driver) => {
                match driver.write(Message::new(self.topic.as_str(), payload)).await {
                    Ok(()) => Ok(PublishOutcome::Sent),
                    Err(e) => {
                        log::warn!("failed to publish search {}: {}", search.search_id, e);
                        Ok(PublishOutcome::Failed)
                    }
                }
            }
            Channel::Disconnected => {
                log::trace!("discarding search {} ({} bytes)", search.search_id, payload.len());
                Ok(PublishOutcome::Discarded)
            }
        }
    }
}
