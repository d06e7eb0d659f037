use async_trait::async_trait;

use crate::Result;

pub mod in_memory;
pub mod kafka;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Message {
        Message {
            topic: topic.into(),
            key: None,
            payload,
        }
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn write(&self, message: Message) -> Result<()>;
}

/// Inbound side of a transport. `None` means the channel is closed.
#[async_trait]
pub trait Source: Send {
    async fn read(&mut self) -> Option<Result<Message>>;
}
