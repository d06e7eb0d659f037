use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use async_trait::async_trait;

use super::Message;
use crate::{Error, Result};

pub fn channel() -> (Driver, Receiver) {
    let (tx, rx) = unbounded_channel();
    (Driver { tx }, Receiver { rx })
}

#[derive(Clone)]
pub struct Driver {
    tx: UnboundedSender<Message>,
}

pub struct Receiver {
    rx: UnboundedReceiver<Message>,
}

#[async_trait]
impl super::Driver for Driver {
    async fn write(&self, message: Message) -> Result<()> {
        log::trace!("write message to topic {}", message.topic);

        self.tx.send(message).map_err(|_| Error::Closed)
    }
}

#[async_trait]
impl super::Source for Receiver {
    async fn read(&mut self) -> Option<Result<Message>> {
        self.rx.recv().await.map(Ok)
    }
}

impl Receiver {
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = self.rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    pub fn close(&mut self) {
        self.rx.close();
    }
}
