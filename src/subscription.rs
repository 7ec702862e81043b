use crate::error::{AltitudeError, Result};
use crate::message::Message;
use tokio::sync::broadcast;

/// Receiver for parsed broadcast messages
///
/// Obtained from [`AltitudeClient::subscribe`](crate::AltitudeClient::subscribe).
/// Each receiver sees every message parsed after it was created, in arrival
/// order.
pub struct MessageReceiver {
    rx: broadcast::Receiver<Message>,
}

impl MessageReceiver {
    pub(crate) fn new(rx: broadcast::Receiver<Message>) -> Self {
        Self { rx }
    }

    /// Receive the next message
    ///
    /// Fails with `NotConnected` once the session it was taken from has ended
    /// and every queued message has been read, and with
    /// `Lagged` if messages were overwritten before being read; the next call
    /// resumes at the oldest retained message.
    pub async fn recv(&mut self) -> Result<Message> {
        self.rx.recv().await.map_err(|e| match e {
            broadcast::error::RecvError::Closed => AltitudeError::NotConnected,
            broadcast::error::RecvError::Lagged(n) => AltitudeError::Lagged(n),
        })
    }

    /// Try to receive a message without waiting
    ///
    /// Returns `None` if no message is queued.
    pub fn try_recv(&mut self) -> Result<Option<Message>> {
        match self.rx.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(broadcast::error::TryRecvError::Empty) => Ok(None),
            Err(broadcast::error::TryRecvError::Closed) => Err(AltitudeError::NotConnected),
            Err(broadcast::error::TryRecvError::Lagged(n)) => Err(AltitudeError::Lagged(n)),
        }
    }
}
