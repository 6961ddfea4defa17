//! Outbound frame queue
//!
//! The writer loop is the only owner of the socket's write half once an attempt
//! is running; everything else enqueues frames through [`Outbound`].

use crate::handlers::GatewayError;
use crate::protocol::GatewayMessage;
use futures_util::{Sink, SinkExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, Message};

/// Channel buffer size for outgoing messages
const MESSAGE_BUFFER_SIZE: usize = 100;

/// Sending half of the writer queue
#[derive(Debug, Clone)]
pub struct Outbound {
    sender: mpsc::Sender<GatewayMessage>,
}

impl Outbound {
    /// Create a queue and the receiver the writer loop drains
    #[must_use]
    pub fn channel() -> (Self, mpsc::Receiver<GatewayMessage>) {
        let (sender, receiver) = mpsc::channel(MESSAGE_BUFFER_SIZE);
        (Self { sender }, receiver)
    }

    /// Queue a frame for the writer loop
    pub async fn send(&self, message: GatewayMessage) -> Result<(), GatewayError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GatewayError::WriterClosed)
    }
}

/// Encode and write a single frame
pub async fn write_frame<Si>(sink: &mut Si, message: &GatewayMessage) -> Result<(), GatewayError>
where
    Si: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    let text = message.to_json()?;
    sink.send(Message::Text(text)).await?;

    tracing::trace!(op = %message.op, "Frame sent");
    Ok(())
}

/// Drain the queue into the socket until a write fails
pub async fn write_loop<Si>(sink: &mut Si, mut receiver: mpsc::Receiver<GatewayMessage>) -> GatewayError
where
    Si: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    while let Some(message) = receiver.recv().await {
        if let Err(e) = write_frame(sink, &message).await {
            return e;
        }
    }

    GatewayError::WriterClosed
}
