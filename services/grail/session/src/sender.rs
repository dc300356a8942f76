//! The framed stream sender.
//!
//! GRAIL encoders produce whole frames; the sender's job is to get them
//! onto the stream atomically. Writes are serialized behind an internal
//! lock so that frames from concurrent tasks never interleave, and a send
//! that cannot complete within the configured timeout fails as temporarily
//! unavailable.

use std::io::ErrorKind;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::trace;

use crate::config::SessionConfig;
use crate::error::TransportError;

/// Serializes frame writes onto the write half of a connection.
pub struct MessageSender<W> {
    inner: Mutex<W>,
    config: SessionConfig,
}

impl<W: AsyncWrite + Unpin> MessageSender<W> {
    /// Wraps the write half of a connection with the default configuration.
    #[must_use]
    pub fn new(stream: W) -> Self {
        Self::with_config(stream, SessionConfig::default())
    }

    /// Wraps the write half of a connection.
    #[must_use]
    pub fn with_config(stream: W, config: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(stream),
            config,
        }
    }

    /// Writes one whole frame, flushing it to the stream.
    ///
    /// Fails with [`TransportError::TemporarilyUnavailable`] if the write
    /// cannot complete within the configured send timeout.
    pub async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut stream = self.inner.lock().await;
        let write = async {
            stream.write_all(frame).await?;
            stream.flush().await
        };
        match timeout(self.config.send_timeout(), write).await {
            Err(_elapsed) => Err(TransportError::TemporarilyUnavailable),
            Ok(Ok(())) => {
                trace!("Sent frame of {} bytes", frame.len());
                Ok(())
            }
            Ok(Err(e))
                if matches!(
                    e.kind(),
                    ErrorKind::BrokenPipe
                        | ErrorKind::ConnectionReset
                        | ErrorKind::UnexpectedEof
                ) =>
            {
                Err(TransportError::ConnectionClosed)
            }
            Ok(Err(e)) => Err(TransportError::Stream(e)),
        }
    }
}
