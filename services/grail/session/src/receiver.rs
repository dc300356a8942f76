//! The framed stream reader: byte stream in, whole messages out.
//!
//! The receiver owns a carry buffer of bytes belonging to an unfinished
//! message. [`MessageReceiver::next_message`] blocks until a whole frame
//! has arrived; [`MessageReceiver::message_available`] probes for at most
//! one poll interval. Both run behind one internal lock, so concurrent
//! callers on the same receiver serialize, and both honor a caller-owned
//! cancel flag. Returned frames include the 4-byte length prefix; decoders
//! expect to read the length first.

use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use grail_wire::FrameDecoder;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use tokio::time::{sleep, timeout};
use tracing::trace;

use crate::config::SessionConfig;
use crate::error::TransportError;

/// A cancellation flag shared between a receiver's caller and the tasks
/// blocked in it. Setting the flag makes `message_available` return false
/// and `next_message` return an empty buffer promptly.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the flag. Cancellation is permanent for the flag's lifetime.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once the flag has been set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How long a fill pass keeps trying to complete a frame.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FillMode {
    /// Poll for at most one interval, then give up quietly.
    Probe,
    /// Keep reading until a frame completes or the caller cancels.
    Block,
}

/// What a fill pass produced.
enum Filled {
    /// A whole frame is buffered.
    Ready,
    /// No whole frame arrived within the probe window.
    Quiet,
    /// The cancel flag was set.
    Cancelled,
}

struct Inner<R> {
    stream: R,
    carry: BytesMut,
    decoder: FrameDecoder,
}

/// Reassembles length-prefixed messages from a byte stream.
pub struct MessageReceiver<R> {
    inner: Mutex<Inner<R>>,
    config: SessionConfig,
}

impl<R: AsyncRead + Unpin> MessageReceiver<R> {
    /// Wraps the read half of a connection with the default configuration.
    #[must_use]
    pub fn new(stream: R) -> Self {
        Self::with_config(stream, SessionConfig::default())
    }

    /// Wraps the read half of a connection.
    #[must_use]
    pub fn with_config(stream: R, config: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                stream,
                carry: BytesMut::with_capacity(config.recv_buffer_bytes),
                decoder: FrameDecoder::with_max_frame_size(config.max_frame_bytes),
            }),
            config,
        }
    }

    /// Non-blocking probe: returns true if `next_message` would return a
    /// frame immediately. Polls the stream for at most one poll interval
    /// when the carry buffer holds no whole frame. Returns false without
    /// reading when the cancel flag is set.
    pub async fn message_available(
        &self,
        cancel: &CancelFlag,
    ) -> Result<bool, TransportError> {
        let mut inner = self.inner.lock().await;
        match self.fill(&mut inner, FillMode::Probe, cancel).await? {
            Filled::Ready => Ok(true),
            Filled::Quiet | Filled::Cancelled => Ok(false),
        }
    }

    /// Returns the next whole message, blocking until one arrives or the
    /// cancel flag is set. On cancellation the returned buffer is empty.
    pub async fn next_message(&self, cancel: &CancelFlag) -> Result<Bytes, TransportError> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        match self.fill(inner, FillMode::Block, cancel).await? {
            Filled::Cancelled => Ok(Bytes::new()),
            Filled::Quiet => unreachable!("blocking fill only ends ready or cancelled"),
            Filled::Ready => {
                let frame = inner
                    .decoder
                    .decode(&mut inner.carry)?
                    .expect("fill reported a complete frame");
                trace!("Sliced frame of {} bytes", frame.len());
                Ok(frame)
            }
        }
    }

    // Reads from the stream into the carry buffer until it holds a whole
    // frame, the caller cancels, or (in probe mode) one poll interval
    // passes without producing a frame.
    async fn fill(
        &self,
        inner: &mut Inner<R>,
        mode: FillMode,
        cancel: &CancelFlag,
    ) -> Result<Filled, TransportError> {
        loop {
            if inner.decoder.frame_ready(&inner.carry)? {
                return Ok(Filled::Ready);
            }
            if cancel.is_cancelled() {
                return Ok(Filled::Cancelled);
            }

            let Inner { stream, carry, .. } = inner;
            carry.reserve(self.config.recv_buffer_bytes);
            match timeout(self.config.poll_interval(), stream.read_buf(carry)).await {
                // Poll window passed without data.
                Err(_elapsed) => {
                    if mode == FillMode::Probe {
                        return Ok(Filled::Quiet);
                    }
                }
                Ok(Ok(0)) => return Err(TransportError::ConnectionClosed),
                Ok(Ok(n)) => {
                    trace!("Read {} bytes, carry now has {} bytes", n, carry.len());
                    if mode == FillMode::Probe {
                        return if inner.decoder.frame_ready(&inner.carry)? {
                            Ok(Filled::Ready)
                        } else {
                            Ok(Filled::Quiet)
                        };
                    }
                }
                Ok(Err(e)) if e.kind() == ErrorKind::WouldBlock => {
                    if mode == FillMode::Probe {
                        return Ok(Filled::Quiet);
                    }
                    sleep(self.config.retry_sleep()).await;
                }
                Ok(Err(e)) => return Err(TransportError::Stream(e)),
            }
        }
    }
}
