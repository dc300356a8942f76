//! The handshake exchange that opens every GRAIL connection.
//!
//! Each endpoint sends its handshake frame first, then reads the peer's
//! and verifies the protocol string and version. On a mismatch the caller
//! is expected to close the connection; there is no rejection message.

use grail_proto::ProtocolId;
use grail_wire::LEN_PREFIX_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::TransportError;

// A handshake frame is the protocol string plus version and extension
// bytes; nothing legitimate comes close to this.
const MAX_HANDSHAKE_BODY: usize = 256;

/// Sends this endpoint's handshake and verifies the peer's.
///
/// Both sides send first and read second, so the exchange cannot deadlock.
/// Returns [`TransportError::HandshakeFailed`] when the peer speaks a
/// different protocol or version.
pub async fn exchange_handshake<S>(
    stream: &mut S,
    protocol: ProtocolId,
) -> Result<(), TransportError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ours = protocol.encode_handshake();
    let written = async {
        stream.write_all(&ours).await?;
        stream.flush().await
    };
    match written.await {
        Ok(()) => {}
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe | std::io::ErrorKind::ConnectionReset
            ) =>
        {
            return Err(TransportError::ConnectionClosed);
        }
        Err(e) => return Err(TransportError::Stream(e)),
    }
    debug!("Sent handshake for \"{}\"", protocol);

    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    read_exact_or_closed(stream, &mut prefix).await?;
    let body_len = u32::from_be_bytes(prefix) as usize;
    if body_len > MAX_HANDSHAKE_BODY {
        return Err(TransportError::HandshakeFailed { expected: protocol });
    }

    let mut frame = vec![0u8; LEN_PREFIX_SIZE + body_len];
    frame[..LEN_PREFIX_SIZE].copy_from_slice(&prefix);
    read_exact_or_closed(stream, &mut frame[LEN_PREFIX_SIZE..]).await?;

    match ProtocolId::decode_handshake(&frame) {
        Some((peer, version, _extension)) if peer == protocol && version == 0 => {
            debug!("Peer handshake verified for \"{}\"", protocol);
            Ok(())
        }
        _ => Err(TransportError::HandshakeFailed { expected: protocol }),
    }
}

async fn read_exact_or_closed<S: AsyncRead + Unpin>(
    stream: &mut S,
    buf: &mut [u8],
) -> Result<(), TransportError> {
    match stream.read_exact(buf).await {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(TransportError::ConnectionClosed)
        }
        Err(e) => Err(TransportError::Stream(e)),
    }
}
