//! TCP transport for GRAIL connections.
//!
//! The codec treats the socket as an opaque byte stream; these helpers
//! only establish it. A connected stream is usually split, with the read
//! half handed to a [`crate::MessageReceiver`] and the write half to a
//! [`crate::MessageSender`].

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::debug;

/// Create a TCP listener bound to the given address
pub async fn listen(addr: SocketAddr) -> tokio::io::Result<TcpListener> {
    let listener = TcpListener::bind(addr).await?;
    debug!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Connect to a TCP address
pub async fn connect(addr: SocketAddr) -> tokio::io::Result<TcpStream> {
    let stream = TcpStream::connect(addr).await?;
    debug!("Connected to {}", addr);
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[tokio::test]
    async fn listen_and_connect() {
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0);
        let listener = listen(addr).await.unwrap();
        let bound_addr = listener.local_addr().unwrap();

        let stream = connect(bound_addr).await.unwrap();
        assert!(stream.peer_addr().is_ok());
    }
}
