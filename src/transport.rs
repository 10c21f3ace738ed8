//! Point-to-point channel to the environment.
//!
//! [`Channel`] is the seam between the client loop and the wire. The
//! production implementation is [`ZmqChannel`], a ZeroMQ PAIR socket that
//! owns its context for its whole lifetime.

use crate::error::ClientError;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, info};

/// A bidirectional, message-oriented link to exactly one peer.
pub trait Channel {
    /// Send one message.
    fn send(&mut self, payload: &[u8]) -> zmq::Result<()>;

    /// Wait up to `wait` for the next message.
    ///
    /// Returns `Ok(None)` if nothing arrived in time. A wait cut short by a
    /// signal handler returns `Err(zmq::Error::EINTR)`.
    fn recv(&mut self, wait: Duration) -> zmq::Result<Option<Bytes>>;

    /// Release the link.
    fn close(self) -> zmq::Result<()>
    where
        Self: Sized;
}

/// ZeroMQ PAIR socket connected to the environment.
pub struct ZmqChannel {
    context: zmq::Context,
    socket: zmq::Socket,
    endpoint: String,
}

impl ZmqChannel {
    /// Create a context and a PAIR socket, then connect it to `endpoint`.
    ///
    /// ZeroMQ connects in the background, so an absent peer is not reported
    /// here; only endpoints the library rejects are.
    pub fn connect(endpoint: &str, linger: Duration) -> Result<Self, ClientError> {
        let context = zmq::Context::new();
        let socket = context.socket(zmq::PAIR).map_err(ClientError::Socket)?;

        let linger_ms = i32::try_from(linger.as_millis()).unwrap_or(i32::MAX);
        socket.set_linger(linger_ms).map_err(ClientError::Socket)?;

        socket
            .connect(endpoint)
            .map_err(|source| ClientError::Connect {
                endpoint: endpoint.to_string(),
                source,
            })?;

        info!(endpoint, linger_ms, "Connected PAIR socket");

        Ok(Self {
            context,
            socket,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Channel for ZmqChannel {
    fn send(&mut self, payload: &[u8]) -> zmq::Result<()> {
        self.socket.send(payload, 0)
    }

    fn recv(&mut self, wait: Duration) -> zmq::Result<Option<Bytes>> {
        let timeout_ms = i64::try_from(wait.as_millis()).unwrap_or(i64::MAX);
        if self.socket.poll(zmq::POLLIN, timeout_ms)? == 0 {
            return Ok(None);
        }
        let message = self.socket.recv_bytes(0)?;
        Ok(Some(Bytes::from(message)))
    }

    fn close(self) -> zmq::Result<()> {
        let ZmqChannel {
            mut context,
            socket,
            endpoint,
        } = self;

        // The context cannot terminate while a socket is still open.
        drop(socket);
        context.destroy()?;

        debug!(endpoint = %endpoint, "Destroyed context");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bound_peer(context: &zmq::Context) -> (zmq::Socket, String) {
        let peer = context.socket(zmq::PAIR).unwrap();
        peer.set_rcvtimeo(5000).unwrap();
        peer.set_linger(0).unwrap();
        peer.bind("tcp://127.0.0.1:*").unwrap();
        let endpoint = peer.get_last_endpoint().unwrap().unwrap();
        (peer, endpoint)
    }

    #[test]
    fn test_connect_rejects_bad_endpoint() {
        match ZmqChannel::connect("not-an-endpoint", Duration::ZERO) {
            Err(ClientError::Connect { endpoint, .. }) => assert_eq!(endpoint, "not-an-endpoint"),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connect should fail"),
        }
    }

    #[test]
    fn test_send_and_recv() {
        let context = zmq::Context::new();
        let (peer, endpoint) = bound_peer(&context);

        let mut channel = ZmqChannel::connect(&endpoint, Duration::from_millis(500)).unwrap();
        assert_eq!(channel.endpoint(), endpoint);

        channel.send(b"hello").unwrap();
        assert_eq!(peer.recv_bytes(0).unwrap(), b"hello");

        peer.send(&b"1"[..], 0).unwrap();
        let message = channel.recv(Duration::from_secs(5)).unwrap();
        assert_eq!(message.as_deref(), Some(&b"1"[..]));

        channel.close().unwrap();
    }

    #[test]
    fn test_recv_times_out_quietly() {
        let context = zmq::Context::new();
        let (_peer, endpoint) = bound_peer(&context);

        let mut channel = ZmqChannel::connect(&endpoint, Duration::ZERO).unwrap();
        assert_eq!(channel.recv(Duration::from_millis(20)).unwrap(), None);
        channel.close().unwrap();
    }
}
