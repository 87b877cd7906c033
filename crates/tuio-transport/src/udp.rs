//! UDP transport implementation

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use tuio_core::{TuioError, TuioResult};
use tuio_osc::{OscPacket, MAX_PACKET_SIZE};

/// Default receive buffer, large enough for typical TUIO bundles
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// UDP receiver for TUIO/OSC datagrams
pub struct UdpReceiver {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    buffer_size: usize,
}

impl UdpReceiver {
    /// Bind to a local address
    pub async fn bind(addr: SocketAddr) -> TuioResult<Self> {
        let socket = UdpSocket::bind(addr)
            .await
            .map_err(|e| TuioError::Transport(e.to_string()))?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| TuioError::Transport(e.to_string()))?;

        Ok(UdpReceiver {
            socket: Arc::new(socket),
            local_addr,
            buffer_size: DEFAULT_BUFFER_SIZE,
        })
    }

    /// Set the datagram buffer size; longer datagrams are truncated by the OS
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.clamp(16, MAX_PACKET_SIZE);
        self
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and decode one datagram
    pub async fn recv_packet(&self) -> TuioResult<(OscPacket, SocketAddr)> {
        let mut buf = vec![0u8; self.buffer_size];
        let (len, addr) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| TuioError::Transport(e.to_string()))?;

        let packet = OscPacket::decode(&buf[..len])?;
        Ok((packet, addr))
    }

    /// Get a clone of the socket for concurrent operations
    pub fn socket(&self) -> Arc<UdpSocket> {
        Arc::clone(&self.socket)
    }
}

/// Handle to a running receive loop
pub struct ReceiveLoop {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ReceiveLoop {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal shutdown and wait for the loop to exit.
    ///
    /// The handler runs to completion for a datagram already received, so a
    /// stop never cuts a packet in half.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("receive loop ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for ReceiveLoop {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a background receive loop.
///
/// Every datagram is decoded and passed to `handler`, as are receive and
/// decode failures. Nothing is retried.
pub fn spawn_receive_loop<F>(receiver: UdpReceiver, mut handler: F) -> ReceiveLoop
where
    F: FnMut(TuioResult<(OscPacket, SocketAddr)>) + Send + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let local_addr = receiver.local_addr;

    let task = tokio::spawn(async move {
        let mut buf = vec![0u8; receiver.buffer_size];
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown_rx => break,
                received = receiver.socket.recv_from(&mut buf) => {
                    let item = match received {
                        Ok((len, addr)) => OscPacket::decode(&buf[..len]).map(|p| (p, addr)),
                        Err(e) => {
                            tracing::warn!("UDP receive error: {}", e);
                            Err(TuioError::Transport(e.to_string()))
                        }
                    };
                    handler(item);
                }
            }
        }
        tracing::debug!(%local_addr, "receive loop stopped");
    });

    ReceiveLoop {
        local_addr,
        shutdown: Some(shutdown_tx),
        task: Some(task),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tuio_osc::OscMessage;

    async fn sender() -> UdpSocket {
        UdpSocket::bind("127.0.0.1:0").await.unwrap()
    }

    fn fseq(frame: i32) -> Vec<u8> {
        OscPacket::from(OscMessage::new("/tuio/2Dobj").arg("fseq").arg(frame)).encode()
    }

    #[tokio::test]
    async fn test_udp_receiver_bind() {
        let receiver = UdpReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        assert_ne!(receiver.local_addr().port(), 0);
    }

    #[tokio::test]
    async fn test_recv_packet_decodes() {
        let receiver = UdpReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let tx = sender().await;

        tx.send_to(&fseq(3), receiver.local_addr()).await.unwrap();
        let (packet, from) = receiver.recv_packet().await.unwrap();

        assert_eq!(from, tx.local_addr().unwrap());
        let messages = packet.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].command(), Some("fseq"));
    }

    #[tokio::test]
    async fn test_receive_loop_forwards_packets_and_errors() {
        let receiver = UdpReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let addr = receiver.local_addr();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let handle = spawn_receive_loop(receiver, move |item| {
            let _ = events_tx.send(item.map(|(packet, _)| packet));
        });

        let tx = sender().await;
        tx.send_to(&fseq(1), addr).await.unwrap();
        tx.send_to(b"garbage!", addr).await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(first.is_ok());

        let second = tokio::time::timeout(Duration::from_secs(2), events_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(second, Err(TuioError::InvalidPacket(_))));

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_stop_ends_loop() {
        let receiver = UdpReceiver::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let handle = spawn_receive_loop(receiver, |_| {});
        assert!(!handle.is_finished());

        tokio::time::timeout(Duration::from_secs(2), handle.stop())
            .await
            .expect("receive loop did not stop");
    }
}
