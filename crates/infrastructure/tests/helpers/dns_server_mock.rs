#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::oneshot;

/// How the mock answers a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// One A record, 192.0.2.1
    Answer,
    /// TC=1 and no records over UDP, the full answer over TCP
    Truncate,
    ServFail,
    NxDomain,
    /// Never replies
    Silent,
    /// Replies with the ID off by one
    WrongId,
    /// Ignores the first `n` UDP queries, then answers
    DropFirst(usize),
}

/// UDP + TCP DNS server on 127.0.0.1 with scripted replies
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(behavior: Behavior) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let queries = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let counter = Arc::clone(&queries);
        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            let seen = counter.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = Self::udp_reply(behavior, seen, &buf[..len]) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    accepted = listener.accept() => {
                        if let Ok((stream, _)) = accepted {
                            tokio::spawn(Self::serve_tcp(stream, behavior));
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// UDP queries received so far
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    async fn serve_tcp(mut stream: tokio::net::TcpStream, behavior: Behavior) {
        let mut len_buf = [0u8; 2];
        if stream.read_exact(&mut len_buf).await.is_err() {
            return;
        }
        let mut query = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        if stream.read_exact(&mut query).await.is_err() {
            return;
        }

        let response = match behavior {
            Behavior::ServFail => Self::build_response(&query, 2, false, false),
            Behavior::NxDomain => Self::build_response(&query, 3, false, false),
            _ => Self::build_response(&query, 0, false, true),
        };
        let mut framed = (response.len() as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&response);
        let _ = stream.write_all(&framed).await;
    }

    fn udp_reply(behavior: Behavior, seen: usize, query: &[u8]) -> Option<Vec<u8>> {
        match behavior {
            Behavior::Answer => Some(Self::build_response(query, 0, false, true)),
            Behavior::Truncate => Some(Self::build_response(query, 0, true, false)),
            Behavior::ServFail => Some(Self::build_response(query, 2, false, false)),
            Behavior::NxDomain => Some(Self::build_response(query, 3, false, false)),
            Behavior::Silent => None,
            Behavior::WrongId => {
                let mut response = Self::build_response(query, 0, false, true);
                let id = u16::from_be_bytes([response[0], response[1]]).wrapping_add(1);
                response[..2].copy_from_slice(&id.to_be_bytes());
                Some(response)
            }
            Behavior::DropFirst(n) if seen < n => None,
            Behavior::DropFirst(_) => Some(Self::build_response(query, 0, false, true)),
        }
    }

    /// End of the question section: QNAME labels, then QTYPE and QCLASS
    fn question_end(query: &[u8]) -> usize {
        let mut pos = 12;
        while pos < query.len() && query[pos] != 0 {
            pos += usize::from(query[pos]) + 1;
        }
        (pos + 5).min(query.len())
    }

    /// Echoes ID and question; one A record when `answer` is set
    pub fn build_response(query: &[u8], rcode: u8, truncated: bool, answer: bool) -> Vec<u8> {
        if query.len() < 12 {
            return vec![];
        }

        let mut response = Vec::with_capacity(512);
        response.extend_from_slice(&query[0..2]);

        // QR=1, AA=1, TC as requested, RD copied
        let mut flags_hi = 0x84 | (query[2] & 0x01);
        if truncated {
            flags_hi |= 0x02;
        }
        response.push(flags_hi);
        response.push(rcode & 0x0f);

        response.extend_from_slice(&[0x00, 0x01]);
        response.extend_from_slice(&[0x00, u8::from(answer)]);
        response.extend_from_slice(&[0x00, 0x00]);
        response.extend_from_slice(&[0x00, 0x00]);

        response.extend_from_slice(&query[12..Self::question_end(query)]);

        if answer {
            response.extend_from_slice(&[
                0xc0, 0x0c, // Name pointer to question
                0x00, 0x01, // Type A
                0x00, 0x01, // Class IN
                0x00, 0x00, 0x00, 0x3c, // TTL: 60 seconds
                0x00, 0x04, // Data length: 4 bytes
                192, 0, 2, 1,
            ]);
        }

        response
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
