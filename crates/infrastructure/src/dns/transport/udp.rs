//! UDP transport for DNS queries (RFC 1035 §4.2.1).
//!
//! One socket serves the whole lookup service: it is bound to an ephemeral
//! port at construction and reused for every exchange. Messages are sent
//! as-is, limited to 512 bytes without EDNS(0).

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use rootwalk_application::{DnsTransport, QueryObserver};
use rootwalk_domain::{
    LookupError, Message, Question, ResolverConfig, MAX_MESSAGE_SIZE,
};

use crate::dns::codec;

pub struct UdpTransport {
    socket: UdpSocket,
    observer: Arc<dyn QueryObserver>,
    port: u16,
    attempts: u32,
    timeout: Duration,
}

impl UdpTransport {
    pub fn new(
        port: u16,
        timeout: Duration,
        attempts: u32,
        observer: Arc<dyn QueryObserver>,
    ) -> std::io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        Ok(Self {
            socket,
            observer,
            port,
            attempts: attempts.max(1),
            timeout,
        })
    }

    pub fn from_config(
        config: &ResolverConfig,
        observer: Arc<dyn QueryObserver>,
    ) -> std::io::Result<Self> {
        Self::new(
            config.dns_port,
            Duration::from_millis(config.query_timeout_ms),
            config.query_attempts,
            observer,
        )
    }

    /// Waits out the remainder of one attempt's budget for a reply matching
    /// `id`. Datagrams that fail to decode or carry the wrong transaction id
    /// are discarded and the wait resumes against the same deadline.
    fn wait_for_reply(&self, id: u16) -> Result<Option<Message>, LookupError> {
        let deadline = Instant::now() + self.timeout;
        let mut buf = [0u8; MAX_MESSAGE_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            if let Err(err) = self.socket.set_read_timeout(Some(remaining)) {
                warn!(error = %err, "cannot arm receive timeout");
                return Ok(None);
            }

            match self.socket.recv_from(&mut buf) {
                Ok((len, from)) => {
                    let message = match codec::decode(&buf[..len]) {
                        Ok(message) => message,
                        Err(err) => {
                            debug!(from = %from, error = %err, "undecodable datagram ignored");
                            continue;
                        }
                    };
                    if !message.header.response || message.header.id != id {
                        debug!(
                            from = %from,
                            got = message.header.id,
                            expected = id,
                            "transaction id mismatch, still waiting"
                        );
                        continue;
                    }
                    if message.header.rcode != 0 {
                        return Err(LookupError::ServerRcode {
                            code: message.header.rcode,
                        });
                    }
                    return Ok(Some(message));
                }
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Ok(None);
                }
                Err(err) => {
                    warn!(error = %err, "receive failed");
                    return Ok(None);
                }
            }
        }
    }
}

impl DnsTransport for UdpTransport {
    fn exchange(
        &self,
        question: &Question,
        server: Ipv4Addr,
    ) -> Result<Option<Message>, LookupError> {
        let id = fastrand::u16(..);
        let query = Message::query(id, question.clone());
        let bytes =
            codec::encode(&query).map_err(|err| LookupError::InvalidName(err.to_string()))?;
        let dest = SocketAddr::V4(SocketAddrV4::new(server, self.port));

        for attempt in 1..=self.attempts {
            self.observer.query_sent(question, server, id);
            debug!(question = %question, server = %dest, id, attempt, "sending query");
            if let Err(err) = self.socket.send_to(&bytes, dest) {
                warn!(server = %dest, error = %err, "send failed, treating server as unreachable");
                return Ok(None);
            }
            if let Some(message) = self.wait_for_reply(id)? {
                return Ok(Some(message));
            }
        }

        debug!(server = %dest, id, attempts = self.attempts, "no matching reply, giving up on hop");
        Ok(None)
    }
}
