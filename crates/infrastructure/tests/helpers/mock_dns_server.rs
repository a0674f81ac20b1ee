#![allow(dead_code)]

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Scriptable localhost DNS server for transport tests.
///
/// The script maps the 1-based number of the received datagram and its bytes
/// to zero or more reply datagrams, so tests can drop queries, answer with
/// stale transaction ids, or reply normally.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl MockDnsServer {
    pub fn start<F>(script: F) -> std::io::Result<Self>
    where
        F: Fn(usize, &[u8]) -> Vec<Vec<u8>> + Send + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0")?;
        let addr = socket.local_addr()?;
        socket.set_read_timeout(Some(Duration::from_millis(20)))?;

        let received = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let received = received.clone();
            let stop = stop.clone();
            std::thread::spawn(move || {
                let mut buf = [0u8; 512];
                while !stop.load(Ordering::Relaxed) {
                    match socket.recv_from(&mut buf) {
                        Ok((len, peer)) => {
                            let count = received.fetch_add(1, Ordering::Relaxed) + 1;
                            for reply in script(count, &buf[..len]) {
                                let _ = socket.send_to(&reply, peer);
                            }
                        }
                        Err(_) => continue,
                    }
                }
            })
        };

        Ok(Self {
            addr,
            received,
            stop,
            handle: Some(handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Number of datagrams the server has received so far.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Minimal response to a query datagram: same id, same question, QR set,
/// the given rcode, no records.
pub fn reply_to(query: &[u8], rcode: u8) -> Vec<u8> {
    let mut reply = query.to_vec();
    reply[2] |= 0x80;
    reply[3] = (reply[3] & 0xF0) | (rcode & 0x0F);
    reply
}

/// Like [`reply_to`] but with a different transaction id, imitating a stale
/// reply from an earlier exchange.
pub fn reply_with_wrong_id(query: &[u8], rcode: u8) -> Vec<u8> {
    let mut reply = reply_to(query, rcode);
    let id = u16::from_be_bytes([reply[0], reply[1]]).wrapping_add(1);
    reply[0..2].copy_from_slice(&id.to_be_bytes());
    reply
}
