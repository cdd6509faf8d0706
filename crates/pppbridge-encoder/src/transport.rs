//! Datagram delivery to the supervisor.
//!
//! `AF_UNIX` datagrams are delivered atomically or not at all, so a short
//! send means the message exceeded what the kernel would queue and is
//! reported as [`BridgeError::PartialWrite`] instead of being retried.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::Path;

use pppbridge_common::error::{BridgeError, Result};

/// Destination that accepts a whole message per call.
pub trait DatagramSink {
    /// Sends `payload` in a single call and returns the number of bytes accepted.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the send fails.
    fn send(&self, payload: &[u8]) -> io::Result<usize>;
}

/// Connected, unbound `AF_UNIX` datagram socket.
#[derive(Debug)]
pub struct UnixDatagramSink {
    socket: UnixDatagram,
}

impl UnixDatagramSink {
    /// Creates a close-on-exec datagram socket and connects it to `path`.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Socket` if the socket cannot be created and
    /// `BridgeError::Connect` if nothing is bound at `path`.
    pub fn connect(path: &Path) -> Result<Self> {
        use nix::sys::socket::{AddressFamily, SockFlag, SockType, socket};

        let fd = socket(
            AddressFamily::Unix,
            SockType::Datagram,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|e| BridgeError::Socket { source: e.into() })?;

        let socket = UnixDatagram::from(fd);
        socket.connect(path).map_err(|e| BridgeError::Connect {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "connected to supervisor socket");
        Ok(Self { socket })
    }
}

impl DatagramSink for UnixDatagramSink {
    fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload)
    }
}

/// Sends `payload` through `sink` as one datagram.
///
/// # Errors
///
/// Returns `BridgeError::Send` if the send fails and
/// `BridgeError::PartialWrite` if fewer than `payload.len()` bytes were taken.
pub fn deliver<S: DatagramSink>(sink: &S, payload: &[u8]) -> Result<()> {
    let sent = sink
        .send(payload)
        .map_err(|e| BridgeError::Send { source: e })?;
    if sent != payload.len() {
        return Err(BridgeError::PartialWrite {
            sent,
            expected: payload.len(),
        });
    }
    tracing::debug!(bytes = sent, "datagram sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    struct ShortSink(usize);

    impl DatagramSink for ShortSink {
        fn send(&self, payload: &[u8]) -> io::Result<usize> {
            Ok(payload.len().min(self.0))
        }
    }

    #[derive(Default)]
    struct RecordingSink(RefCell<Vec<Vec<u8>>>);

    impl DatagramSink for RecordingSink {
        fn send(&self, payload: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().push(payload.to_vec());
            Ok(payload.len())
        }
    }

    struct FailingSink;

    impl DatagramSink for FailingSink {
        fn send(&self, _payload: &[u8]) -> io::Result<usize> {
            Err(nix::errno::Errno::EMSGSIZE.into())
        }
    }

    #[test]
    fn short_send_is_partial_write() {
        let err = deliver(&ShortSink(3), b"0123456789").expect_err("should fail");
        assert!(matches!(err, BridgeError::PartialWrite { sent: 3, expected: 10 }));
        assert!(err.to_string().contains("partial write"));
    }

    #[test]
    fn full_send_is_one_call() {
        let sink = RecordingSink::default();
        deliver(&sink, b"payload").expect("deliver");
        assert_eq!(sink.0.borrow().as_slice(), &[b"payload".to_vec()]);
    }

    #[test]
    fn send_error_is_reported() {
        let err = deliver(&FailingSink, b"x").expect_err("should fail");
        assert!(matches!(err, BridgeError::Send { .. }));
    }

    #[test]
    fn connect_without_listener_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.sock");
        let err = UnixDatagramSink::connect(&path).expect_err("should fail");
        assert!(matches!(err, BridgeError::Connect { .. }));
    }

    #[test]
    fn connected_sink_reaches_listener() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("supervisor.sock");
        let listener = UnixDatagram::bind(&path).expect("bind");

        let sink = UnixDatagramSink::connect(&path).expect("connect");
        deliver(&sink, b"hello").expect("deliver");

        let mut buf = [0_u8; 16];
        let n = listener.recv(&mut buf).expect("recv");
        assert_eq!(&buf[..n], b"hello");
    }
}
