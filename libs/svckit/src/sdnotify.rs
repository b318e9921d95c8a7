// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! systemd service notification (sd_notify) client
//!
//! Every notification is one datagram of newline-separated `KEY=VALUE`
//! pairs sent to the socket named by `NOTIFY_SOCKET`. The process-wide
//! connection is made once by [`connect`] and shared by all helpers.

use once_cell::sync::OnceCell;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub const SOCKET_ENV: &str = "NOTIFY_SOCKET";

static NOTIFIER: OnceCell<Notifier> = OnceCell::new();

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("NOTIFY_SOCKET is not set")]
    NoSocket,

    #[error("failed to connect to notify socket {path}: {source}")]
    Dial {
        path: String,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("not connected to notify socket")]
    NotConnected,

    #[error("failed to send notification: {0}")]
    Write(#[source] nix::errno::Errno),

    #[error("sd_notify is not supported on this platform")]
    Unsupported,
}

/// Connection to a notification socket
#[derive(Debug)]
pub struct Notifier {
    #[cfg(target_os = "linux")]
    fd: std::os::fd::OwnedFd,
}

#[cfg(target_os = "linux")]
impl Notifier {
    /// Connect to a socket path; a leading `@` names an abstract socket
    pub fn connect(path: &str) -> Result<Self, NotifyError> {
        use nix::sys::socket::{self, AddressFamily, SockFlag, SockType, UnixAddr};
        use std::os::fd::AsRawFd;

        if path.is_empty() {
            return Err(NotifyError::NoSocket);
        }

        let dial = |source: nix::errno::Errno| NotifyError::Dial { path: path.to_string(), source };

        let addr = match path.strip_prefix('@') {
            Some(name) => UnixAddr::new_abstract(name.as_bytes()),
            None => UnixAddr::new(path),
        }
        .map_err(dial)?;

        let fd = socket::socket(
            AddressFamily::Unix,
            SockType::Datagram,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(dial)?;

        socket::connect(fd.as_raw_fd(), &addr).map_err(dial)?;
        log::debug!("connected to notify socket {}", path);

        Ok(Self { fd })
    }

    /// Send one notification datagram
    pub fn send(&self, msg: &str) -> Result<(), NotifyError> {
        use nix::sys::socket::{self, MsgFlags};
        use std::os::fd::AsRawFd;

        socket::send(self.fd.as_raw_fd(), msg.as_bytes(), MsgFlags::MSG_NOSIGNAL)
            .map_err(NotifyError::Write)?;

        Ok(())
    }
}

#[cfg(not(target_os = "linux"))]
impl Notifier {
    pub fn connect(_path: &str) -> Result<Self, NotifyError> {
        Err(NotifyError::Unsupported)
    }

    pub fn send(&self, _msg: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

impl Notifier {
    /// Connect to the socket named by `NOTIFY_SOCKET`
    pub fn connect_env() -> Result<Self, NotifyError> {
        let path = std::env::var(SOCKET_ENV).unwrap_or_default();
        Self::connect(&path)
    }
}

/// Connect the process-wide notifier
///
/// Later calls reuse the existing connection.
pub fn connect() -> Result<(), NotifyError> {
    if !cfg!(target_os = "linux") {
        return Err(NotifyError::Unsupported);
    }

    if NOTIFIER.get().is_some() {
        return Ok(());
    }

    let notifier = Notifier::connect_env()?;
    // A concurrent connect may have won; its connection is kept
    let _ = NOTIFIER.set(notifier);

    Ok(())
}

/// Send a raw message over the process-wide connection
pub fn notify(msg: &str) -> Result<(), NotifyError> {
    if !cfg!(target_os = "linux") {
        return Err(NotifyError::Unsupported);
    }

    NOTIFIER.get().ok_or(NotifyError::NotConnected)?.send(msg)
}

pub fn ready() -> Result<(), NotifyError> {
    notify("READY=1")
}

pub fn reloading() -> Result<(), NotifyError> {
    notify("RELOADING=1")
}

pub fn stopping() -> Result<(), NotifyError> {
    notify("STOPPING=1")
}

pub fn main_pid(pid: u32) -> Result<(), NotifyError> {
    notify(&format!("MAINPID={}", pid))
}

pub fn extend_timeout(timeout: Duration) -> Result<(), NotifyError> {
    notify(&extend_timeout_message(timeout))
}

pub fn watchdog() -> Result<(), NotifyError> {
    notify("WATCHDOG=1")
}

pub fn errno(code: i32) -> Result<(), NotifyError> {
    notify(&format!("ERRNO={}", code))
}

/// Send a formatted payload; the caller includes the key
///
/// ```no_run
/// svckit::sdnotify::status(format_args!("STATUS=processed {} jobs", 12)).ok();
/// ```
pub fn status(args: fmt::Arguments<'_>) -> Result<(), NotifyError> {
    notify(&args.to_string())
}

fn extend_timeout_message(timeout: Duration) -> String {
    format!("EXTEND_TIMEOUT_USEC={}", timeout.as_micros())
}

/// Watchdog interval requested by the service manager, if any
///
/// Reads `WATCHDOG_USEC` and, when present, checks that `WATCHDOG_PID`
/// names this process.
pub fn watchdog_interval() -> Option<Duration> {
    let usec = std::env::var("WATCHDOG_USEC").ok();
    let pid = std::env::var("WATCHDOG_PID").ok();
    parse_watchdog(usec.as_deref(), pid.as_deref(), std::process::id())
}

fn parse_watchdog(usec: Option<&str>, pid: Option<&str>, own_pid: u32) -> Option<Duration> {
    let usec: u64 = usec?.trim().parse().ok().filter(|v| *v > 0)?;

    if let Some(pid) = pid {
        if pid.trim().parse::<u32>().ok()? != own_pid {
            return None;
        }
    }

    Some(Duration::from_micros(usec))
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use std::os::unix::net::UnixDatagram;

    fn listener() -> (tempfile::TempDir, String, UnixDatagram) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.sock");
        let sock = UnixDatagram::bind(&path).unwrap();
        (dir, path.to_string_lossy().into_owned(), sock)
    }

    fn recv(sock: &UnixDatagram) -> String {
        let mut buf = [0u8; 512];
        let n = sock.recv(&mut buf).unwrap();
        String::from_utf8_lossy(&buf[..n]).into_owned()
    }

    #[test]
    fn test_send() {
        let (_dir, path, sock) = listener();
        let notifier = Notifier::connect(&path).unwrap();

        notifier.send("READY=1").unwrap();
        assert_eq!(recv(&sock), "READY=1");

        notifier.send("STATUS=working\nMAINPID=42").unwrap();
        assert_eq!(recv(&sock), "STATUS=working\nMAINPID=42");
    }

    #[test]
    fn test_abstract_socket() {
        let name = format!("svckit-test-{}", std::process::id());

        use std::os::linux::net::SocketAddrExt;
        let addr = std::os::unix::net::SocketAddr::from_abstract_name(name.as_bytes()).unwrap();
        let sock = UnixDatagram::bind_addr(&addr).unwrap();

        let notifier = Notifier::connect(&format!("@{}", name)).unwrap();
        notifier.send("WATCHDOG=1").unwrap();
        assert_eq!(recv(&sock), "WATCHDOG=1");
    }

    #[test]
    fn test_connect_errors() {
        assert!(matches!(Notifier::connect(""), Err(NotifyError::NoSocket)));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.sock");
        let err = Notifier::connect(&missing.to_string_lossy()).unwrap_err();
        assert!(matches!(err, NotifyError::Dial { .. }));
    }

    #[test]
    fn test_not_connected() {
        // No test connects the process-wide notifier
        assert!(matches!(ready(), Err(NotifyError::NotConnected)));
        assert!(matches!(notify("X=1"), Err(NotifyError::NotConnected)));
    }

    #[test]
    fn test_extend_timeout_message() {
        assert_eq!(
            extend_timeout_message(Duration::from_secs_f64(1.5)),
            "EXTEND_TIMEOUT_USEC=1500000"
        );
        assert_eq!(
            extend_timeout_message(Duration::from_nanos(2_999)),
            "EXTEND_TIMEOUT_USEC=2"
        );
    }

    #[test]
    fn test_parse_watchdog() {
        assert_eq!(parse_watchdog(Some("30000000"), None, 1), Some(Duration::from_secs(30)));
        assert_eq!(parse_watchdog(Some("500"), Some("7"), 7), Some(Duration::from_micros(500)));
        assert_eq!(parse_watchdog(Some("500"), Some("8"), 7), None);
        assert_eq!(parse_watchdog(Some("0"), None, 7), None);
        assert_eq!(parse_watchdog(Some("abc"), None, 7), None);
        assert_eq!(parse_watchdog(None, None, 7), None);
    }
}
