//! Server output forwarding (non-UTF8-safe).
//!
//! Dev servers can emit non-UTF8 bytes on stdout/stderr. `BufReader::lines()`
//! would end the reader task on invalid UTF-8, so lines are read as bytes and
//! decoded lossily.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which output stream a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Forward a process stream to the log on a background task.
///
/// stdout lines are logged at info level, stderr lines at warn level. stderr
/// is not treated as failure.
pub fn spawn_output_forwarder(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    kind: OutputStream,
) -> JoinHandle<usize> {
    tokio::spawn(forward_lines(stream, pid, kind))
}

/// Log every line of `stream` until EOF; returns the number of lines read.
pub(crate) async fn forward_lines(
    stream: impl AsyncRead + Unpin,
    pid: u32,
    kind: OutputStream,
) -> usize {
    let mut reader = BufReader::new(stream);
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut count = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                trim_line_ending(&mut buf);
                let line = String::from_utf8_lossy(&buf);
                match kind {
                    OutputStream::Stdout => info!(pid, stream = %kind, "{line}"),
                    OutputStream::Stderr => warn!(pid, stream = %kind, "{line}"),
                }
                count += 1;
            }
            Err(e) => {
                debug!(pid, stream = %kind, error = %e, "Output reader exiting due to read error");
                break;
            }
        }
    }

    debug!(pid, stream = %kind, lines = count, "Output reader task exiting");
    count
}

fn trim_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}
