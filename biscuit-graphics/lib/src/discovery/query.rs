//! Request/response exchanges with the terminal.
//!
//! A query escape sequence is written in raw mode and the reply is read
//! back. Terminals that ignore the query would leave that read blocked
//! forever, so a helper thread races it: if no reply has arrived after
//! [`RESPONSE_TIMEOUT`], the helper writes a cursor position request
//! ([`CURSOR_POSITION_NUDGE`]) which every terminal answers, and the
//! answer releases the read.
//!
//! The read is never cancelled; the nudge is what ends it.

use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use crate::{
    discovery::tty::{RawModeGuard, TerminalDevice},
    errors::GraphicsError,
};

/// How long to wait for a reply before nudging the terminal (1/16 s).
pub const RESPONSE_TIMEOUT: Duration = Duration::from_micros(62_500);

/// Report Cursor Position, written only to make input arrive.
pub const CURSOR_POSITION_NUDGE: &[u8] = b"\x1b\x1b[6n";

/// Largest reply captured by a single query.
pub const MAX_RESPONSE_LEN: usize = 1024;

/// Write `request` to `device` in raw mode and capture the reply.
///
/// The reply only counts when bytes were read *and* the nudge had to be
/// sent. A read that finishes before the timer yields an empty reply.
///
/// ## Errors
///
/// - [`GraphicsError::NonTty`] if `device` is not an interactive terminal
/// - [`GraphicsError::TermResponseTimedOut`] if the timer fired and no bytes
///   were read
/// - [`GraphicsError::Io`] for failures switching modes, writing the request
///   or reading
///
/// The original terminal mode is restored before returning on every path.
pub fn request_response<D: TerminalDevice>(
    device: &D,
    request: &[u8],
) -> Result<Vec<u8>, GraphicsError> {
    if !device.is_terminal() {
        return Err(GraphicsError::NonTty);
    }

    let guard = RawModeGuard::enter(device)?;
    let outcome = exchange(device, request);
    let restored = guard.restore();

    // an exchange failure wins over a restore failure
    let reply = outcome?;
    restored?;
    Ok(reply)
}

fn exchange<D: TerminalDevice>(device: &D, request: &[u8]) -> Result<Vec<u8>, GraphicsError> {
    device.write_all(request)?;

    let mut buf = [0u8; MAX_RESPONSE_LEN];
    let (done_tx, done_rx) = mpsc::channel::<()>();

    let (read_result, fired) = thread::scope(|scope| {
        let timer = scope.spawn(move || match done_rx.recv_timeout(RESPONSE_TIMEOUT) {
            Err(RecvTimeoutError::Timeout) => {
                tracing::debug!(
                    timeout_ms = RESPONSE_TIMEOUT.as_secs_f64() * 1000.0,
                    "No terminal reply yet, sending cursor position request"
                );
                if let Err(e) = device.write_all(CURSOR_POSITION_NUDGE) {
                    tracing::debug!(error = %e, "Failed to write cursor position request");
                }
                true
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        });

        let read_result = device.read(&mut buf);
        // the timer may already have fired, in which case nobody is listening
        let _ = done_tx.send(());
        let fired = timer.join().unwrap_or(true);
        (read_result, fired)
    });

    if fired {
        return match read_result {
            Ok(n) if n > 0 => {
                tracing::debug!(bytes = n, "Captured terminal reply");
                Ok(buf[..n].to_vec())
            }
            _ => Err(GraphicsError::TermResponseTimedOut),
        };
    }

    let n = read_result?;
    tracing::debug!(bytes = n, "Read finished before the timer; reply ignored");
    Ok(Vec::new())
}
