//! Terminal capability detection
//!
//! Only Sixel support is discovered by talking to the terminal; Kitty and
//! iTerm support come from environment signals (see [`crate::config`]).

pub mod device_attributes;
pub mod query;
pub mod tty;

use crate::{
    discovery::{device_attributes::query_device_attributes, tty::TerminalDevice},
    errors::GraphicsError,
};

/// Whether the terminal on stdin/stdout reports Sixel graphics.
///
/// Any failure (not a tty, no reply, I/O error) means "no".
#[cfg(unix)]
pub fn has_sixel_support() -> bool {
    sixel_support_on(&tty::StdioTerminal::new())
}

/// Sixel probing is unix-only.
#[cfg(not(unix))]
pub fn has_sixel_support() -> bool {
    tracing::debug!("has_sixel_support(): not supported on this platform");
    false
}

/// Whether `device` reports Sixel graphics. Errors fold into `false`.
pub fn sixel_support_on<D: TerminalDevice>(device: &D) -> bool {
    match query_device_attributes(device) {
        Ok(attrs) => {
            let supported = attrs.supports_sixel();
            tracing::info!(supported, codes = ?attrs.codes(), "Sixel capability probed");
            supported
        }
        Err(e) => {
            log_probe_failure(&e);
            false
        }
    }
}

fn log_probe_failure(e: &GraphicsError) {
    if e.is_capability_absent() {
        tracing::debug!(error = %e, "Sixel capability absent");
    } else {
        tracing::warn!(error = %e, "Sixel capability probe failed");
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::discovery::tty::fake::{FakeTerminal, Script};

    #[test]
    fn test_non_tty_means_no_sixel() {
        assert!(!sixel_support_on(&FakeTerminal::new(Script::default())));
    }

    #[test]
    fn test_timeout_means_no_sixel() {
        let term = FakeTerminal::new(Script {
            is_tty: true,
            eof_on_nudge: true,
            ..Script::default()
        });
        assert!(!sixel_support_on(&term));
        term.with_state(|s| assert!(!s.raw));
    }

    #[test]
    fn test_io_failure_means_no_sixel() {
        let term = FakeTerminal::new(Script {
            is_tty: true,
            read_error: Some(io::ErrorKind::Other),
            ..Script::default()
        });
        assert!(!sixel_support_on(&term));
    }

    #[test]
    fn test_sixel_terminal_is_detected() {
        let term = FakeTerminal::new(Script {
            is_tty: true,
            nudge_reply: Some(b"\x1b[?62;1;2;4;6;9;15;22c".to_vec()),
            ..Script::default()
        });
        assert!(sixel_support_on(&term));
    }

    #[test]
    fn test_silent_terminal_has_no_sixel() {
        assert!(!sixel_support_on(&FakeTerminal::silent()));
    }
}
