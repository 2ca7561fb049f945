//! Primary Device Attributes (DA1).
//!
//! Query: `CSI 0 c`. A VT220-or-later terminal answers `CSI ? Pp ; Ps ... c`
//! where `Pp` identifies the terminal class and each following `Ps` names a
//! feature:
//!
//! | Ps | Feature |
//! |---|---|
//! | 1 | 132 columns |
//! | 2 | printer |
//! | 3 | ReGIS graphics |
//! | 4 | Sixel graphics |
//! | 6 | selective erase |
//! | 22 | ANSI color |
//!
//! The leading value is a terminal id, not a feature flag: a VT132 answers
//! `CSI ? 4 ; 6 c` without any Sixel support.

use std::sync::LazyLock;

use regex::bytes::Regex;

use crate::{
    discovery::{query::request_response, tty::TerminalDevice},
    errors::GraphicsError,
};

/// Send Primary Device Attributes.
pub const DA1_QUERY: &[u8] = b"\x1b[0c";

/// Feature code for Sixel graphics.
pub const SIXEL_FLAG: u32 = 4;

// ASCII digits only; Unicode `\d` would also match e.g. Arabic-Indic digits
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit pattern is valid"));

/// The numbers reported in a DA1 reply, in order of appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes(Vec<u32>);

impl DeviceAttributes {
    /// Pull every run of decimal digits out of `reply`.
    ///
    /// Anything between the numbers (`ESC`, `[`, `?`, `;`, the final `c`,
    /// or unrelated bytes) is ignored. A run too large for `u32` is kept as
    /// `0` so later positions are not shifted.
    ///
    /// ```
    /// use biscuit_graphics::discovery::device_attributes::DeviceAttributes;
    ///
    /// let attrs = DeviceAttributes::parse(b"\x1b[?62;1;2;4;6;9;15;22c");
    /// assert_eq!(attrs.codes(), &[62, 1, 2, 4, 6, 9, 15, 22]);
    /// assert!(attrs.supports_sixel());
    /// ```
    pub fn parse(reply: &[u8]) -> Self {
        let codes = NUMBER
            .find_iter(reply)
            .map(|m| {
                std::str::from_utf8(m.as_bytes())
                    .ok()
                    .and_then(|digits| digits.parse().ok())
                    .unwrap_or(0)
            })
            .collect();
        Self(codes)
    }

    /// All reported values, including the leading terminal id.
    pub fn codes(&self) -> &[u32] {
        &self.0
    }

    /// The terminal class (first value), if any was reported.
    pub fn terminal_id(&self) -> Option<u32> {
        self.0.first().copied()
    }

    /// Whether `flag` appears after the terminal id.
    pub fn has_flag(&self, flag: u32) -> bool {
        self.0.iter().skip(1).any(|&code| code == flag)
    }

    /// Whether the terminal reports Sixel graphics.
    pub fn supports_sixel(&self) -> bool {
        self.has_flag(SIXEL_FLAG)
    }
}

/// Ask `device` for its primary device attributes.
///
/// ## Errors
///
/// Propagates the errors of [`request_response`].
pub fn query_device_attributes<D: TerminalDevice>(
    device: &D,
) -> Result<DeviceAttributes, GraphicsError> {
    let reply = request_response(device, DA1_QUERY)?;
    let attrs = DeviceAttributes::parse(&reply);
    tracing::debug!(codes = ?attrs.codes(), "Parsed device attributes");
    Ok(attrs)
}
