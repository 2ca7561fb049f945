//! Environment signals that drive protocol availability.
//!
//! The environment is the only configuration surface:
//!
//! | Variable | Used for |
//! |---|---|
//! | `TERM` | `xterm-kitty` (Kitty), `mintty` (iTerm) |
//! | `TERM_PROGRAM` | `ghostty` (Kitty), `wezterm` (iTerm) |
//! | `LC_TERMINAL` | `iterm2` (iTerm) |
//! | `TERM_GRAPHICS` | override: `kitty`, `iterm`, `sixel` or `none` |
//!
//! `TERM_GRAPHICS` is read once per process; later changes to the variable
//! are not observed.

use std::{env, sync::OnceLock};

/// Name of the override variable.
pub const TERM_GRAPHICS_ENV: &str = "TERM_GRAPHICS";

static TERM_GRAPHICS: OnceLock<String> = OnceLock::new();

/// The lowercased `TERM_GRAPHICS` value, captured on first access.
pub fn term_graphics_override() -> &'static str {
    TERM_GRAPHICS.get_or_init(|| {
        let value = env::var(TERM_GRAPHICS_ENV)
            .unwrap_or_default()
            .to_lowercase();
        if !value.is_empty() {
            tracing::debug!(term_graphics = %value, "TERM_GRAPHICS override set");
        }
        value
    })
}

/// A snapshot of the environment signals, all lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSignals {
    /// `TERM`
    pub term: String,
    /// `TERM_PROGRAM`
    pub term_program: String,
    /// `LC_TERMINAL`
    pub lc_terminal: String,
    /// `TERM_GRAPHICS` (process-wide cached value)
    pub term_graphics: String,
}

impl EnvSignals {
    /// Read the current process environment.
    pub fn from_env() -> Self {
        let read = |key: &str| env::var(key).unwrap_or_default().to_lowercase();
        Self {
            term: read("TERM"),
            term_program: read("TERM_PROGRAM"),
            lc_terminal: read("LC_TERMINAL"),
            term_graphics: term_graphics_override().to_string(),
        }
    }

    /// Whether `TERM_GRAPHICS` names exactly `token`.
    pub fn forces(&self, token: &str) -> bool {
        self.term_graphics == token
    }

    /// Whether graphics are switched off with `TERM_GRAPHICS=none`.
    pub fn disabled(&self) -> bool {
        self.forces("none")
    }

    /// Kitty heuristics: override, `TERM=xterm-kitty`, or Ghostty.
    pub fn kitty_available(&self) -> bool {
        !self.disabled()
            && (self.forces("kitty")
                || self.term == "xterm-kitty"
                || self.term_program == "ghostty")
    }

    /// iTerm heuristics: override, mintty, iTerm2 or WezTerm.
    pub fn iterm_available(&self) -> bool {
        !self.disabled()
            && (self.forces("iterm")
                || self.term == "mintty"
                || self.lc_terminal == "iterm2"
                || self.term_program == "wezterm")
    }

    /// Sixel availability: override, or else whatever `probe` reports.
    ///
    /// `probe` is only invoked when the override neither forces nor
    /// disables Sixel.
    pub fn sixel_available(&self, probe: impl FnOnce() -> bool) -> bool {
        !self.disabled() && (self.forces("sixel") || probe())
    }
}
