//! The terminal graphics protocol selector.
//!
//! `TermType` names a graphics protocol and doubles as the value of the
//! `TERM_GRAPHICS` environment variable. Parsing is deliberately lenient:
//! an empty token means [`TermType::Default`] and any token that names no
//! protocol means [`TermType::None`].
//!
//! ## Examples
//!
//! ```
//! use biscuit_graphics::TermType;
//!
//! let typ: TermType = "Kitty".parse().unwrap();
//! assert_eq!(typ, TermType::Kitty);
//! assert_eq!(typ.to_string(), "kitty");
//!
//! assert_eq!("".parse::<TermType>().unwrap(), TermType::Default);
//! assert_eq!("vt340".parse::<TermType>().unwrap(), TermType::None);
//! ```

use std::{convert::Infallible, fmt, io::Write, str::FromStr};

use image::DynamicImage;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{errors::GraphicsError, registry};

/// A terminal graphics protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TermType {
    /// No graphics.
    None = 0,
    /// The [Kitty graphics protocol](https://sw.kovidgoyal.net/kitty/graphics-protocol/).
    Kitty = 1,
    /// The [iTerm inline images protocol](https://iterm2.com/documentation-images.html).
    ITerm = 2,
    /// DEC Sixel graphics.
    Sixel = 3,
    /// Resolve to the first available protocol on first use.
    Default = u8::MAX,
}

/// Protocols that have a text token, in parse order.
const TOKENS: [TermType; 4] = [
    TermType::None,
    TermType::Kitty,
    TermType::ITerm,
    TermType::Sixel,
];

impl TermType {
    /// The lowercase name of the protocol (`"default"` for the sentinel).
    pub fn as_str(&self) -> &'static str {
        match self {
            TermType::None => "none",
            TermType::Kitty => "kitty",
            TermType::ITerm => "iterm",
            TermType::Sixel => "sixel",
            TermType::Default => "default",
        }
    }

    /// The value to place in `TERM_GRAPHICS` to select this protocol.
    ///
    /// `Default` has no token and maps to the empty string.
    pub fn env_value(&self) -> &'static str {
        match self {
            TermType::Default => "",
            other => other.as_str(),
        }
    }

    /// The text form used for serialization.
    ///
    /// `Default` marshals to the empty string; everything else to its token.
    pub fn marshal_text(&self) -> &'static str {
        self.env_value()
    }

    /// Leniently parse a token. Never fails.
    ///
    /// Matching is case-insensitive. The empty string yields `Default` and
    /// any unrecognized token yields `None`.
    pub fn parse_lenient(text: &str) -> TermType {
        let lower = text.to_lowercase();
        if lower.is_empty() {
            return TermType::Default;
        }
        TOKENS
            .into_iter()
            .find(|typ| typ.as_str() == lower)
            .unwrap_or(TermType::None)
    }

    /// Whether this protocol can be used on the current terminal.
    ///
    /// `None` is never available. `Default` is available when any protocol
    /// is; its resolution runs once per process.
    pub fn available(&self) -> bool {
        registry::encoder_for(*self).is_some_and(|encoder| encoder.available())
    }

    /// Encode `img` to `w` using this protocol.
    ///
    /// ## Errors
    ///
    /// Returns [`GraphicsError::TermGraphicsNotAvailable`] for `None`, or when
    /// `Default` resolved to no protocol. Codec and write errors are passed
    /// through unchanged.
    pub fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
        match registry::encoder_for(*self) {
            Some(encoder) => encoder.encode(w, img),
            None => Err(GraphicsError::TermGraphicsNotAvailable),
        }
    }
}

impl fmt::Display for TermType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TermType::parse_lenient(s))
    }
}

impl From<TermType> for u8 {
    fn from(typ: TermType) -> u8 {
        typ as u8
    }
}

impl TryFrom<u8> for TermType {
    type Error = GraphicsError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TermType::None),
            1 => Ok(TermType::Kitty),
            2 => Ok(TermType::ITerm),
            3 => Ok(TermType::Sixel),
            u8::MAX => Ok(TermType::Default),
            code => Err(GraphicsError::UnknownTermType { code }),
        }
    }
}

impl Serialize for TermType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.marshal_text())
    }
}

impl<'de> Deserialize<'de> for TermType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TermType::parse_lenient(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for typ in [TermType::None, TermType::Kitty, TermType::ITerm, TermType::Sixel] {
            assert_eq!(TermType::parse_lenient(typ.marshal_text()), typ, "{typ:?}");
        }
    }

    #[test]
    fn test_empty_parses_to_default() {
        assert_eq!(TermType::parse_lenient(""), TermType::Default);
        assert_eq!(TermType::Default.marshal_text(), "");
        assert_eq!(TermType::parse_lenient(TermType::Default.marshal_text()), TermType::Default);
    }

    #[test]
    fn test_unknown_token_parses_to_none() {
        assert_eq!(TermType::parse_lenient("vt340"), TermType::None);
        assert_eq!(TermType::parse_lenient("default"), TermType::None);
        assert_eq!("  kitty".parse::<TermType>().unwrap(), TermType::None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(TermType::parse_lenient("KITTY"), TermType::Kitty);
        assert_eq!(TermType::parse_lenient("iTerm"), TermType::ITerm);
        assert_eq!(TermType::parse_lenient("Sixel"), TermType::Sixel);
    }

    #[test]
    fn test_display() {
        assert_eq!(TermType::None.to_string(), "none");
        assert_eq!(TermType::ITerm.to_string(), "iterm");
        assert_eq!(TermType::Default.to_string(), "default");
    }

    #[test]
    fn test_numeric_codes() {
        assert_eq!(u8::from(TermType::Kitty), 1);
        assert_eq!(TermType::try_from(3).unwrap(), TermType::Sixel);
        assert_eq!(TermType::try_from(255).unwrap(), TermType::Default);
        assert!(matches!(
            TermType::try_from(4),
            Err(GraphicsError::UnknownTermType { code: 4 })
        ));
    }

    #[test]
    fn test_serde_uses_token_table() {
        assert_eq!(serde_json::to_string(&TermType::ITerm).unwrap(), "\"iterm\"");
        assert_eq!(serde_json::to_string(&TermType::Default).unwrap(), "\"\"");

        let parsed: Vec<TermType> =
            serde_json::from_str(r#"["sixel", "", "bogus", "Kitty"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![TermType::Sixel, TermType::Default, TermType::None, TermType::Kitty]
        );
    }

    #[test]
    fn test_none_is_never_available() {
        assert!(!TermType::None.available());
    }

    #[test]
    fn test_none_encode_reports_not_available() {
        let img = DynamicImage::new_rgb8(1, 1);
        let mut out = Vec::new();
        let err = TermType::None.encode(&mut out, &img).unwrap_err();
        assert!(matches!(err, GraphicsError::TermGraphicsNotAvailable));
        assert!(out.is_empty());
    }
}
