//! Integration tests for the public framing, parsing and selector API.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use biscuit_graphics::{
    TermType,
    config::EnvSignals,
    discovery::device_attributes::DeviceAttributes,
    framing::{
        KITTY_CHUNK_SIZE, KITTY_PREAMBLE, base64_payload, write_iterm_inline, write_kitty_chunks,
    },
};

// ============================================================================
// Framing
// ============================================================================

#[test]
fn test_kitty_chunk_count_and_flags() {
    let payload = base64_payload(&vec![42u8; 10_000]);
    let mut out = Vec::new();
    write_kitty_chunks(&mut out, &payload, KITTY_CHUNK_SIZE).unwrap();

    let body = out.strip_prefix(KITTY_PREAMBLE).unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    let chunks: Vec<&str> = text
        .split("\x1b\\")
        .filter(|s| !s.is_empty())
        .collect();

    assert_eq!(chunks.len(), payload.len().div_ceil(KITTY_CHUNK_SIZE));
    let (last, init) = chunks.split_last().unwrap();
    assert!(init.iter().all(|c| c.starts_with("\x1b_Gm=1;")));
    assert!(last.starts_with("\x1b_Gm=0;"));

    let joined: String = chunks.iter().map(|c| &c["\x1b_Gm=0;".len()..]).collect();
    assert_eq!(joined.as_bytes(), payload.as_slice());
    assert_eq!(BASE64.decode(joined).unwrap(), vec![42u8; 10_000]);
}

#[test]
fn test_iterm_payload_is_single_sequence() {
    let payload = base64_payload(&vec![1u8; 50_000]);
    let mut out = Vec::new();
    write_iterm_inline(&mut out, &payload).unwrap();

    assert_eq!(out.iter().filter(|&&b| b == 0x1b).count(), 1);
    assert_eq!(out.iter().filter(|&&b| b == 0x07).count(), 1);
    let inner = out
        .strip_prefix(b"\x1b]1337;File=inline=1:".as_slice())
        .and_then(|rest| rest.strip_suffix(b"\x07".as_slice()))
        .unwrap();
    assert_eq!(inner, payload.as_slice());
}

// ============================================================================
// Device attributes
// ============================================================================

#[test]
fn test_device_attribute_replies() {
    let sixel = DeviceAttributes::parse(b"\x1b[?62;1;2;4;6;9;15;22c");
    assert_eq!(sixel.codes(), &[62, 1, 2, 4, 6, 9, 15, 22]);
    assert!(sixel.supports_sixel());

    assert!(!DeviceAttributes::parse(b"\x1b[?1;2c").supports_sixel());
}

// ============================================================================
// Selector and environment
// ============================================================================

#[test]
fn test_term_type_text_round_trip() {
    for typ in [TermType::None, TermType::Kitty, TermType::ITerm, TermType::Sixel] {
        assert_eq!(typ.marshal_text().parse::<TermType>().unwrap(), typ);
    }
    assert_eq!("".parse::<TermType>().unwrap(), TermType::Default);
    assert_eq!("regis".parse::<TermType>().unwrap(), TermType::None);
}

#[test]
fn test_env_signal_precedence() {
    let kitty_forced = EnvSignals {
        term: "xterm-256color".into(),
        term_graphics: "kitty".into(),
        ..EnvSignals::default()
    };
    assert!(kitty_forced.kitty_available());

    let disabled = EnvSignals {
        term: "xterm-kitty".into(),
        term_program: "ghostty".into(),
        term_graphics: "none".into(),
        ..EnvSignals::default()
    };
    assert!(!disabled.kitty_available());
    assert!(!disabled.iterm_available());
    assert!(!disabled.sixel_available(|| true));
}
