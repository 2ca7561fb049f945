//! The process-wide encoder table.
//!
//! One encoder per [`TermType`], plus the [`Default`](TermType::Default)
//! composite over Kitty, iTerm and Sixel in that priority order. The table
//! and the composite's resolution are created on first use and live for the
//! rest of the process.

use std::{
    io::Write,
    sync::{Arc, LazyLock},
};

use image::DynamicImage;

use crate::{
    encoder::{DefaultEncoder, Encoder, ITermEncoder, KittyEncoder, SixelEncoder},
    errors::GraphicsError,
    term_type::TermType,
};

struct Registry {
    kitty: Arc<dyn Encoder>,
    iterm: Arc<dyn Encoder>,
    sixel: Arc<dyn Encoder>,
    default: DefaultEncoder,
}

impl Registry {
    fn new() -> Self {
        let kitty: Arc<dyn Encoder> = Arc::new(KittyEncoder::new());
        let iterm: Arc<dyn Encoder> = Arc::new(ITermEncoder::new());
        let sixel: Arc<dyn Encoder> = Arc::new(SixelEncoder::new());
        let default = DefaultEncoder::new(vec![
            (TermType::Kitty, kitty.clone()),
            (TermType::ITerm, iterm.clone()),
            (TermType::Sixel, sixel.clone()),
        ]);
        Self {
            kitty,
            iterm,
            sixel,
            default,
        }
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The registered encoder for `typ`; `None` has no encoder.
pub fn encoder_for(typ: TermType) -> Option<&'static dyn Encoder> {
    let registry = &*REGISTRY;
    match typ {
        TermType::None => None,
        TermType::Kitty => Some(registry.kitty.as_ref()),
        TermType::ITerm => Some(registry.iterm.as_ref()),
        TermType::Sixel => Some(registry.sixel.as_ref()),
        TermType::Default => Some(&registry.default as &dyn Encoder),
    }
}

/// The process-wide default encoder.
pub fn default_encoder() -> &'static DefaultEncoder {
    &REGISTRY.default
}

/// The protocol the default encoder resolved to.
///
/// ## Errors
///
/// [`GraphicsError::TermGraphicsNotAvailable`] when nothing is available.
pub fn resolved_term_type() -> Result<TermType, GraphicsError> {
    default_encoder().resolved_type()
}

/// Encode `img` to `w` with the first available protocol.
///
/// ## Errors
///
/// [`GraphicsError::TermGraphicsNotAvailable`] (with nothing written) when
/// the terminal supports none of the protocols; codec and write errors
/// otherwise.
pub fn encode(w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
    TermType::Default.encode(w, img)
}

/// Whether any protocol is available on this terminal.
pub fn available() -> bool {
    TermType::Default.available()
}
