//! Terminal graphics encoders.
//!
//! Each protocol has an [`Encoder`] that knows whether it can be used on the
//! current terminal and how to write an image with it. [`DefaultEncoder`]
//! wraps an ordered list of encoders and settles, once, on the first one
//! that is available.
//!
//! ## Examples
//!
//! ```no_run
//! use biscuit_graphics::encoder::{Encoder, KittyEncoder};
//! use image::DynamicImage;
//!
//! let img = DynamicImage::new_rgba8(16, 16);
//! let kitty = KittyEncoder::new().with_no_newline(true);
//! if kitty.available() {
//!     kitty.encode(&mut std::io::stdout(), &img).unwrap();
//! }
//! ```

use std::{
    collections::HashSet,
    io::{Cursor, Write},
    sync::{Arc, OnceLock},
};

use icy_sixel::EncodeOptions;
use image::{DynamicImage, GenericImageView, ImageFormat, codecs::jpeg::JpegEncoder};

use crate::{
    config::EnvSignals,
    discovery,
    errors::GraphicsError,
    framing::{
        KITTY_CHUNK_SIZE, base64_payload, write_iterm_inline, write_kitty_chunks, write_newline,
    },
    term_type::TermType,
};

/// JPEG quality used for lossy iTerm payloads.
pub const DEFAULT_JPEG_QUALITY: u8 = 93;

/// Images with at most this many distinct colors are sent losslessly.
pub const PALETTE_MAX_COLORS: usize = 256;

/// A terminal graphics encoder.
///
/// Implementations must be `Send + Sync`; encoders live in a process-wide
/// registry. Encoding takes no lock of its own, so concurrent calls are only
/// as safe as the writer they are given.
pub trait Encoder: Send + Sync {
    /// Whether this encoder can be used on the current terminal.
    ///
    /// Never fails: detection problems mean "not available".
    fn available(&self) -> bool;

    /// Write `img` to `w` in this encoder's protocol.
    ///
    /// ## Errors
    ///
    /// Codec and write errors are returned unchanged.
    fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError>;
}

/// Kitty graphics protocol encoder.
///
/// Sends the image as a base64 PNG in 4096-byte chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct KittyEncoder {
    /// Skip the trailing newline after the image.
    pub no_newline: bool,
}

impl KittyEncoder {
    /// Kitty encoder that ends the image with a newline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the trailing newline when `no_newline` is set.
    pub fn with_no_newline(mut self, no_newline: bool) -> Self {
        self.no_newline = no_newline;
        self
    }
}

impl Encoder for KittyEncoder {
    fn available(&self) -> bool {
        let available = EnvSignals::from_env().kitty_available();
        tracing::debug!(protocol = "kitty", available, "Checked availability");
        available
    }

    fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
        let payload = base64_payload(&png_bytes(img)?);
        write_kitty_chunks(w, &payload, KITTY_CHUNK_SIZE)?;
        write_newline(w, self.no_newline)?;
        Ok(())
    }
}

/// iTerm inline images encoder.
///
/// Palette-sized images go out as PNG, everything else as JPEG.
#[derive(Debug, Clone, Copy)]
pub struct ITermEncoder {
    /// Skip the trailing newline after the image.
    pub no_newline: bool,
    /// JPEG quality (1-100) for lossy payloads.
    pub jpeg_quality: u8,
}

impl Default for ITermEncoder {
    fn default() -> Self {
        Self {
            no_newline: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ITermEncoder {
    /// iTerm encoder with the default JPEG quality and a trailing newline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the trailing newline when `no_newline` is set.
    pub fn with_no_newline(mut self, no_newline: bool) -> Self {
        self.no_newline = no_newline;
        self
    }

    /// Set the JPEG quality, clamped to 1-100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Encoder for ITermEncoder {
    fn available(&self) -> bool {
        let available = EnvSignals::from_env().iterm_available();
        tracing::debug!(protocol = "iterm", available, "Checked availability");
        available
    }

    fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
        let encoded = if is_palette_image(img) {
            png_bytes(img)?
        } else {
            jpeg_bytes(img, self.jpeg_quality)?
        };
        write_iterm_inline(w, &base64_payload(&encoded))?;
        write_newline(w, self.no_newline)?;
        Ok(())
    }
}

/// Sixel encoder.
///
/// The only encoder whose availability involves querying the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SixelEncoder {
    /// Skip the trailing newline after the image.
    pub no_newline: bool,
}

impl SixelEncoder {
    /// Sixel encoder that ends the image with a newline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip the trailing newline when `no_newline` is set.
    pub fn with_no_newline(mut self, no_newline: bool) -> Self {
        self.no_newline = no_newline;
        self
    }
}

impl Encoder for SixelEncoder {
    fn available(&self) -> bool {
        let available = EnvSignals::from_env().sixel_available(discovery::has_sixel_support);
        tracing::debug!(protocol = "sixel", available, "Checked availability");
        available
    }

    fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
        let rgba = img.to_rgba8();
        let sixel = icy_sixel::sixel_encode(
            rgba.as_raw(),
            rgba.width() as usize,
            rgba.height() as usize,
            &EncodeOptions::default(),
        )?;
        w.write_all(sixel.as_bytes())?;
        write_newline(w, self.no_newline)?;
        Ok(())
    }
}

/// Picks the first available encoder from an ordered list, once.
///
/// Resolution (including a "nothing available" outcome) happens on the first
/// call to [`resolve`](Self::resolve), `available` or `encode` and is never
/// repeated, no matter how many threads race on that first call.
pub struct DefaultEncoder {
    encoders: Vec<(TermType, Arc<dyn Encoder>)>,
    resolved: OnceLock<Option<usize>>,
}

impl DefaultEncoder {
    /// Wrap `encoders`, highest priority first.
    pub fn new(encoders: Vec<(TermType, Arc<dyn Encoder>)>) -> Self {
        Self {
            encoders,
            resolved: OnceLock::new(),
        }
    }

    fn resolved_index(&self) -> Option<usize> {
        *self.resolved.get_or_init(|| {
            let chosen = self.encoders.iter().position(|(_, e)| e.available());
            match chosen {
                Some(index) => tracing::info!(
                    protocol = %self.encoders[index].0,
                    "Resolved terminal graphics protocol"
                ),
                None => tracing::info!("No terminal graphics protocol available"),
            }
            chosen
        })
    }

    /// The protocol this encoder settled on.
    ///
    /// ## Errors
    ///
    /// [`GraphicsError::TermGraphicsNotAvailable`] when no wrapped encoder was
    /// available at resolution time.
    pub fn resolved_type(&self) -> Result<TermType, GraphicsError> {
        self.resolved_index()
            .map(|index| self.encoders[index].0)
            .ok_or(GraphicsError::TermGraphicsNotAvailable)
    }

    /// The encoder this encoder settled on.
    ///
    /// ## Errors
    ///
    /// Same as [`resolved_type`](Self::resolved_type).
    pub fn resolve(&self) -> Result<&dyn Encoder, GraphicsError> {
        self.resolved_index()
            .map(|index| self.encoders[index].1.as_ref())
            .ok_or(GraphicsError::TermGraphicsNotAvailable)
    }
}

impl Encoder for DefaultEncoder {
    fn available(&self) -> bool {
        self.resolve().is_ok()
    }

    fn encode(&self, w: &mut dyn Write, img: &DynamicImage) -> Result<(), GraphicsError> {
        self.resolve()?.encode(w, img)
    }
}

/// Whether `img` fits in a palette of [`PALETTE_MAX_COLORS`] colors.
///
/// `image` expands indexed PNG/GIF data on decode, so the color count is
/// the remaining evidence of an indexed source.
pub fn is_palette_image(img: &DynamicImage) -> bool {
    let mut colors = HashSet::with_capacity(PALETTE_MAX_COLORS + 1);
    for (_, _, pixel) in img.pixels() {
        colors.insert(pixel.0);
        if colors.len() > PALETTE_MAX_COLORS {
            return false;
        }
    }
    true
}

fn png_bytes(img: &DynamicImage) -> Result<Vec<u8>, GraphicsError> {
    let mut buf = Vec::new();
    // PNG has no float samples; 16 bits per channel keeps the precision
    match img {
        DynamicImage::ImageRgb32F(_) => DynamicImage::ImageRgb16(img.to_rgb16())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?,
        DynamicImage::ImageRgba32F(_) => DynamicImage::ImageRgba16(img.to_rgba16())
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?,
        _ => img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?,
    }
    Ok(buf)
}

fn jpeg_bytes(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, GraphicsError> {
    let mut buf = Vec::new();
    // JPEG has no alpha channel
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&img.to_rgb8())?;
    Ok(buf)
}
