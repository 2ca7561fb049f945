//! # biscuit-graphics
//!
//! Render images as terminal graphics with whichever protocol the terminal
//! actually speaks.
//!
//! - **Kitty**: chunked base64 PNG (`ESC _ G ... ESC \`)
//! - **iTerm**: a single inline-file sequence (`ESC ] 1337 ; File=... BEL`)
//! - **Sixel**: a DCS stream, only chosen when the terminal reports Sixel in
//!   its device attributes
//!
//! ## Quick Start
//!
//! ```no_run
//! use image::DynamicImage;
//!
//! let img = DynamicImage::new_rgba8(32, 32);
//!
//! if biscuit_graphics::available() {
//!     biscuit_graphics::encode(&mut std::io::stdout(), &img).unwrap();
//! }
//! ```
//!
//! ## Protocol Selection
//!
//! Kitty, iTerm and Sixel are tried in that order the first time
//! [`available`] or [`encode`] is called, and the outcome is kept for the
//! rest of the process. Set `TERM_GRAPHICS` to `kitty`, `iterm`, `sixel` or
//! `none` to override the detection.
//!
//! ## Modules
//!
//! - [`term_type`] - The `TermType` protocol selector
//! - [`encoder`] - Per-protocol encoders and the resolving default encoder
//! - [`registry`] - The process-wide encoder table
//! - [`framing`] - Byte-exact escape sequence framing
//! - [`discovery`] - Sixel detection over the terminal's device attributes
//! - [`config`] - Environment signals and the `TERM_GRAPHICS` override
//! - [`errors`] - The `GraphicsError` type

pub mod config;
pub mod discovery;
pub mod encoder;
pub mod errors;
pub mod framing;
pub mod registry;
pub mod term_type;

pub use encoder::{DefaultEncoder, Encoder, ITermEncoder, KittyEncoder, SixelEncoder};
pub use errors::GraphicsError;
pub use registry::{available, encode, resolved_term_type};
pub use term_type::TermType;
