//! Byte-exact escape sequence framing for each graphics protocol.
//!
//! These functions only wrap an already encoded (base64) payload; they know
//! nothing about pixels.
//!
//! | Protocol | Framing |
//! |---|---|
//! | Kitty preamble | `ESC _ G a=T,f=100,m=1 ; ESC \` |
//! | Kitty chunk | `ESC _ G m=<0/1> ; <chunk> ESC \` |
//! | iTerm | `ESC ] 1337 ; File=inline=1 : <payload> BEL` |

use std::io::{self, Write};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

/// Maximum base64 bytes carried by one Kitty chunk.
pub const KITTY_CHUNK_SIZE: usize = 4096;

/// Announces a chunked transmit-and-display of a PNG file (`f=100`).
pub const KITTY_PREAMBLE: &[u8] = b"\x1b_Ga=T,f=100,m=1;\x1b\\";

const KITTY_CHUNK_START: &[u8] = b"\x1b_Gm=";
const KITTY_TERMINATOR: &[u8] = b"\x1b\\";

const ITERM_START: &[u8] = b"\x1b]1337;File=inline=1:";
const ITERM_TERMINATOR: &[u8] = b"\x07";

/// Base64-encode (standard alphabet, padded) a codec's output.
pub fn base64_payload(bytes: &[u8]) -> Vec<u8> {
    BASE64.encode(bytes).into_bytes()
}

/// Write `payload` as a Kitty chunked transmission.
///
/// The payload is split into `chunk_size` pieces; each piece gets its own
/// control sequence with `m=1` except the last, which gets `m=0`. An empty
/// payload still produces a single terminating `m=0` chunk.
pub fn write_kitty_chunks<W: Write + ?Sized>(
    w: &mut W,
    payload: &[u8],
    chunk_size: usize,
) -> io::Result<()> {
    let chunk_size = chunk_size.max(1);
    w.write_all(KITTY_PREAMBLE)?;

    if payload.is_empty() {
        return write_kitty_chunk(w, b"", false);
    }

    let mut chunks = payload.chunks(chunk_size).peekable();
    while let Some(chunk) = chunks.next() {
        write_kitty_chunk(w, chunk, chunks.peek().is_some())?;
    }
    Ok(())
}

fn write_kitty_chunk<W: Write + ?Sized>(w: &mut W, chunk: &[u8], more: bool) -> io::Result<()> {
    w.write_all(KITTY_CHUNK_START)?;
    w.write_all(if more { b"1;" } else { b"0;" })?;
    w.write_all(chunk)?;
    w.write_all(KITTY_TERMINATOR)
}

/// Write `payload` as a single iTerm inline-file escape sequence.
pub fn write_iterm_inline<W: Write + ?Sized>(w: &mut W, payload: &[u8]) -> io::Result<()> {
    w.write_all(ITERM_START)?;
    w.write_all(payload)?;
    w.write_all(ITERM_TERMINATOR)
}

/// Write the line terminator that follows an image unless suppressed.
pub fn write_newline<W: Write + ?Sized>(w: &mut W, no_newline: bool) -> io::Result<()> {
    if no_newline {
        return Ok(());
    }
    w.write_all(b"\n")
}
