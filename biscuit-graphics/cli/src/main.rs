//! Terminal graphics CLI.
//!
//! - `bg detect` reports the environment signals, which protocols are
//!   available and which one the default encoder settles on
//! - `bg show <FILE>` draws an image with the chosen or detected protocol

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use biscuit_graphics::{
    Encoder, GraphicsError, ITermEncoder, KittyEncoder, SixelEncoder, TermType,
    config::EnvSignals,
};
use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::WrapErr;
use serde::Serialize;

/// Terminal graphics utility
#[derive(Parser, Debug)]
#[command(name = "bg")]
#[command(author, version, about = "Detect terminal graphics support and display images")]
struct Args {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report which graphics protocols this terminal supports
    Detect,

    /// Display an image in the terminal
    Show {
        /// Image file to display (PNG, JPEG)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Use this protocol instead of detecting one
        #[arg(long, value_enum)]
        protocol: Option<Protocol>,

        /// Do not print a newline after the image
        #[arg(long)]
        no_newline: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Protocol {
    Kitty,
    Iterm,
    Sixel,
    None,
}

impl From<Protocol> for TermType {
    fn from(protocol: Protocol) -> TermType {
        match protocol {
            Protocol::Kitty => TermType::Kitty,
            Protocol::Iterm => TermType::ITerm,
            Protocol::Sixel => TermType::Sixel,
            Protocol::None => TermType::None,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectReport {
    term: String,
    term_program: String,
    lc_terminal: String,
    term_graphics: String,
    kitty: bool,
    iterm: bool,
    sixel: bool,
    resolved: Option<TermType>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    // Setup logging if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }

    let args = Args::parse();

    match args.command {
        Command::Detect => detect(args.json),
        Command::Show {
            ref file,
            protocol,
            no_newline,
        } => show(file, protocol.map(TermType::from), no_newline),
    }
}

fn detect(json: bool) -> color_eyre::Result<()> {
    let signals = EnvSignals::from_env();
    let report = DetectReport {
        kitty: TermType::Kitty.available(),
        iterm: TermType::ITerm.available(),
        sixel: TermType::Sixel.available(),
        resolved: biscuit_graphics::resolved_term_type().ok(),
        term: signals.term,
        term_program: signals.term_program,
        lc_terminal: signals.lc_terminal,
        term_graphics: signals.term_graphics,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Terminal Graphics");
    println!("  TERM:          {}", or_unset(&report.term));
    println!("  TERM_PROGRAM:  {}", or_unset(&report.term_program));
    println!("  LC_TERMINAL:   {}", or_unset(&report.lc_terminal));
    println!("  TERM_GRAPHICS: {}", or_unset(&report.term_graphics));
    println!();
    println!("  kitty: {}", yes_no(report.kitty));
    println!("  iterm: {}", yes_no(report.iterm));
    println!("  sixel: {}", yes_no(report.sixel));
    println!();
    match report.resolved {
        Some(typ) => println!("Using: {typ}"),
        None => println!("Using: none (no graphics protocol available)"),
    }
    Ok(())
}

fn show(file: &Path, protocol: Option<TermType>, no_newline: bool) -> color_eyre::Result<()> {
    let img = image::open(file).wrap_err_with(|| format!("failed to open {}", file.display()))?;

    let typ = match protocol {
        Some(typ) => typ,
        None => biscuit_graphics::resolved_term_type()?,
    };
    tracing::debug!(protocol = %typ, file = %file.display(), "Displaying image");

    let encoder: Box<dyn Encoder> = match typ {
        TermType::Kitty => Box::new(KittyEncoder::new().with_no_newline(no_newline)),
        TermType::ITerm => Box::new(ITermEncoder::new().with_no_newline(no_newline)),
        TermType::Sixel => Box::new(SixelEncoder::new().with_no_newline(no_newline)),
        TermType::None | TermType::Default => {
            return Err(GraphicsError::TermGraphicsNotAvailable.into());
        }
    };

    let mut stdout = io::stdout().lock();
    encoder.encode(&mut stdout, &img)?;
    stdout.flush()?;
    Ok(())
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(unset)" } else { value }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
