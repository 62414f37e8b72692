use std::path::PathBuf;

use clap::Parser;

use emu8_core::constants::{MAX_SAVED_STATES, TICK_RATE};
use emu8_display::Rgb;

mod keymap;
mod memory;
mod run;

/// Play a Chip-8 ROM.
///
/// Keys 1-4, Q-R, A-F and Z-V stand in for the hexadecimal keypad.
/// Hold space to fast forward, hold backspace to rewind, press escape to quit.
/// F1 writes the registers and a memory dump to the log at debug level.
#[derive(Parser, Debug)]
#[command(name = "emu8", version)]
pub struct Args {
    /// ROM image to load
    #[arg(value_name = "ROM")]
    pub rom: PathBuf,

    /// Size of each Chip-8 pixel on screen
    #[arg(long, default_value_t = 10)]
    pub scale: u32,

    /// Cycles executed per second; the timers count down once per cycle
    #[arg(long, default_value_t = TICK_RATE)]
    pub tick_rate: u32,

    /// Number of past cycles kept for rewinding
    #[arg(long, default_value_t = MAX_SAVED_STATES)]
    pub history: usize,

    /// Don't ring the terminal bell when the sound timer runs out
    #[arg(long)]
    pub mute: bool,

    /// Colour of lit pixels as RRGGBB
    #[arg(long, value_parser = parse_colour, default_value = "FFFFFF")]
    pub foreground: Rgb,

    /// Colour of unlit pixels as RRGGBB
    #[arg(long, value_parser = parse_colour, default_value = "000000")]
    pub background: Rgb,
}

fn parse_colour(raw: &str) -> Result<Rgb, String> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(format!("expected a colour like FFB000, got '{}'", raw));
    }
    let mut colour = [0; 3];
    for (c, channel) in colour.iter_mut().enumerate() {
        *channel = u8::from_str_radix(&hex[c * 2..c * 2 + 2], 16)
            .map_err(|_| format!("invalid hex colour '{}'", raw))?;
    }
    Ok(colour)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    log::debug!("{:?}", args);
    run::run(&args)
}
