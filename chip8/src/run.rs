use std::fs::File;
use std::io::{self, BufReader, Write};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use emu8_display::Display;
use emu8_core::{Chip8, State};

use crate::keymap::keymap;
use crate::memory;
use crate::Args;

pub fn run(args: &Args) -> anyhow::Result<()> {
    anyhow::ensure!(args.tick_rate > 0, "tick rate must be at least 1");
    let mut chip8 = Chip8::with_history(args.history);

    // Load ROM
    let file = File::open(&args.rom)
        .with_context(|| format!("unable to open {}", args.rom.display()))?;
    let mut reader = BufReader::new(file);
    let loaded = chip8
        .load_rom(&mut reader)
        .with_context(|| format!("unable to load {}", args.rom.display()))?;
    log::info!("loaded {} bytes from {}", loaded, args.rom.display());

    // Get SDL2 context
    let sdl = sdl2::init().map_err(|e| anyhow!(e))?;
    let mut display = Display::new(&sdl, args.scale)
        .map_err(|e| anyhow!(e))?
        .with_colours(args.foreground, args.background);
    let mut events = sdl.event_pump().map_err(|e| anyhow!(e))?;

    // Set initial timing
    let cycle_time = Duration::from_secs(1) / args.tick_rate;
    let mut last_cycle = Instant::now();

    // Whether or not the tick rate should be respected
    let mut fast_forward = false;
    // Whether the machine should be cycled forwards or backwards
    let mut rewind = false;

    'event: loop {
        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = chip8.take_frame() {
            display.render(&frame).map_err(|e| anyhow!(e))?;
        }

        if chip8.take_sound() && !args.mute {
            log::debug!("beep");
            print!("\x07");
            io::stdout().flush()?;
        }

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_press(kc),
                    (Keycode::Space, _) => fast_forward = true,
                    (Keycode::Backspace, _) => rewind = true,
                    (Keycode::F1, _) => memory::log_state(chip8.state()),
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match (key, keymap(key)) {
                    (_, Some(kc)) => chip8.key_release(kc),
                    (Keycode::Space, _) => fast_forward = false,
                    (Keycode::Backspace, _) => rewind = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        if rewind {
            chip8.reverse_cycle();
        } else {
            chip8
                .run_cycle()
                .with_context(|| halt_context(chip8.state()))?;
        }

        // Handle timing
        let elapsed_cycle_time = last_cycle.elapsed();
        if !fast_forward && cycle_time > elapsed_cycle_time {
            std::thread::sleep(cycle_time - elapsed_cycle_time);
        }
        last_cycle = Instant::now();
    }

    log::info!("quitting");
    Ok(())
}

/// Describes where the machine stopped; a failed cycle leaves the pc on the failing instruction
fn halt_context(state: &State) -> String {
    match state.fetch() {
        Ok(word) => format!("halted at pc {:04X} on opcode {:04X}", state.pc, word),
        Err(_) => format!("halted at pc {:04X}", state.pc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_context_names_the_failing_word() {
        let mut chip8 = Chip8::new();
        chip8.load_rom_bytes(&[0x60, 0x01, 0xFF, 0xFF]).unwrap();
        chip8.run_cycle().unwrap();
        assert!(chip8.run_cycle().is_err());
        assert_eq!(
            halt_context(chip8.state()),
            "halted at pc 0202 on opcode FFFF"
        );
    }

    #[test]
    fn test_halt_context_past_end_of_memory() {
        let mut state = State::new();
        state.pc = 0x0FFF;
        assert_eq!(halt_context(&state), "halted at pc 0FFF");
    }
}
