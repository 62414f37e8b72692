use std::io::Read;

use crate::constants::{MAX_ROM_SIZE, PROGRAM_START};
use crate::error::{Chip8Error, Result};
use crate::state::State;

/// Initializes `state` and copies `rom` into memory at 0x200.
///
/// A ROM larger than `MAX_ROM_SIZE` is rejected and the state is left freshly initialized.
/// Returns the number of bytes loaded.
pub fn load_bytes(state: &mut State, rom: &[u8]) -> Result<usize> {
    state.initialize();
    if rom.len() > MAX_ROM_SIZE {
        return Err(Chip8Error::RomTooLarge {
            size: rom.len(),
            max: MAX_ROM_SIZE,
        });
    }
    let start = PROGRAM_START as usize;
    state.memory[start..start + rom.len()].copy_from_slice(rom);
    Ok(rom.len())
}

/// Initializes `state` and loads a ROM from a reader.
///
/// At most one byte more than fits is read, which is enough to tell an oversized ROM apart.
/// On a read error nothing is copied and the state is left freshly initialized.
///
/// # Arguments
/// * `reader` a source that contains a ROM, typically a file
pub fn load(state: &mut State, reader: &mut dyn Read) -> Result<usize> {
    state.initialize();
    let mut rom = Vec::with_capacity(MAX_ROM_SIZE + 1);
    Read::take(reader, MAX_ROM_SIZE as u64 + 1).read_to_end(&mut rom)?;
    load_bytes(state, &rom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Unreadable;

    impl Read for Unreadable {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "unplugged"))
        }
    }

    #[test]
    fn test_loads_at_program_start() {
        let mut state = State::new();
        let loaded = load_bytes(&mut state, &[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(loaded, 4);
        assert_eq!(state.memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(state.memory[0x204], 0x00);
        assert_eq!(state.pc, PROGRAM_START);
    }

    #[test]
    fn test_load_initializes_first() {
        let mut state = State::new();
        state.v[0x4] = 0x9;
        state.memory[0x300] = 0xFF;
        state.pc = 0x400;
        load_bytes(&mut state, &[0xA2, 0x2A]).unwrap();
        assert_eq!(state.v[0x4], 0x0);
        assert_eq!(state.memory[0x300], 0x00);
        assert_eq!(state.pc, PROGRAM_START);
    }

    #[test]
    fn test_loads_largest_rom() {
        let mut state = State::new();
        let rom = vec![0xAB; MAX_ROM_SIZE];
        assert_eq!(load_bytes(&mut state, &rom).unwrap(), MAX_ROM_SIZE);
        assert_eq!(state.memory[4095], 0xAB);
    }

    #[test]
    fn test_rejects_oversized_rom() {
        let mut state = State::new();
        state.v[0x1] = 0x1;
        let rom = vec![0xAB; MAX_ROM_SIZE + 1];
        match load_bytes(&mut state, &rom) {
            Err(Chip8Error::RomTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected oversized rom, got {:?}", other),
        }
        assert_eq!(state, State::new());
    }

    #[test]
    fn test_load_from_reader() {
        let mut state = State::new();
        let mut rom: &[u8] = &[0x60, 0x05, 0x12, 0x02];
        assert_eq!(load(&mut state, &mut rom).unwrap(), 4);
        assert_eq!(state.memory[0x200..0x204], [0x60, 0x05, 0x12, 0x02]);
    }

    #[test]
    fn test_load_from_reader_rejects_oversized_rom() {
        let mut state = State::new();
        let bytes = vec![0x1; 5000];
        let mut rom: &[u8] = &bytes;
        assert!(matches!(
            load(&mut state, &mut rom),
            Err(Chip8Error::RomTooLarge { size: 3585, .. })
        ));
        assert_eq!(state, State::new());
    }

    #[test]
    fn test_load_from_unreadable_source() {
        let mut state = State::new();
        state.memory[0x200] = 0x12;
        assert!(matches!(
            load(&mut state, &mut Unreadable),
            Err(Chip8Error::RomRead(_))
        ));
        assert_eq!(state, State::new());
    }
}
