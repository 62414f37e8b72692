use std::collections::VecDeque;
use std::io::Read;

use crate::constants::{KEY_COUNT, MAX_SAVED_STATES};
use crate::error::Result;
use crate::instruction;
use crate::loader;
use crate::state::{FrameBuffer, Keypad, State};

/// # Chip-8
/// Chip-8 is a virtual machine and corresponding interpreted language.
///
/// Tracks:
///  - current `state`
///  - `previous_states` for rewinding
///  - `pressed_keys` with public interfaces for manipulating them
///
/// Supplies interfaces for:
/// - loading roms
/// - pressing and releasing keys
/// - advancing and reversing the CPU one cycle at a time
/// - inspecting its frame buffer and sound flag for some display and speaker
pub struct Chip8 {
    state: State,
    previous_states: VecDeque<State>,
    max_saved_states: usize,
    pressed_keys: Keypad,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8::with_history(MAX_SAVED_STATES)
    }

    /// Creates a Chip-8 that remembers up to `max_saved_states` past cycles for rewinding
    pub fn with_history(max_saved_states: usize) -> Self {
        Chip8 {
            state: State::new(),
            previous_states: VecDeque::with_capacity(max_saved_states),
            max_saved_states,
            pressed_keys: [false; KEY_COUNT],
        }
    }

    /// Load a rom from a source file
    ///
    /// The machine is re-initialized first; if the ROM can't be read or doesn't fit it stays that way.
    ///
    /// # Arguments
    /// * `reader` a file reader that contains a ROM
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<usize> {
        self.previous_states.clear();
        let loaded = loader::load(&mut self.state, reader)?;
        log::debug!("loaded {} byte ROM", loaded);
        Ok(loaded)
    }

    /// Load a rom that is already in memory
    pub fn load_rom_bytes(&mut self, rom: &[u8]) -> Result<usize> {
        self.previous_states.clear();
        let loaded = loader::load_bytes(&mut self.state, rom)?;
        log::debug!("loaded {} byte ROM", loaded);
        Ok(loaded)
    }

    /// Returns the FrameBuffer if the display should be redrawn, clearing the draw flag
    pub fn take_frame(&mut self) -> Option<FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(self.state.frame_buffer)
        } else {
            None
        }
    }

    /// Returns whether a tone should be played, clearing the sound flag
    pub fn take_sound(&mut self) -> bool {
        std::mem::replace(&mut self.state.sound_flag, false)
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// The current machine state, for debuggers and inspection
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was pressed; keys past 0xF are ignored
    pub fn key_press(&mut self, key: u8) {
        if let Some(pressed) = self.pressed_keys.get_mut(key as usize) {
            *pressed = true;
        }
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the 8-bit representation of the key that was released
    pub fn key_release(&mut self, key: u8) {
        if let Some(pressed) = self.pressed_keys.get_mut(key as usize) {
            *pressed = false;
        }
    }

    /// Replace the whole keypad at once, e.g. with a snapshot taken by an input thread
    pub fn set_keys(&mut self, keys: Keypad) {
        self.pressed_keys = keys;
    }

    pub fn keys(&self) -> &Keypad {
        &self.pressed_keys
    }

    /// Advances the machine by a single cycle
    /// - gets, decodes and executes the opcode at the pc
    /// - counts the timers down
    ///
    /// An instruction waiting for a key leaves the pc where it is, so it is simply fetched again
    /// next cycle. On error the machine is left exactly as it was before the cycle.
    pub fn run_cycle(&mut self) -> Result<()> {
        let op = self.state.fetch()?;
        log::trace!(
            "{:04X} v{:02X?} i{:04X} pc{:04X} sp{}",
            op,
            self.state.v,
            self.state.i,
            self.state.pc,
            self.state.sp
        );
        let mut next = instruction::execute(op, &self.state, &self.pressed_keys)?;
        next.opcode = op;
        next.tick_timers();

        self.save_state();
        self.state = next;
        Ok(())
    }

    /// Reverses the machine by a single cycle if possible
    /// - if there are previous_states, pops the last one and restores it
    ///
    /// Returns whether a cycle was undone.
    pub fn reverse_cycle(&mut self) -> bool {
        match self.previous_states.pop_front() {
            Some(state) => {
                self.state = State {
                    draw_flag: true,
                    ..state
                };
                true
            }
            None => false,
        }
    }

    /// Puts the current state in previous_states
    /// - if there are already `max_saved_states` saved then the oldest is dropped
    fn save_state(&mut self) {
        if self.max_saved_states == 0 {
            return;
        }
        if self.previous_states.len() == self.max_saved_states {
            self.previous_states.pop_back();
        }
        self.previous_states.push_front(self.state);
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Chip8Error;

    #[test]
    fn test_cycle_advances_pc() {
        let mut chip8 = Chip8::new();
        let starting_pc = chip8.state.pc;
        chip8.state.memory[0x200..0x202].copy_from_slice(&[0x00, 0xE0]);
        chip8.run_cycle().unwrap();
        assert_eq!(chip8.state.pc, starting_pc + 0x2);
        assert_eq!(chip8.state.opcode, 0x00E0);
    }

    #[test]
    fn test_cycle_ticks_timers_after_executing() {
        let mut chip8 = Chip8::new();
        // V0 = 5; DT = V0; V1 = DT
        chip8
            .load_rom_bytes(&[0x60, 0x05, 0xF0, 0x15, 0xF1, 0x07])
            .unwrap();
        chip8.run_cycle().unwrap();
        chip8.run_cycle().unwrap();
        // set to 5 then counted down once in the same cycle
        assert_eq!(chip8.state.delay_timer, 0x4);
        chip8.run_cycle().unwrap();
        assert_eq!(chip8.state.v[0x1], 0x4);
        assert_eq!(chip8.state.delay_timer, 0x3);
    }

    #[test]
    fn test_unknown_opcode_leaves_state_untouched() {
        let mut chip8 = Chip8::new();
        chip8.load_rom_bytes(&[0xFF, 0xFF]).unwrap();
        chip8.state.delay_timer = 0x3;
        let before = chip8.state;
        match chip8.run_cycle() {
            Err(Chip8Error::UnknownOpcode(op)) => assert_eq!(op, 0xFFFF),
            other => panic!("expected unknown opcode, got {:?}", other),
        }
        assert_eq!(chip8.state, before);
        assert!(chip8.previous_states.is_empty());
    }

    #[test]
    fn test_key_press_and_release() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0xE);
        assert!(chip8.keys()[0xE]);
        chip8.key_release(0xE);
        assert!(!chip8.keys()[0xE]);
        // off the keypad
        chip8.key_press(0x10);
        assert!(chip8.keys().iter().all(|&k| !k));
    }

    #[test]
    fn test_set_keys_snapshot_feeds_key_wait() {
        let mut chip8 = Chip8::new();
        // V2 = key
        chip8.load_rom_bytes(&[0xF2, 0x0A]).unwrap();
        let mut keys = [false; KEY_COUNT];
        keys[0x5] = true;
        chip8.set_keys(keys);
        assert_eq!(*chip8.keys(), keys);

        chip8.run_cycle().unwrap();
        assert_eq!(chip8.state.v[0x2], 0x5);
        assert_eq!(chip8.state.pc, 0x202);
    }

    #[test]
    fn test_set_keys_replaces_held_keys() {
        let mut chip8 = Chip8::new();
        chip8.key_press(0x1);
        chip8.set_keys([false; KEY_COUNT]);
        assert!(!chip8.keys()[0x1]);
    }

    #[test]
    fn test_take_frame_clears_draw_flag() {
        let mut chip8 = Chip8::new();
        assert!(chip8.take_frame().is_some());
        assert!(chip8.take_frame().is_none());
    }

    #[test]
    fn test_take_sound_clears_sound_flag() {
        let mut chip8 = Chip8::new();
        chip8.state.sound_flag = true;
        assert!(chip8.take_sound());
        assert!(!chip8.take_sound());
    }

    #[test]
    fn test_chip8_saves_state() {
        let mut chip8 = Chip8::new();
        chip8.save_state();
        assert_eq!(chip8.previous_states.len(), 1);
    }

    #[test]
    fn test_chip8_drops_old_saved_states() {
        let mut chip8 = Chip8::with_history(4);
        for _ in 0..4 {
            chip8.save_state();
        }
        assert_eq!(4, chip8.previous_states.len());
        chip8.save_state();
        assert_eq!(4, chip8.previous_states.len());
    }

    #[test]
    fn test_chip8_without_history() {
        let mut chip8 = Chip8::with_history(0);
        chip8.load_rom_bytes(&[0x12, 0x00]).unwrap();
        chip8.run_cycle().unwrap();
        assert!(chip8.previous_states.is_empty());
        assert!(!chip8.reverse_cycle());
    }

    #[test]
    fn test_reverse_cycle_restores_previous_state() {
        let mut chip8 = Chip8::new();
        chip8.load_rom_bytes(&[0x61, 0x22, 0x62, 0x33]).unwrap();
        chip8.run_cycle().unwrap();
        chip8.run_cycle().unwrap();
        assert_eq!(chip8.state.v[0x2], 0x33);

        assert!(chip8.reverse_cycle());
        assert_eq!(chip8.state.v[0x1], 0x22);
        assert_eq!(chip8.state.v[0x2], 0x00);
        assert_eq!(chip8.state.pc, 0x202);
        assert!(chip8.reverse_cycle());
        assert_eq!(chip8.state.pc, 0x200);
        assert!(!chip8.reverse_cycle());
    }

    #[test]
    fn test_reverse_cycle_keeps_current_keys() {
        let mut chip8 = Chip8::new();
        chip8.load_rom_bytes(&[0x00, 0xE0]).unwrap();
        chip8.run_cycle().unwrap();
        chip8.key_press(0x5);
        chip8.reverse_cycle();
        assert!(chip8.keys()[0x5]);
    }

    #[test]
    fn test_loading_clears_history() {
        let mut chip8 = Chip8::new();
        chip8.load_rom_bytes(&[0x12, 0x00]).unwrap();
        chip8.run_cycle().unwrap();
        chip8.load_rom_bytes(&[0x12, 0x00]).unwrap();
        assert!(!chip8.reverse_cycle());
    }
}
