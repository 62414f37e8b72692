use std::ops::Range;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_SET, FONT_START, KEY_COUNT, MEMORY_SIZE, PROGRAM_START,
    STACK_DEPTH,
};
use crate::error::{Chip8Error, Result};

/// The FrameBuffer is indexed as [y][x]; every pixel is 0 (off) or 1 (on)
pub type FrameBuffer = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// The pressed status of keys 0..F
pub type Keypad = [bool; KEY_COUNT];

/// A snapshot of the Chip8 internal state
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - the first 15 (V0..VE) are general purpose registers
///     - the 16th (VF) is also written as a flag by arithmetic, shift and draw instructions
/// - (i) a 16-bit memory address register
///
/// Counter
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Pointer
/// - (sp) the number of return addresses on the stack (0..=16)
///
/// Timers
/// - 2 8-bit timers (delay & sound), decremented once per cycle
/// - the sound timer running out raises `sound_flag`
///
/// ## Memory
/// - 16 entry stack of return addresses
/// - 4096 bytes of addressable memory, the font lives at 0x000..0x050
/// - 64x32 frame buffer
///
/// ## Output
/// - `draw_flag` is raised whenever the frame buffer changes
/// - `sound_flag` is raised when a tone should be played
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub stack: [u16; STACK_DEPTH],
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub sound_flag: bool,
    /// The most recently fetched instruction word
    pub opcode: u16,
}

impl State {
    pub fn new() -> Self {
        let mut state = State::blank();
        state.initialize();
        state
    }

    /// Zeroes everything and seeds the font.
    pub fn initialize(&mut self) {
        self.reset_without_font();
        self.memory[FONT_START..FONT_START + FONT_SET.len()].copy_from_slice(&FONT_SET);
    }

    /// Zeroes registers, stack, memory, display and timers without seeding the font.
    ///
    /// The draw flag is left raised so the host paints the blank screen.
    pub fn reset_without_font(&mut self) {
        *self = State::blank();
    }

    fn blank() -> Self {
        State {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            stack: [0; STACK_DEPTH],
            memory: [0; MEMORY_SIZE],
            frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            draw_flag: true,
            sound_flag: false,
            opcode: 0,
        }
    }

    /// Reads a single byte of memory.
    pub fn read_byte(&self, address: usize) -> Result<u8> {
        self.memory
            .get(address)
            .copied()
            .ok_or(Chip8Error::AddressOutOfBounds { address })
    }

    /// Reads `len` bytes of memory starting at `address`.
    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        Ok(&self.memory[span(address, len)?])
    }

    /// Gets the opcode currently pointed at by the pc.
    ///
    /// Memory is stored as bytes, but opcodes are 16 bits so we combine two subsequent bytes.
    pub fn fetch(&self) -> Result<u16> {
        let pc = self.pc as usize;
        let left = u16::from(self.read_byte(pc)?);
        let right = u16::from(self.read_byte(pc + 1)?);
        Ok(left << 8 | right)
    }

    /// Counts both timers down by one.
    ///
    /// The sound flag is raised on the cycle the sound timer runs out.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }

        if self.sound_timer > 0 {
            if self.sound_timer == 1 {
                self.sound_flag = true;
            }
            self.sound_timer -= 1;
        }
    }
}

/// The memory range `address..address + len`, provided all of it lies within memory.
pub fn span(address: usize, len: usize) -> Result<Range<usize>> {
    let end = address + len;
    if end > MEMORY_SIZE {
        return Err(Chip8Error::AddressOutOfBounds {
            address: MEMORY_SIZE.max(address),
        });
    }
    Ok(address..end)
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}
