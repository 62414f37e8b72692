/// Bytes of addressable memory
pub const MEMORY_SIZE: usize = 4096;

/// Highest address the 12-bit address space can express
pub const MAX_ADDRESS: u16 = 0x0FFF;

/// ROMs are loaded into memory starting here; 0x000..0x200 belongs to the interpreter
pub const PROGRAM_START: u16 = 0x200;

/// The largest ROM that fits between `PROGRAM_START` and the end of memory
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Return addresses the call stack can hold
pub const STACK_DEPTH: usize = 16;

/// Keys on the hexadecimal keypad (0..F)
pub const KEY_COUNT: usize = 16;

/// VF doubles as the carry/borrow/collision flag
pub const FLAG_REGISTER: usize = 0xF;

/// Number of cycles the host runs per second; timers count down once per cycle
pub const TICK_RATE: u32 = 60;

/// How many past states are kept for rewinding (ten seconds at `TICK_RATE`)
pub const MAX_SAVED_STATES: usize = 600;

/// Where the built-in font lives in memory
pub const FONT_START: usize = 0x000;

/// Bytes per font glyph
pub const GLYPH_SIZE: u16 = 5;

/// # Font
/// The built-in hexadecimal font, five bytes per glyph for 0..F.
///
/// Each glyph is 4 pixels wide; only the high nibble of every byte is used.
/// ```text
/// 0xF0  ****
/// 0x90  *  *
/// 0x90  *  *
/// 0x90  *  *
/// 0xF0  ****
/// ```
pub const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
