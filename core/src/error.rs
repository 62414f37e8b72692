use std::io;

use thiserror::Error;

/// Everything that can stop the Chip-8 from making progress.
///
/// All of these are fatal for the running program; the host decides whether to halt,
/// reset or report them. Pixels drawn off screen are clipped and are not errors.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("unknown opcode {0:#06X}")]
    UnknownOpcode(u16),

    #[error("call stack overflow at pc {pc:#06X}")]
    StackOverflow { pc: u16 },

    #[error("return with an empty call stack at pc {pc:#06X}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at address {address:#06X}")]
    AddressOutOfBounds { address: usize },

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },

    #[error("ROM is {size} bytes but at most {max} bytes fit in memory")]
    RomTooLarge { size: usize, max: usize },

    #[error("unable to read ROM")]
    RomRead(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
