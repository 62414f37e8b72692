use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FLAG_REGISTER, GLYPH_SIZE, KEY_COUNT, MAX_ADDRESS, STACK_DEPTH,
};
use crate::error::{Chip8Error, Result};
use crate::opcode::Opcode;
use crate::state::{span, Keypad, State};

// Flagging instructions write VF first and then compute their result from the updated
// registers, so an operand or destination of VF sees the new flag.

fn flag(set: bool) -> u8 {
    if set {
        0x1
    } else {
        0x0
    }
}

fn is_pressed(keys: &Keypad, key: u8) -> Result<bool> {
    if key as usize >= KEY_COUNT {
        return Err(Chip8Error::InvalidKey { key });
    }
    Ok(keys[key as usize])
}

/// clear
pub fn clr(_op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop() + 2
pub fn rts(_op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    if state.sp == 0 {
        return Err(Chip8Error::StackUnderflow { pc: state.pc });
    }
    let sp = state.sp - 0x1;
    Ok(State {
        pc: state.stack[sp as usize] + 0x2,
        sp,
        ..*state
    })
}

/// PC = addr
pub fn jump(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: op.nnn(),
        ..*state
    })
}

/// STACK.push(PC); PC = addr
pub fn call(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    if state.sp as usize >= STACK_DEPTH {
        return Err(Chip8Error::StackOverflow { pc: state.pc });
    }
    let mut stack = state.stack;
    stack[state.sp as usize] = state.pc;
    Ok(State {
        pc: op.nnn(),
        sp: state.sp + 0x1,
        stack,
        ..*state
    })
}

fn skip_if(condition: bool, state: &State) -> Result<State> {
    let pc = if condition {
        state.pc + 0x4
    } else {
        state.pc + 0x2
    };
    Ok(State { pc, ..*state })
}

/// if Vx == nn then pc += 2
pub fn ske(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    skip_if(state.v[op.x()] == op.nn(), state)
}

/// if Vx != nn then pc += 2
pub fn skne(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    skip_if(state.v[op.x()] != op.nn(), state)
}

/// if Vx == Vy then pc += 2
pub fn skre(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    skip_if(state.v[op.x()] == state.v[op.y()], state)
}

/// if Vx != Vy then pc += 2
pub fn skrne(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    skip_if(state.v[op.x()] != state.v[op.y()], state)
}

/// Vx = nn
pub fn load(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let mut v = state.v;
    v[op.x()] = op.nn();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx += nn
/// Add nn to Vx; wraps around without touching VF
pub fn add(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let mut v = state.v;
    v[op.x()] = state.v[op.x()].wrapping_add(op.nn());
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Writes `flag(Vx, Vy)` to VF (when it yields one), then stores `f(Vx, Vy)` in Vx.
/// The result is computed from the registers after VF has been written.
fn alu(
    op: &dyn Opcode,
    state: &State,
    flag: impl Fn(u8, u8) -> Option<u8>,
    f: impl Fn(u8, u8) -> u8,
) -> Result<State> {
    let mut v = state.v;
    if let Some(carry) = flag(v[op.x()], v[op.y()]) {
        v[FLAG_REGISTER] = carry;
    }
    v[op.x()] = f(v[op.x()], v[op.y()]);
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// Vx = Vy
pub fn mv(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |_, _| None, |_, vy| vy)
}

/// Vx |= Vy
pub fn or(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |_, _| None, |vx, vy| vx | vy)
}

/// Vx &= Vy
pub fn and(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |_, _| None, |vx, vy| vx & vy)
}

/// Vx ^= Vy
pub fn xor(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |_, _| None, |vx, vy| vx ^ vy)
}

/// VF = overflow; Vx += Vy
pub fn addr(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(
        op,
        state,
        |vx, vy| Some(flag(vx.checked_add(vy).is_none())),
        |vx, vy| vx.wrapping_add(vy),
    )
}

/// VF = !borrow; Vx -= Vy
pub fn sub(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(
        op,
        state,
        |vx, vy| Some(flag(vx >= vy)),
        |vx, vy| vx.wrapping_sub(vy),
    )
}

/// VF = the bit shifted out; Vx >>= 1
pub fn shr(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |vx, _| Some(vx & 0x1), |vx, _| vx >> 1)
}

/// VF = !borrow; Vx = Vy - Vx
/// Borrow is tested as Vx > Vy, so equal operands count as no borrow
pub fn subn(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(
        op,
        state,
        |vx, vy| Some(flag(vx <= vy)),
        |vx, vy| vy.wrapping_sub(vx),
    )
}

/// VF = the bit shifted out; Vx <<= 1
pub fn shl(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    alu(op, state, |vx, _| Some(vx >> 7), |vx, _| vx << 1)
}

/// I = addr
pub fn loadi(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        i: op.nnn(),
        ..*state
    })
}

/// PC = V0 + addr
pub fn jumpi(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: u16::from(state.v[0x0]) + op.nnn(),
        ..*state
    })
}

/// Vx = rand_byte & nn
pub fn rand(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let rand_byte: u8 = rand::random();
    let mut v = state.v;
    v[op.x()] = rand_byte & op.nn();
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs an 8 pixel wide sprite read from memory I..I+n onto the FrameBuffer at (Vx, Vy).
/// Pixels that land off screen are clipped rather than wrapped.
/// Sets VF if any pixels are erased
pub fn draw(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let sprite = state.read_slice(state.i as usize, op.n() as usize)?;
    let origin_x = state.v[op.x()] as usize;
    let origin_y = state.v[op.y()] as usize;

    let mut v = state.v;
    let mut frame_buffer = state.frame_buffer;

    // Reset the flag register (used for collision detection)
    v[FLAG_REGISTER] = 0x0;

    for (row, byte) in sprite.iter().enumerate() {
        let y = origin_y + row;
        if y >= DISPLAY_HEIGHT {
            continue;
        }
        for bit in 0..8 {
            let x = origin_x + bit;
            if x >= DISPLAY_WIDTH || (byte >> (7 - bit)) & 0x1 == 0 {
                continue;
            }
            if frame_buffer[y][x] == 0x1 {
                v[FLAG_REGISTER] = 0x1;
            }
            frame_buffer[y][x] ^= 0x1;
        }
    }

    Ok(State {
        pc: state.pc + 0x2,
        draw_flag: true,
        v,
        frame_buffer,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(op: &dyn Opcode, state: &State, keys: &Keypad) -> Result<State> {
    skip_if(is_pressed(keys, state.v[op.x()])?, state)
}

/// if !Vx.pressed then pc += 2
pub fn skup(op: &dyn Opcode, state: &State, keys: &Keypad) -> Result<State> {
    skip_if(!is_pressed(keys, state.v[op.x()])?, state)
}

/// Vx = DT
pub fn moved(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let mut v = state.v;
    v[op.x()] = state.delay_timer;
    Ok(State {
        pc: state.pc + 0x2,
        v,
        ..*state
    })
}

/// await keypress for Vx
/// When no key is down the pc stays put so the same instruction runs again next cycle.
/// When several keys are down the highest one wins.
pub fn keyd(op: &dyn Opcode, state: &State, keys: &Keypad) -> Result<State> {
    match keys.iter().rposition(|&pressed| pressed) {
        Some(key) => {
            let mut v = state.v;
            v[op.x()] = key as u8;
            Ok(State {
                pc: state.pc + 0x2,
                v,
                ..*state
            })
        }
        None => Ok(*state),
    }
}

/// DT = Vx
pub fn loads(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        delay_timer: state.v[op.x()],
        ..*state
    })
}

/// ST = Vx
pub fn ld(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        sound_timer: state.v[op.x()],
        ..*state
    })
}

/// VF = I + Vx > 0xFFF; I += Vx
/// As with the 8XY? family the add reads Vx after VF is written
pub fn addi(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let mut v = state.v;
    let end = u32::from(state.i) + u32::from(v[op.x()]);
    v[FLAG_REGISTER] = flag(end > u32::from(MAX_ADDRESS));
    let i = state.i.wrapping_add(u16::from(v[op.x()]));
    Ok(State {
        pc: state.pc + 0x2,
        i,
        v,
        ..*state
    })
}

/// I = Vx * 5
/// Set I to the memory address of the font glyph for Vx
/// See constants::FONT_SET for more details
pub fn ldspr(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    Ok(State {
        pc: state.pc + 0x2,
        i: u16::from(state.v[op.x()]) * GLYPH_SIZE,
        ..*state
    })
}

/// mem[I..I+3] = bcd(Vx)
/// Store the hundreds, tens and ones digits of Vx in memory starting at address I
pub fn bcd(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let vx = state.v[op.x()];
    let bcd = [vx / 100, vx / 10 % 10, vx % 10];
    let mut memory = state.memory;
    memory[span(state.i as usize, bcd.len())?].copy_from_slice(&bcd);
    Ok(State {
        pc: state.pc + 0x2,
        memory,
        ..*state
    })
}

/// mem[I..=I+x] = V0..=Vx; I += x + 1
pub fn stor(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let count = op.x() + 1;
    let mut memory = state.memory;
    memory[span(state.i as usize, count)?].copy_from_slice(&state.v[..count]);
    Ok(State {
        pc: state.pc + 0x2,
        i: state.i + count as u16,
        memory,
        ..*state
    })
}

/// V0..=Vx = mem[I..=I+x]; I += x + 1
pub fn read(op: &dyn Opcode, state: &State, _keys: &Keypad) -> Result<State> {
    let count = op.x() + 1;
    let mut v = state.v;
    v[..count].copy_from_slice(state.read_slice(state.i as usize, count)?);
    Ok(State {
        pc: state.pc + 0x2,
        i: state.i + count as u16,
        v,
        ..*state
    })
}
