use emu8_core::State;

const BYTES_PER_ROW: usize = 16;

/// Formats memory as rows of `address: bytes`, 16 bytes to a row.
///
/// Runs of all-zero rows after the first are collapsed into a single `*` line.
pub fn hex_dump(memory: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut skipping = false;
    for (row, bytes) in memory.chunks(BYTES_PER_ROW).enumerate() {
        let blank = bytes.iter().all(|&b| b == 0);
        if blank && row > 0 && skipping {
            continue;
        }
        if blank && row > 0 && is_blank_row(memory, row - 1) {
            lines.push("*".to_string());
            skipping = true;
            continue;
        }
        skipping = false;
        let hex: Vec<String> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
        lines.push(format!("{:03X}: {}", row * BYTES_PER_ROW, hex.join(" ")));
    }
    lines
}

fn is_blank_row(memory: &[u8], row: usize) -> bool {
    memory[row * BYTES_PER_ROW..(row + 1) * BYTES_PER_ROW]
        .iter()
        .all(|&b| b == 0)
}

/// Writes the registers and a dump of memory to the debug log
pub fn log_state(state: &State) {
    log::debug!(
        "pc {:04X} i {:04X} sp {} dt {} st {} v {:02X?}",
        state.pc,
        state.i,
        state.sp,
        state.delay_timer,
        state.sound_timer,
        state.v
    );
    for line in hex_dump(&state.memory) {
        log::debug!("{}", line);
    }
}
