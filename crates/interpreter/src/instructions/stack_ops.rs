//! `POP`, `PUSH0..PUSH32`, `DUP1..DUP16`, `SWAP1..SWAP16`.

use super::support::{desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::gas;
use alloc::sync::Arc;
use primitives::U256;

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x50, "POP", gas::BASE, 1, 1024, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.pop().map(|_| ()).map_err(stack_halt)
        })),
    );

    // PUSH0 (EIP-3855): pushes a literal zero, no immediate bytes consumed.
    install(
        table,
        desc(0x5f, "PUSH0", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(U256::ZERO).map_err(stack_halt)
        })),
    );

    // PUSH1..PUSH32: read `n` big-endian immediate bytes following the
    // opcode, zero-padded if code runs out, and advance `pc` past them.
    for n in 1..=32u8 {
        let code = 0x60 + (n - 1);
        install(
            table,
            desc(code, push_name(n), gas::VERYLOW, 0, 1023, fixed_gas(), Arc::new(move |rs, _host| {
                // The main loop has already advanced `pc` past this opcode
                // byte, so the immediate starts right here.
                let start = rs.pc;
                let mut bytes = [0u8; 32];
                let code_bytes = rs.code.bytes();
                for i in 0..n as usize {
                    if let Some(b) = code_bytes.get(start + i) {
                        bytes[32 - n as usize + i] = *b;
                    }
                }
                rs.stack.push(U256::from_be_bytes(bytes)).map_err(stack_halt)?;
                rs.pc += n as usize;
                Ok(())
            })),
        );
    }

    for i in 1..=16usize {
        let code = 0x80 + (i - 1) as u8;
        install(
            table,
            desc(code, dup_name(i), gas::VERYLOW, i, 1023, fixed_gas(), Arc::new(move |rs, _host| {
                rs.stack.dup(i).map_err(stack_halt)
            })),
        );
    }

    for i in 1..=16usize {
        let code = 0x90 + (i - 1) as u8;
        install(
            table,
            desc(code, swap_name(i), gas::VERYLOW, i + 1, 1024, fixed_gas(), Arc::new(move |rs, _host| {
                rs.stack.swap(i).map_err(stack_halt)
            })),
        );
    }
}

fn push_name(n: u8) -> &'static str {
    const NAMES: [&str; 32] = [
        "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
        "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
        "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
        "PUSH29", "PUSH30", "PUSH31", "PUSH32",
    ];
    NAMES[n as usize - 1]
}

fn dup_name(i: usize) -> &'static str {
    const NAMES: [&str; 16] = [
        "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
        "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
    ];
    NAMES[i - 1]
}

fn swap_name(i: usize) -> &'static str {
    const NAMES: [&str; 16] = [
        "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
        "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
    ];
    NAMES[i - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_name_table_matches_opcode_count() {
        assert_eq!(push_name(1), "PUSH1");
        assert_eq!(push_name(32), "PUSH32");
    }
}
