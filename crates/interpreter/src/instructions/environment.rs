//! `ADDRESS`, `BALANCE`, `ORIGIN`, `CALLER`, `CALLVALUE`, `CALLDATALOAD`,
//! `CALLDATASIZE`, `CALLDATACOPY`, `CODESIZE`, `CODECOPY`, `GASPRICE`,
//! `EXTCODESIZE`, `EXTCODECOPY`, `EXTCODEHASH`, `RETURNDATASIZE`,
//! `RETURNDATACOPY`, `SELFBALANCE`.

use super::support::{as_usize, db_err, desc, fixed_gas, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::{gas, HaltReason};
use alloc::sync::Arc;
use alloc::vec::Vec;
use primitives::{Address, U256};

fn address_from_word(word: U256) -> Address {
    Address::from_slice(&word.to_be_bytes::<32>()[12..])
}

fn copy_to_memory(rs: &mut crate::RunState, dst: usize, src: &[u8], src_offset: usize, len: usize) {
    rs.memory.resize(dst, len);
    let mut buf = alloc::vec![0u8; len];
    if src_offset < src.len() {
        let avail = (src.len() - src_offset).min(len);
        buf[..avail].copy_from_slice(&src[src_offset..src_offset + avail]);
    }
    rs.memory.store(dst, &buf);
}

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    install(
        table,
        desc(0x30, "ADDRESS", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack
                .push(U256::from_be_slice(rs.address.as_slice()))
                .map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x31,
            "BALANCE",
            0,
            1,
            1024,
            Arc::new(|rs, host, _base| {
                let address = address_from_word(rs.stack.peek(0).map_err(stack_halt)?);
                let cold = host.warm_address(address).map_err(db_err)?;
                Ok(extcode_base_cost(&rs.rules, cold))
            }),
            Arc::new(|rs, host| {
                let address = address_from_word(rs.stack.pop().map_err(stack_halt)?);
                let balance = host.balance(address).map_err(db_err)?;
                rs.stack.push(balance).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(0x32, "ORIGIN", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack
                .push(U256::from_be_slice(host.env().tx.origin.as_slice()))
                .map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x33, "CALLER", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack
                .push(U256::from_be_slice(rs.caller.as_slice()))
                .map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x34, "CALLVALUE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(rs.value).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x35, "CALLDATALOAD", gas::VERYLOW, 1, 1024, fixed_gas(), Arc::new(|rs, _host| {
            let offset = rs.stack.pop().map_err(stack_halt)?;
            let offset: usize = offset.try_into().unwrap_or(usize::MAX);
            let mut bytes = [0u8; 32];
            if offset < rs.call_data.len() {
                let avail = (rs.call_data.len() - offset).min(32);
                bytes[..avail].copy_from_slice(&rs.call_data[offset..offset + avail]);
            }
            rs.stack.push(U256::from_be_bytes(bytes)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(0x36, "CALLDATASIZE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(U256::from(rs.call_data.len() as u64)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x37,
            "CALLDATACOPY",
            gas::VERYLOW,
            3,
            1021,
            Arc::new(|rs, _host, base| {
                let dst = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(2).map_err(stack_halt)?)?;
                Ok(base + gas::copy_word_cost(len) + rs.memory.expansion_cost(dst, len))
            }),
            Arc::new(|rs, _host| {
                let dst = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let data: Vec<u8> = rs.call_data.to_vec();
                copy_to_memory(rs, dst, &data, src, len);
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(0x38, "CODESIZE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(U256::from(rs.code.len() as u64)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x39,
            "CODECOPY",
            gas::VERYLOW,
            3,
            1021,
            Arc::new(|rs, _host, base| {
                let dst = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(2).map_err(stack_halt)?)?;
                Ok(base + gas::copy_word_cost(len) + rs.memory.expansion_cost(dst, len))
            }),
            Arc::new(|rs, _host| {
                let dst = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let code: Vec<u8> = rs.code.bytes().to_vec();
                copy_to_memory(rs, dst, &code, src, len);
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(0x3a, "GASPRICE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            rs.stack.push(host.env().tx.gas_price).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x3b,
            "EXTCODESIZE",
            0,
            1,
            1024,
            Arc::new(|rs, host, _base| {
                let address = address_from_word(rs.stack.peek(0).map_err(stack_halt)?);
                let cold = host.warm_address(address).map_err(db_err)?;
                Ok(extcode_base_cost(&rs.rules, cold))
            }),
            Arc::new(|rs, host| {
                let address = address_from_word(rs.stack.pop().map_err(stack_halt)?);
                let code = host.code(address).map_err(db_err)?;
                rs.stack.push(U256::from(code.len() as u64)).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(
            0x3c,
            "EXTCODECOPY",
            0,
            4,
            1020,
            Arc::new(|rs, host, _base| {
                let address = address_from_word(rs.stack.peek(0).map_err(stack_halt)?);
                let dst = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(3).map_err(stack_halt)?)?;
                let cold = host.warm_address(address).map_err(db_err)?;
                Ok(extcode_base_cost(&rs.rules, cold)
                    + gas::copy_word_cost(len)
                    + rs.memory.expansion_cost(dst, len))
            }),
            Arc::new(|rs, host| {
                let address = address_from_word(rs.stack.pop().map_err(stack_halt)?);
                let dst = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let code = host.code(address).map_err(db_err)?;
                let bytes: Vec<u8> = code.bytes().to_vec();
                copy_to_memory(rs, dst, &bytes, src, len);
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(0x3d, "RETURNDATASIZE", gas::BASE, 0, 1023, fixed_gas(), Arc::new(|rs, _host| {
            rs.stack.push(U256::from(rs.return_data.len() as u64)).map_err(stack_halt)
        })),
    );
    install(
        table,
        desc(
            0x3e,
            "RETURNDATACOPY",
            gas::VERYLOW,
            3,
            1021,
            Arc::new(|rs, _host, base| {
                let dst = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.peek(2).map_err(stack_halt)?)?;
                if src.saturating_add(len) > rs.return_data.len() {
                    return Err(HaltReason::InvalidBytecodeResult);
                }
                Ok(base + gas::copy_word_cost(len) + rs.memory.expansion_cost(dst, len))
            }),
            Arc::new(|rs, _host| {
                let dst = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let src = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                let data: Vec<u8> = rs.return_data.to_vec();
                copy_to_memory(rs, dst, &data, src, len);
                Ok(())
            }),
        ),
    );
    install(
        table,
        desc(
            0x3f,
            "EXTCODEHASH",
            0,
            1,
            1024,
            Arc::new(|rs, host, _base| {
                let address = address_from_word(rs.stack.peek(0).map_err(stack_halt)?);
                let cold = host.warm_address(address).map_err(db_err)?;
                Ok(extcode_base_cost(&rs.rules, cold))
            }),
            Arc::new(|rs, host| {
                let address = address_from_word(rs.stack.pop().map_err(stack_halt)?);
                host.load_account(address).map_err(db_err)?;
                let balance = host.balance(address).map_err(db_err)?;
                let nonce = host.nonce(address).map_err(db_err)?;
                let code_hash = host.code_hash(address).map_err(db_err)?;
                let exists = !balance.is_zero() || nonce != 0 || code_hash != primitives::KECCAK_EMPTY;
                let hash = if exists { code_hash } else { primitives::B256::ZERO };
                rs.stack.push(U256::from_be_bytes(hash.0)).map_err(stack_halt)
            }),
        ),
    );
    install(
        table,
        desc(0x47, "SELFBALANCE", gas::WARM_STORAGE_READ, 0, 1023, fixed_gas(), Arc::new(|rs, host| {
            let balance = host.balance(rs.address).map_err(db_err)?;
            rs.stack.push(balance).map_err(stack_halt)
        })),
    );
}

/// Pre-Berlin `EXTCODESIZE`/`EXTCODECOPY`/`EXTCODEHASH` flat cost; from
/// Berlin the flat cost is replaced entirely by the warm/cold surcharge.
fn extcode_base_cost(rules: &context::ChainRules, cold: bool) -> u64 {
    if rules.warm_cold_access() {
        gas::cold_account_access_cost(rules, cold)
    } else {
        700
    }
}
