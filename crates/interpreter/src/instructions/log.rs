//! `LOG0..LOG4`.

use super::support::{as_usize, desc, install, stack_halt};
use crate::opcode::OpcodeDescriptor;
use crate::{gas, HaltReason};
use alloc::sync::Arc;
use alloc::vec::Vec;
use primitives::{Log, B256};

pub(super) fn install_all(table: &mut [Option<OpcodeDescriptor>; 256]) {
    for n in 0u8..=4 {
        let code = 0xa0 + n;
        install(
            table,
            desc(
                code,
                log_name(n),
                gas::LOG,
                2 + n as usize,
                1022 - n as usize,
                Arc::new(move |rs, _host, _base| {
                    let offset = as_usize(rs.stack.peek(0).map_err(stack_halt)?)?;
                    let len = as_usize(rs.stack.peek(1).map_err(stack_halt)?)?;
                    let expansion = rs.memory.expansion_cost(offset, len);
                    Ok(gas::log_cost(n, len) + expansion)
                }),
                Arc::new(move |rs, _host| {
                    if rs.is_static {
                        return Err(HaltReason::StaticStateChange);
                    }
                    let offset = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                    let len = as_usize(rs.stack.pop().map_err(stack_halt)?)?;
                    let mut topics = Vec::with_capacity(n as usize);
                    for _ in 0..n {
                        let topic = rs.stack.pop().map_err(stack_halt)?;
                        topics.push(B256::from(topic.to_be_bytes::<32>()));
                    }
                    rs.memory.resize(offset, len);
                    let data = rs.memory.load(offset, len);
                    let log = Log::new(rs.address, topics, data.into())
                        .ok_or(HaltReason::InternalError)?;
                    rs.logs.push(log);
                    Ok(())
                }),
            ),
        );
    }
}

fn log_name(n: u8) -> &'static str {
    match n {
        0 => "LOG0",
        1 => "LOG1",
        2 => "LOG2",
        3 => "LOG3",
        4 => "LOG4",
        _ => unreachable!("LOG topic count is 0..=4"),
    }
}
