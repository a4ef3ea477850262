//! `--trace`: an [`Inspector`] that logs every opcode step via `tracing`,
//! grounded on the same step-event shape `ethercore::Evm::run_code_inspected`
//! already threads through to `interpreter::run_inspected`.

use ethercore::{Inspector, RunState, StepEvent};

/// Logs `pc`/opcode name/gas/depth for every step, at `tracing::info!`.
#[derive(Default)]
pub struct OpcodeTracer {
    steps: u64,
}

impl OpcodeTracer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inspector for OpcodeTracer {
    fn step(&mut self, event: &StepEvent<'_>, _state: &RunState) {
        self.steps += 1;
        tracing::info!(
            step = self.steps,
            pc = event.pc,
            op = event.name,
            gas_left = event.gas_left,
            depth = event.depth,
            "step"
        );
    }
}
