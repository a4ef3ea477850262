//! `ecli`: a thin command-line front end over `ethercore`, for running a
//! blob of EVM bytecode without writing a test harness.
//!
//! Grounded on `revm`'s own `bins/revme` (a `clap`-derived CLI dispatching
//! to subcommands, one of which — `statetest`/`bytecode`-style runners —
//! just executes code and prints the result), scaled down to the one
//! operation `ethercore::Evm::run_code` exposes.

mod tracer;

use clap::{Parser, Subcommand};
use ethercore::{Evm, EvmBuilder, InMemoryDb, RunCodeParams, SpecId};
use primitives::{Address, Bytes, U256};
use tracer::OpcodeTracer;

#[derive(Parser)]
#[command(name = "ecli", about = "Run EVM bytecode through ethercore")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Runs `--code` directly (no message-call framing, no persisted state).
    Run {
        /// Hex-encoded bytecode, with or without a leading `0x`.
        #[arg(long)]
        code: String,
        /// Hex-encoded calldata.
        #[arg(long, default_value = "")]
        data: String,
        /// Gas made available to the run.
        #[arg(long, default_value_t = 1_000_000)]
        gas_limit: u64,
        /// Hardfork to run under: frontier, homestead, tangerine,
        /// spurious_dragon, byzantium, constantinople, petersburg,
        /// istanbul, muir_glacier, berlin, london, arrow_glacier,
        /// gray_glacier, merge, shanghai, cancun, prague, latest.
        #[arg(long, default_value = "latest")]
        spec: String,
        /// `CALLER`.
        #[arg(long)]
        caller: Option<String>,
        /// `ADDRESS`.
        #[arg(long)]
        address: Option<String>,
        /// `CALLVALUE`, in wei.
        #[arg(long)]
        value: Option<String>,
        /// Runs with the static-call restriction forced on.
        #[arg(long)]
        is_static: bool,
        /// Skips the EIP-170 deployed-code size check.
        #[arg(long)]
        allow_unlimited_contract_size: bool,
        /// Logs every opcode step via `tracing`.
        #[arg(long)]
        trace: bool,
    },
}

fn parse_spec_id(name: &str) -> Option<SpecId> {
    Some(match name.to_ascii_lowercase().as_str() {
        "frontier" => SpecId::FRONTIER,
        "homestead" => SpecId::HOMESTEAD,
        "tangerine" => SpecId::TANGERINE,
        "spurious_dragon" | "spuriousdragon" => SpecId::SPURIOUS_DRAGON,
        "byzantium" => SpecId::BYZANTIUM,
        "constantinople" => SpecId::CONSTANTINOPLE,
        "petersburg" => SpecId::PETERSBURG,
        "istanbul" => SpecId::ISTANBUL,
        "muir_glacier" | "muirglacier" => SpecId::MUIR_GLACIER,
        "berlin" => SpecId::BERLIN,
        "london" => SpecId::LONDON,
        "arrow_glacier" | "arrowglacier" => SpecId::ARROW_GLACIER,
        "gray_glacier" | "grayglacier" => SpecId::GRAY_GLACIER,
        "merge" => SpecId::MERGE,
        "shanghai" => SpecId::SHANGHAI,
        "cancun" => SpecId::CANCUN,
        "prague" => SpecId::PRAGUE,
        "latest" => SpecId::LATEST,
        _ => return None,
    })
}

fn parse_hex_bytes(input: &str) -> Result<Bytes, String> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(trimmed)
        .map(Bytes::from)
        .map_err(|e| format!("invalid hex: {e}"))
}

fn parse_address(input: &str) -> Result<Address, String> {
    let trimmed = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(trimmed).map_err(|e| format!("invalid hex: {e}"))?;
    if bytes.len() != 20 {
        return Err(format!("address must be 20 bytes, got {}", bytes.len()));
    }
    Ok(Address::from_slice(&bytes))
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            code,
            data,
            gas_limit,
            spec,
            caller,
            address,
            value,
            is_static,
            allow_unlimited_contract_size,
            trace,
        } => run(
            code,
            data,
            gas_limit,
            spec,
            caller,
            address,
            value,
            is_static,
            allow_unlimited_contract_size,
            trace,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    code: String,
    data: String,
    gas_limit: u64,
    spec: String,
    caller: Option<String>,
    address: Option<String>,
    value: Option<String>,
    is_static: bool,
    allow_unlimited_contract_size: bool,
    trace: bool,
) {
    if trace {
        tracing_subscriber::fmt().with_max_level(tracing::Level::TRACE).init();
    } else {
        tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();
    }

    let spec_id = match parse_spec_id(&spec) {
        Some(spec_id) => spec_id,
        None => {
            eprintln!("unknown hardfork: {spec}");
            std::process::exit(2);
        }
    };

    let code = match parse_hex_bytes(&code) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };
    let data = match parse_hex_bytes(&data) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let mut params = RunCodeParams::new(code, gas_limit);
    params.data = data;
    params.is_static = is_static;
    if let Some(caller) = caller {
        params.caller = match parse_address(&caller) {
            Ok(address) => address,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(2);
            }
        };
    }
    if let Some(address) = address {
        params.address = match parse_address(&address) {
            Ok(address) => address,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(2);
            }
        };
    }
    if let Some(value) = value {
        params.value = match value.parse::<U256>() {
            Ok(value) => value,
            Err(err) => {
                eprintln!("invalid value: {err}");
                std::process::exit(2);
            }
        };
    }

    let mut evm: Evm<InMemoryDb> = EvmBuilder::new()
        .with_spec_id(spec_id)
        .with_allow_unlimited_contract_size(allow_unlimited_contract_size)
        .build(InMemoryDb::new());

    let result = if trace {
        let mut tracer = OpcodeTracer::new();
        evm.run_code_inspected(params, &mut tracer)
    } else {
        evm.run_code(params)
    };

    println!("gas used: {}", result.execution_gas_used);
    println!("gas left: {}", result.gas);
    println!("return value: 0x{}", hex::encode(&result.return_value));
    if let Some(logs) = &result.logs {
        println!("logs: {}", logs.len());
    }
    match result.exception_error {
        Some(error) => {
            eprintln!("error: {error}");
            std::process::exit(1);
        }
        None => {}
    }
}
