#![cfg(test)]

mod diagnostics;
mod eval;
mod spirv_module;

use itertools::Itertools;
use spvsl_compiler::CompileParams;

fn init_logger() {
    tracing_subscriber::fmt::Subscriber::builder()
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

#[track_caller]
fn _compile(source: &str, params: CompileParams) -> Vec<u32> {
    init_logger();
    spvsl_compiler::compile_source(source, params).unwrap_or_else(|e| panic!("{e}"))
}

/// One instruction per line, without the header words.
#[track_caller]
fn _disassemble(source: &str, params: CompileParams) -> String {
    let words = _compile(source, params);
    let (_, instructions) = spvsl_bin::spv::decode_module(&words).unwrap();
    instructions.iter().join("\n")
}

/// Opcodes of the module, in order.
#[track_caller]
fn _ops(source: &str, params: CompileParams) -> Vec<spirv::Op> {
    let words = _compile(source, params);
    let (_, instructions) = spvsl_bin::spv::decode_module(&words).unwrap();
    instructions.into_iter().map(|i| i.op).collect()
}
