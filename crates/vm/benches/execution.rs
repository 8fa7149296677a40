//! Execution benchmarks
//!
//! Measures the dispatch loop on arithmetic loops, compound values and hashing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use neovm::{BasicHost, ExecutionEngine, OpCode, ScriptBuilder, VMState};

fn run(script: &[u8]) -> VMState {
    let mut engine = ExecutionEngine::new(BasicHost::new());
    if engine.load_script(script.to_vec()).is_err() {
        return VMState::FAULT;
    }
    engine.execute()
}

fn countdown_script(n: i64) -> Vec<u8> {
    let mut sb = ScriptBuilder::new();
    sb.emit_push_int(n)
        .emit_opcode(OpCode::DEC)
        .emit_opcode(OpCode::DUP)
        .emit_jump(OpCode::JMPIF, -2);
    sb.into_bytes()
}

fn benchmark_arithmetic_loop(c: &mut Criterion) {
    let script = countdown_script(1000);
    c.bench_function("countdown_loop_1000", |b| {
        b.iter(|| run(black_box(&script)))
    });
}

fn benchmark_compound_values(c: &mut Criterion) {
    let mut sb = ScriptBuilder::new();
    sb.emit_opcode(OpCode::NEWMAP);
    for i in 0..64 {
        sb.emit_opcode(OpCode::DUP)
            .emit_push_int(i)
            .emit_push_int(i * 3)
            .emit_opcode(OpCode::SETITEM);
    }
    sb.emit_opcode(OpCode::KEYS).emit_opcode(OpCode::ARRAYSIZE);
    let script = sb.into_bytes();

    c.bench_function("map_fill_64", |b| b.iter(|| run(black_box(&script))));
}

fn benchmark_hashing(c: &mut Criterion) {
    let mut sb = ScriptBuilder::new();
    sb.emit_push(&[0xAB; 256]);
    for _ in 0..32 {
        sb.emit_opcode(OpCode::HASH256);
    }
    let script = sb.into_bytes();

    c.bench_function("hash256_chain_32", |b| b.iter(|| run(black_box(&script))));
}

criterion_group!(
    benches,
    benchmark_arithmetic_loop,
    benchmark_compound_values,
    benchmark_hashing
);
criterion_main!(benches);
