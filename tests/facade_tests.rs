//! End-to-end invocations through the facade crate.

use neovm_rs::prelude::*;
use proptest::prelude::*;
use std::sync::Arc;

fn service() -> NeoVmService {
    NeoVmService::new(
        ServiceConfig::default(),
        Arc::new(MemoryLedger::new()),
        Arc::new(MemoryStorage::new()),
    )
}

#[test]
fn test_hex_script_halts() {
    // PUSH2 PUSH3 MUL
    let code = hex::decode("525395").expect("hex should decode");
    let outcome = service().invoke(code).expect("invoke should succeed");
    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(
        outcome
            .result
            .expect("result should be present")
            .as_int64()
            .expect("result should be an integer"),
        6
    );
    assert_eq!(outcome.gas_consumed, 3);
}

#[test]
fn test_version_is_set() {
    assert!(!neovm_rs::VERSION.is_empty());
}

proptest! {
    #[test]
    fn prop_invocations_are_deterministic(a in -1000i64..1000, b in -1000i64..1000) {
        let mut sb = ScriptBuilder::new();
        sb.emit_push_int(a)
            .emit_push_int(b)
            .emit_opcode(OpCode::ADD)
            .emit_push_int(a)
            .emit_opcode(OpCode::MUL);
        let code = sb.to_array();

        let first = service().invoke(code.clone()).expect("invoke should succeed");
        let second = service().invoke(code).expect("invoke should succeed");
        prop_assert_eq!(first.state, VMState::HALT);
        prop_assert_eq!(first.gas_consumed, second.gas_consumed);
        prop_assert_eq!(first.gas_consumed, 5);
        let expected = (a + b) * a;
        let value = first.result.expect("result should be present").as_int64().expect("integer");
        prop_assert_eq!(value, expected);
        let value = second.result.expect("result should be present").as_int64().expect("integer");
        prop_assert_eq!(value, expected);
    }
}
