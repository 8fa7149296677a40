//! Gas accounting, storage commit and events through `NeoVmService`.

mod common;

use common::{emit_put, result_bytes, result_int, Chain};
use neovm::crypto::hash160;
use neovm::{OpCode, ScriptBuilder, VMState, VmError};
use neovm_config::{ServiceConfig, APPCALL_GAS, STORAGE_PUT_GAS};
use neovm_service::syscalls::{
    RUNTIME_LOG, RUNTIME_NOTIFY, STORAGE_GET, STORAGE_GET_CONTEXT, STORAGE_GET_READ_ONLY_CONTEXT,
    STORAGE_PUT,
};
use neovm_service::ServiceError;
use serde_json::json;

#[test]
fn test_empty_script_is_rejected() {
    let chain = Chain::new();
    let err = chain.service().invoke(Vec::new()).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCode(_)));
}

#[test]
fn test_gas_is_charged_per_instruction() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_push_int(1).emit_push_int(2).emit_opcode(OpCode::ADD);

    let outcome = chain.invoke(sb.to_array());
    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(result_int(&outcome), 3);
    assert_eq!(outcome.gas_consumed, 3);
    assert!(outcome.error.is_none());
}

#[test]
fn test_out_of_gas_faults() {
    let chain = Chain::new();
    let config = ServiceConfig {
        gas_limit: 2,
        ..ServiceConfig::default()
    };
    let mut sb = ScriptBuilder::new();
    sb.emit_push_int(1).emit_push_int(2).emit_opcode(OpCode::ADD);

    let outcome = chain
        .service_with(config)
        .invoke(sb.to_array())
        .expect("invoke should succeed");
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error, Some(VmError::OutOfGas));
    assert_eq!(outcome.error_kind(), Some("out of gas"));
    assert_eq!(outcome.gas_consumed, 2);
    assert!(outcome.result.is_none());
}

#[test]
fn test_endless_loop_is_bounded_by_gas() {
    let chain = Chain::new();
    let config = ServiceConfig {
        gas_limit: 25,
        ..ServiceConfig::default()
    };
    let mut sb = ScriptBuilder::new();
    sb.emit_jump(OpCode::JMP, 0);

    let outcome = chain
        .service_with(config)
        .invoke(sb.to_array())
        .expect("invoke should succeed");
    assert_eq!(outcome.error, Some(VmError::OutOfGas));
    assert_eq!(outcome.gas_consumed, 25);
}

#[test]
fn test_pre_exec_step_limit() {
    let chain = Chain::new();
    let config = ServiceConfig {
        pre_exec: true,
        step_limit: 10,
        ..ServiceConfig::default()
    };
    let mut sb = ScriptBuilder::new();
    sb.emit_jump(OpCode::JMP, 0);

    let outcome = chain
        .service_with(config)
        .invoke(sb.to_array())
        .expect("invoke should succeed");
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error, Some(VmError::StepLimitExceeded));
    assert_eq!(outcome.gas_consumed, 10);
}

#[test]
fn test_storage_put_commits_on_halt() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    emit_put(&mut sb, b"k", b"v");
    let code = sb.to_array();
    let address = chain.deploy(code.clone());

    let outcome = chain.invoke(code);
    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(outcome.gas_consumed, 3 + STORAGE_PUT_GAS);
    assert_eq!(chain.storage_value(&address, b"k"), Some(b"v".to_vec()));
}

#[test]
fn test_storage_put_is_priced_per_kilobyte() {
    let chain = Chain::new();
    let value = vec![0xAB; 2000];
    let mut sb = ScriptBuilder::new();
    emit_put(&mut sb, b"k", &value);
    let code = sb.to_array();
    let address = chain.deploy(code.clone());

    let outcome = chain.invoke(code);
    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(outcome.gas_consumed, 3 + 2 * STORAGE_PUT_GAS);
    assert_eq!(chain.storage_value(&address, b"k"), Some(value));
}

#[test]
fn test_fault_discards_storage_writes() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    emit_put(&mut sb, b"k", b"v").emit_opcode(OpCode::THROW);
    let code = sb.to_array();
    let address = chain.deploy(code.clone());

    let outcome = chain.invoke(code);
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error_kind(), Some("throw"));
    assert_eq!(outcome.gas_consumed, 4 + STORAGE_PUT_GAS);
    assert_eq!(chain.storage_value(&address, b"k"), None);
}

#[test]
fn test_put_requires_deployed_contract() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    emit_put(&mut sb, b"k", b"v");

    let outcome = chain.invoke(sb.to_array());
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error_kind(), Some("contract not found"));
}

#[test]
fn test_put_through_read_only_context_faults() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_push(b"v")
        .emit_push(b"k")
        .emit_syscall(STORAGE_GET_READ_ONLY_CONTEXT)
        .emit_syscall(STORAGE_PUT);
    let code = sb.to_array();
    let address = chain.deploy(code.clone());

    let outcome = chain.invoke(code);
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error_kind(), Some("interop error"));
    assert_eq!(chain.storage_value(&address, b"k"), None);
}

#[test]
fn test_oversized_storage_key_faults() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    emit_put(&mut sb, &[1u8; 1025], b"v");
    let code = sb.to_array();
    chain.deploy(code.clone());

    let outcome = chain.invoke(code);
    assert!(matches!(outcome.error, Some(VmError::OverMaxItemSize(_))));
}

#[test]
fn test_get_reads_committed_value_and_missing_key() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_push(b"k")
        .emit_syscall(STORAGE_GET_CONTEXT)
        .emit_syscall(STORAGE_GET);
    let code = sb.to_array();
    let address = hash160(&code);

    let outcome = chain.invoke(code.clone());
    assert_eq!(outcome.state, VMState::HALT);
    assert!(result_bytes(&outcome).is_empty());

    chain.seed_storage(&address, b"k", b"stored");
    let outcome = chain.invoke(code);
    assert_eq!(result_bytes(&outcome), b"stored".to_vec());
}

#[test]
fn test_notifications_and_logs_on_halt() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_push_string("hi")
        .emit_syscall(RUNTIME_NOTIFY)
        .emit_push_string("hello")
        .emit_syscall(RUNTIME_LOG)
        .emit_push_int(1);
    let code = sb.to_array();

    let outcome = chain.invoke(code.clone());
    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(outcome.notifications.len(), 1);
    assert_eq!(outcome.notifications[0].states, json!("6869"));
    assert_eq!(outcome.notifications[0].contract_address, hash160(&code));
    assert_eq!(outcome.logs.len(), 1);
    assert_eq!(outcome.logs[0].message, "hello");
}

#[test]
fn test_notifications_dropped_on_fault() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_push_string("hi")
        .emit_syscall(RUNTIME_NOTIFY)
        .emit_opcode(OpCode::THROW);

    let outcome = chain.invoke(sb.to_array());
    assert_eq!(outcome.state, VMState::FAULT);
    assert!(outcome.notifications.is_empty());
}

#[test]
fn test_appcall_runs_callee_with_its_own_storage() {
    let chain = Chain::new();
    let mut callee = ScriptBuilder::new();
    emit_put(&mut callee, b"k", b"v").emit_push_int(5);
    let callee_address = chain.deploy(callee.to_array());

    let mut caller = ScriptBuilder::new();
    caller.emit_app_call(&callee_address, false);
    let outcome = chain.invoke(caller.to_array());

    assert_eq!(outcome.state, VMState::HALT);
    assert_eq!(result_int(&outcome), 5);
    assert_eq!(outcome.gas_consumed, APPCALL_GAS + 4 + STORAGE_PUT_GAS);
    assert_eq!(
        chain.storage_value(&callee_address, b"k"),
        Some(b"v".to_vec())
    );
}

#[test]
fn test_appcall_to_unknown_contract_faults() {
    let chain = Chain::new();
    let mut caller = ScriptBuilder::new();
    caller.emit_app_call(&[0x42; 20], false);

    let outcome = chain.invoke(caller.to_array());
    assert_eq!(outcome.state, VMState::FAULT);
    assert_eq!(outcome.error_kind(), Some("contract not found"));
}

#[test]
fn test_disabled_map_opcodes() {
    let chain = Chain::new();
    let mut config = ServiceConfig::default();
    config.vm.disable_has_key = true;
    let mut sb = ScriptBuilder::new();
    sb.emit_opcode(OpCode::NEWMAP)
        .emit_push_int(1)
        .emit_opcode(OpCode::HASKEY);

    let outcome = chain
        .service_with(config)
        .invoke(sb.to_array())
        .expect("invoke should succeed");
    assert_eq!(
        outcome.error,
        Some(VmError::NotSupportOpcode(OpCode::HASKEY as u8))
    );
}

#[test]
fn test_unknown_syscall_faults() {
    let chain = Chain::new();
    let mut sb = ScriptBuilder::new();
    sb.emit_syscall("System.Nope");

    let outcome = chain.invoke(sb.to_array());
    assert_eq!(outcome.error_kind(), Some("service not supported"));
    assert_eq!(outcome.gas_consumed, 1);
}
