//! # NeoVM
//!
//! A deterministic, stack-based virtual machine for NeoVM 2 bytecode.
//!
//! The engine executes one contract invocation at a time. Every rule
//! violation (stack bounds, integer size, bad operand types, failed
//! interop calls) moves it to [`VMState::FAULT`] instead of panicking, so
//! two nodes running the same bytecode over the same inputs always agree
//! on the outcome.
//!
//! ## Architecture
//!
//! - **ExecutionEngine**: the step loop, invocation stack and VM state
//! - **ValueStack**: bounded evaluation and alt stacks
//! - **VmValue / IntValue**: the value model and bounded integers
//! - **JumpTable**: per-opcode handlers
//! - **InteropService**: the SYSCALL registry
//! - **ScriptBuilder**: bytecode assembly
//!
//! ## Example
//!
//! ```rust
//! use neovm::{BasicHost, ExecutionEngine, OpCode, ScriptBuilder, VMState};
//!
//! let mut sb = ScriptBuilder::new();
//! sb.emit_push_int(1).emit_push_int(2).emit_opcode(OpCode::ADD);
//!
//! let mut engine = ExecutionEngine::new(BasicHost::new());
//! engine.load_script(sb.to_array()).unwrap();
//! assert_eq!(engine.execute(), VMState::HALT);
//! assert_eq!(engine.peek(0).unwrap().as_int64().unwrap(), 3);
//! ```

#![warn(rustdoc::missing_crate_level_docs)]

/// Hashing and signature verification
pub mod crypto;
/// Fault taxonomy
pub mod error;
/// Call frames over shared code buffers
pub mod execution_context;
/// The step loop
pub mod execution_engine;
/// Capabilities borrowed from the embedder
pub mod host;
/// Instruction decoding
pub mod instruction;
/// Bounded integers
pub mod int_value;
/// SYSCALL registry
pub mod interop_service;
/// Byte readers and writers
pub mod io;
/// Opcode handlers
pub mod jump_table;
/// Resource limits and feature switches
pub mod limits;
/// Opcode bytes and operand layouts
pub mod op_code;
/// Bytecode assembler
pub mod script_builder;
/// Bounded value stacks
pub mod value_stack;
pub mod vm_state;
/// Stack values
pub mod vm_value;

pub use crypto::{Crypto, DefaultCrypto};
pub use error::{VmError, VmResult};
pub use execution_context::{ExecutionContext, ScriptHash};
pub use execution_engine::ExecutionEngine;
pub use host::{BasicHost, CodeTable, ExecutionHost, MemoryCodeTable};
pub use instruction::Instruction;
pub use int_value::IntValue;
pub use interop_service::{InteropDescriptor, InteropMethod, InteropService, InteropValidator};
pub use jump_table::{InstructionHandler, JumpTable};
pub use limits::{ExecutionEngineLimits, VmFeatures};
pub use op_code::{OpCode, OperandSize};
pub use script_builder::ScriptBuilder;
pub use value_stack::ValueStack;
pub use vm_state::VMState;
pub use vm_value::{InteropInterface, InteropValue, MapValue, VmValue};
