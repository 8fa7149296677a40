//! Execution engine module for the virtual machine.
//!
//! The engine owns one evaluation stack and one alt stack shared by every
//! frame on the invocation stack. Each call to [`ExecutionEngine::step_into`]
//! decodes exactly one instruction, checks it against the configured limits,
//! and dispatches it through the jump table. Any error moves the engine to
//! `FAULT` and is kept for the caller.

use crate::error::{VmError, VmResult};
use crate::execution_context::ExecutionContext;
use crate::host::ExecutionHost;
use crate::instruction::Instruction;
use crate::interop_service::InteropService;
use crate::jump_table::JumpTable;
use crate::limits::{ExecutionEngineLimits, VmFeatures};
use crate::op_code::OpCode;
use crate::value_stack::ValueStack;
use crate::vm_state::VMState;
use crate::vm_value::VmValue;
use log::{debug, trace, warn};
use std::sync::Arc;

/// Represents the virtual machine execution engine.
pub struct ExecutionEngine<H> {
    host: H,
    state: VMState,
    invocation_stack: Vec<ExecutionContext>,
    evaluation_stack: ValueStack,
    alt_stack: ValueStack,
    limits: ExecutionEngineLimits,
    features: VmFeatures,
    jump_table: Arc<JumpTable<H>>,
    interop_service: Arc<InteropService<H>>,
    fault_error: Option<VmError>,
}

impl<H: ExecutionHost> ExecutionEngine<H> {
    /// Creates an engine with default limits and the base interop services.
    pub fn new(host: H) -> Self {
        Self::new_with_limits(host, ExecutionEngineLimits::DEFAULT)
    }

    pub fn new_with_limits(host: H, limits: ExecutionEngineLimits) -> Self {
        Self::with_services(
            host,
            limits,
            VmFeatures::default(),
            Arc::new(JumpTable::new()),
            Arc::new(InteropService::new()),
        )
    }

    /// Creates an engine around tables shared with other engines.
    pub fn with_services(
        host: H,
        limits: ExecutionEngineLimits,
        features: VmFeatures,
        jump_table: Arc<JumpTable<H>>,
        interop_service: Arc<InteropService<H>>,
    ) -> Self {
        Self {
            host,
            state: VMState::BREAK,
            invocation_stack: Vec::new(),
            evaluation_stack: ValueStack::new(limits.max_stack_size),
            alt_stack: ValueStack::new(limits.max_stack_size),
            limits,
            features,
            jump_table,
            interop_service,
            fault_error: None,
        }
    }

    /// Returns the current state of the VM.
    pub fn state(&self) -> VMState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consumes the engine and returns its host.
    pub fn into_host(self) -> H {
        self.host
    }

    pub fn limits(&self) -> &ExecutionEngineLimits {
        &self.limits
    }

    pub fn features(&self) -> VmFeatures {
        self.features
    }

    pub fn interop_service(&self) -> &Arc<InteropService<H>> {
        &self.interop_service
    }

    /// The error that moved the engine to `FAULT`, if any.
    pub fn fault_error(&self) -> Option<&VmError> {
        self.fault_error.as_ref()
    }

    pub fn evaluation_stack(&self) -> &ValueStack {
        &self.evaluation_stack
    }

    pub fn evaluation_stack_mut(&mut self) -> &mut ValueStack {
        &mut self.evaluation_stack
    }

    pub fn alt_stack(&self) -> &ValueStack {
        &self.alt_stack
    }

    pub fn alt_stack_mut(&mut self) -> &mut ValueStack {
        &mut self.alt_stack
    }

    /// Returns the invocation stack, entry frame first.
    pub fn invocation_stack(&self) -> &[ExecutionContext] {
        &self.invocation_stack
    }

    /// Returns the current context.
    pub fn current_context(&self) -> VmResult<&ExecutionContext> {
        self.invocation_stack
            .last()
            .ok_or_else(|| VmError::stack_underflow_msg("invocation stack is empty"))
    }

    pub fn current_context_mut(&mut self) -> VmResult<&mut ExecutionContext> {
        self.invocation_stack
            .last_mut()
            .ok_or_else(|| VmError::stack_underflow_msg("invocation stack is empty"))
    }

    /// The frame below the current one.
    pub fn calling_context(&self) -> Option<&ExecutionContext> {
        let len = self.invocation_stack.len();
        if len < 2 {
            return None;
        }
        self.invocation_stack.get(len - 2)
    }

    /// The first frame loaded.
    pub fn entry_context(&self) -> Option<&ExecutionContext> {
        self.invocation_stack.first()
    }

    /// Pushes an item onto the evaluation stack.
    pub fn push(&mut self, item: VmValue) -> VmResult<()> {
        self.evaluation_stack.push(item)
    }

    /// Pops an item from the evaluation stack.
    pub fn pop(&mut self) -> VmResult<VmValue> {
        self.evaluation_stack.pop()
    }

    pub fn peek(&self, n: usize) -> VmResult<&VmValue> {
        self.evaluation_stack.peek(n)
    }

    /// Loads a script as a new frame on top of the invocation stack.
    pub fn load_script(&mut self, script: Vec<u8>) -> VmResult<()> {
        self.load_context(ExecutionContext::new(script))
    }

    /// Loads a context into the invocation stack.
    pub fn load_context(&mut self, context: ExecutionContext) -> VmResult<()> {
        if self.invocation_stack.len() >= self.limits.max_invocation_stack_size {
            return Err(VmError::InvocationStackOverflow);
        }
        debug!(
            "load context {} at depth {}",
            hex::encode(context.script_hash()),
            self.invocation_stack.len()
        );
        self.invocation_stack.push(context);
        Ok(())
    }

    /// Pops the current frame. The engine halts at the end of the step that
    /// leaves the invocation stack empty.
    pub fn unload_context(&mut self) -> VmResult<ExecutionContext> {
        let context = self
            .invocation_stack
            .pop()
            .ok_or_else(|| VmError::stack_underflow_msg("invocation stack is empty"))?;
        debug!("unload context at depth {}", self.invocation_stack.len());
        Ok(context)
    }

    /// Runs until the engine halts, faults or reaches a breakpoint.
    pub fn execute(&mut self) -> VMState {
        if self.state.is_break() {
            self.state = VMState::NONE;
        }
        while !self.state.is_terminal() && !self.state.is_break() {
            self.step_into();
        }
        self.state
    }

    /// Executes exactly one instruction.
    pub fn step_into(&mut self) -> VMState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = VMState::NONE;
        if let Err(err) = self.execute_next() {
            self.on_fault(err);
        }
        self.state
    }

    /// Returns the instruction the next step will execute, or `None` when
    /// the next step is an implicit return or the engine is idle.
    pub fn next_instruction(&self) -> VmResult<Option<Instruction>> {
        let context = match self.invocation_stack.last() {
            Some(context) => context,
            None => return Ok(None),
        };
        if context.is_exhausted() {
            return Ok(None);
        }
        Instruction::decode(
            context.code(),
            context.instruction_pointer(),
            self.limits.max_item_size,
        )
        .map(Some)
    }

    /// Moves the engine to `FAULT` with `err`.
    pub fn fault(&mut self, err: VmError) {
        self.on_fault(err);
    }

    fn on_fault(&mut self, err: VmError) {
        warn!("vm fault: {}", err);
        self.fault_error = Some(err);
        self.state = VMState::FAULT;
    }

    fn execute_next(&mut self) -> VmResult<()> {
        let context = match self.invocation_stack.last() {
            Some(context) => context,
            None => {
                self.state = VMState::HALT;
                return Ok(());
            }
        };
        if context.is_exhausted() {
            self.unload_context()?;
            if self.invocation_stack.is_empty() {
                self.state = VMState::HALT;
            }
            return Ok(());
        }

        let instruction = Instruction::decode(
            context.code(),
            context.instruction_pointer(),
            self.limits.max_item_size,
        )?;
        let byte = instruction.opcode_byte();
        self.features.check(byte)?;
        self.limits
            .check_before_step(&instruction, &self.evaluation_stack, &self.alt_stack)?;
        self.current_context_mut()?
            .set_instruction_pointer(instruction.next_position())?;

        if OpCode::is_push_bytes(byte) {
            self.evaluation_stack
                .push(VmValue::ByteArray(instruction.operand().to_vec()))?;
        } else {
            let handler = self
                .jump_table
                .get_handler(byte)
                .ok_or(VmError::NotSupportOpcode(byte))?;
            trace!("{:04x} {:?}", instruction.position(), instruction.opcode());
            handler(self, &instruction)?;
        }

        self.limits
            .check_after_step(&self.evaluation_stack, &self.alt_stack)?;

        match self.invocation_stack.last() {
            None => self.state = VMState::HALT,
            Some(context) => {
                if context.has_break_point(context.instruction_pointer()) {
                    self.state = VMState::BREAK;
                }
            }
        }
        Ok(())
    }

    /// Computes the target of a relative jump taken by `instruction`.
    pub fn jump_target(&self, instruction: &Instruction) -> VmResult<usize> {
        let offset = i64::from(instruction.token_i16()?);
        let target = instruction.position() as i64 + offset;
        let len = self.current_context()?.code_len() as i64;
        if target < 0 || target > len {
            return Err(VmError::InvalidJump(target));
        }
        Ok(target as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BasicHost;

    #[test]
    fn test_new_engine_is_idle() {
        let engine = ExecutionEngine::new(BasicHost::new());
        assert_eq!(engine.state(), VMState::BREAK);
        assert!(engine.invocation_stack().is_empty());
        assert!(engine.fault_error().is_none());
    }

    #[test]
    fn test_empty_invocation_stack_halts() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        assert_eq!(engine.execute(), VMState::HALT);
    }

    #[test]
    fn test_push_add() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        engine
            .load_script(vec![OpCode::PUSH1 as u8, OpCode::PUSH2 as u8, OpCode::ADD as u8])
            .expect("load should succeed");
        assert_eq!(engine.execute(), VMState::HALT);
        assert_eq!(
            engine.peek(0).expect("result should exist").as_int64().expect("int"),
            3
        );
    }

    #[test]
    fn test_step_into_advances_one_instruction() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        engine
            .load_script(vec![OpCode::PUSH1 as u8, OpCode::PUSH2 as u8])
            .expect("load should succeed");
        assert_eq!(engine.step_into(), VMState::NONE);
        assert_eq!(engine.evaluation_stack().len(), 1);
        assert_eq!(engine.current_context().expect("context").instruction_pointer(), 1);
        assert_eq!(engine.step_into(), VMState::NONE);
        assert_eq!(engine.step_into(), VMState::HALT);
        assert_eq!(engine.step_into(), VMState::HALT);
    }

    #[test]
    fn test_break_point_pauses_execution() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        engine
            .load_script(vec![OpCode::PUSH1 as u8, OpCode::PUSH2 as u8, OpCode::PUSH3 as u8])
            .expect("load should succeed");
        engine
            .current_context_mut()
            .expect("context")
            .add_break_point(2);
        assert_eq!(engine.execute(), VMState::BREAK);
        assert_eq!(engine.evaluation_stack().len(), 2);
        assert_eq!(engine.execute(), VMState::HALT);
        assert_eq!(engine.evaluation_stack().len(), 3);
    }

    #[test]
    fn test_fault_keeps_error() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        engine
            .load_script(vec![0xFF])
            .expect("load should succeed");
        assert_eq!(engine.execute(), VMState::FAULT);
        assert_eq!(engine.fault_error(), Some(&VmError::NotSupportOpcode(0xFF)));
        assert_eq!(engine.execute(), VMState::FAULT);
    }

    #[test]
    fn test_next_instruction_peeks() {
        let mut engine = ExecutionEngine::new(BasicHost::new());
        engine
            .load_script(vec![OpCode::PUSH5 as u8])
            .expect("load should succeed");
        let next = engine
            .next_instruction()
            .expect("decode should succeed")
            .expect("instruction should exist");
        assert_eq!(next.opcode_byte(), OpCode::PUSH5 as u8);
        assert_eq!(engine.current_context().expect("context").instruction_pointer(), 0);
    }
}
