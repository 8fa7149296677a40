//! Resource limits enforced around every step.
//!
//! Checks that depend on operand values run before the opcode executes so a
//! rejected instruction never mutates the stacks. The stack-size and integer
//! bounds are re-checked after the step.

use crate::error::{VmError, VmResult};
use crate::instruction::Instruction;
use crate::op_code::OpCode;
use crate::value_stack::ValueStack;
use crate::vm_value::VmValue;
use neovm_config::{
    VmConfig, MAX_ARRAY_SIZE, MAX_BIGINT_SIZE, MAX_CLONE_COUNT, MAX_INVOCATION_STACK_SIZE,
    MAX_ITEM_SIZE, MAX_STRUCT_DEPTH, STACK_LIMIT,
};
use std::convert::TryFrom;

/// Restrictions on the VM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionEngineLimits {
    /// The maximum number of items on the evaluation and alt stacks combined.
    pub max_stack_size: usize,

    /// The maximum size of an item in bytes.
    pub max_item_size: usize,

    /// The maximum number of elements in an array, struct or map.
    pub max_array_size: usize,

    /// The maximum size of an integer in bytes.
    pub max_bigint_size: usize,

    /// The maximum number of frames on the invocation stack.
    pub max_invocation_stack_size: usize,

    /// The maximum nesting accepted by serialization.
    pub max_struct_depth: usize,

    /// The maximum number of items copied by one struct clone.
    pub max_clone_count: usize,
}

impl ExecutionEngineLimits {
    /// The default limits.
    pub const DEFAULT: Self = Self {
        max_stack_size: STACK_LIMIT,
        max_item_size: MAX_ITEM_SIZE,
        max_array_size: MAX_ARRAY_SIZE,
        max_bigint_size: MAX_BIGINT_SIZE,
        max_invocation_stack_size: MAX_INVOCATION_STACK_SIZE,
        max_struct_depth: MAX_STRUCT_DEPTH,
        max_clone_count: MAX_CLONE_COUNT,
    };

    /// Rejects the instruction if executing it could break a limit.
    pub fn check_before_step(
        &self,
        instruction: &Instruction,
        eval: &ValueStack,
        alt: &ValueStack,
    ) -> VmResult<()> {
        let byte = instruction.opcode_byte();
        if OpCode::is_push_bytes(byte) {
            return self.check_stack_growth(eval, alt, 1);
        }
        let opcode = OpCode::try_from(byte)?;
        match opcode {
            OpCode::PUSH0
            | OpCode::PUSHDATA1
            | OpCode::PUSHDATA2
            | OpCode::PUSHDATA4
            | OpCode::PUSHM1
            | OpCode::DUP
            | OpCode::OVER
            | OpCode::TUCK
            | OpCode::DEPTH
            | OpCode::DUPFROMALTSTACK
            | OpCode::NEWMAP => self.check_stack_growth(eval, alt, 1),
            op if (OpCode::PUSH1..=OpCode::PUSH16).contains(&op) => {
                self.check_stack_growth(eval, alt, 1)
            }
            OpCode::UNPACK => {
                let growth = match eval.peek(0)? {
                    VmValue::Array(items) => items.borrow().len(),
                    _ => 0,
                };
                self.check_stack_growth(eval, alt, growth)
            }
            OpCode::PACK | OpCode::NEWARRAY | OpCode::NEWSTRUCT => {
                let count = eval.peek(0)?.as_int64()?;
                if count < 0 || count as u64 > self.max_array_size as u64 {
                    return Err(VmError::OverMaxArraySize(format!(
                        "{} requested {} elements, limit {}",
                        opcode, count, self.max_array_size
                    )));
                }
                Ok(())
            }
            OpCode::CAT => {
                let right = eval.peek(0)?.as_bytes()?.len();
                let left = eval.peek(1)?.as_bytes()?.len();
                if left + right > self.max_item_size {
                    return Err(VmError::OverMaxItemSize(format!(
                        "CAT result of {} bytes",
                        left + right
                    )));
                }
                Ok(())
            }
            OpCode::INC
            | OpCode::DEC
            | OpCode::SIGN
            | OpCode::NEGATE
            | OpCode::ABS
            | OpCode::INVERT
            | OpCode::NZ => self.check_integer_operands(eval, 1),
            OpCode::ADD
            | OpCode::SUB
            | OpCode::MUL
            | OpCode::DIV
            | OpCode::MOD
            | OpCode::MIN
            | OpCode::MAX
            | OpCode::AND
            | OpCode::OR
            | OpCode::XOR
            | OpCode::SHL
            | OpCode::SHR => self.check_integer_operands(eval, 2),
            _ => Ok(()),
        }
    }

    /// Re-checks the stack size and the integer on top after a step.
    pub fn check_after_step(&self, eval: &ValueStack, alt: &ValueStack) -> VmResult<()> {
        if eval.len() + alt.len() > self.max_stack_size {
            return Err(VmError::StackOverflow(format!(
                "{} items exceed stack limit {}",
                eval.len() + alt.len(),
                self.max_stack_size
            )));
        }
        if let Ok(VmValue::Integer(value)) = eval.peek(0) {
            if value.to_bytes().len() > self.max_bigint_size {
                return Err(VmError::OverMaxBigIntegerSize);
            }
        }
        Ok(())
    }

    fn check_stack_growth(&self, eval: &ValueStack, alt: &ValueStack, growth: usize) -> VmResult<()> {
        if eval.len() + alt.len() + growth > self.max_stack_size {
            return Err(VmError::StackOverflow(format!(
                "pushing {} items onto {} exceeds stack limit {}",
                growth,
                eval.len() + alt.len(),
                self.max_stack_size
            )));
        }
        Ok(())
    }

    fn check_integer_operands(&self, eval: &ValueStack, count: usize) -> VmResult<()> {
        for n in 0..count.min(eval.len()) {
            let size = match eval.peek(n)? {
                VmValue::Integer(value) => value.to_bytes().len(),
                VmValue::ByteArray(bytes) => bytes.len(),
                _ => continue,
            };
            if size > self.max_bigint_size {
                return Err(VmError::OverMaxBigIntegerSize);
            }
        }
        Ok(())
    }
}

impl Default for ExecutionEngineLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&VmConfig> for ExecutionEngineLimits {
    fn from(config: &VmConfig) -> Self {
        Self {
            max_stack_size: config.max_stack_size,
            max_item_size: config.max_item_size,
            max_array_size: config.max_array_size,
            max_bigint_size: config.max_bigint_size,
            max_invocation_stack_size: config.max_invocation_stack_size,
            max_struct_depth: config.max_struct_depth,
            max_clone_count: config.max_clone_count,
        }
    }
}

/// Optional opcode groups a chain may switch off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-types", derive(serde::Serialize, serde::Deserialize))]
pub struct VmFeatures {
    /// Disables HASKEY, KEYS, VALUES and DCALL.
    pub disable_has_key: bool,
}

impl VmFeatures {
    /// Fails with `NotSupportOpcode` when the opcode is switched off.
    pub fn check(&self, byte: u8) -> VmResult<()> {
        if self.disable_has_key {
            let gated = [OpCode::HASKEY, OpCode::KEYS, OpCode::VALUES, OpCode::DCALL];
            if gated.iter().any(|op| *op as u8 == byte) {
                return Err(VmError::NotSupportOpcode(byte));
            }
        }
        Ok(())
    }
}

impl From<&VmConfig> for VmFeatures {
    fn from(config: &VmConfig) -> Self {
        Self {
            disable_has_key: config.disable_has_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn decode(bytes: &[u8]) -> Instruction {
        let code: Arc<[u8]> = Arc::from(bytes.to_vec());
        Instruction::decode(&code, 0, MAX_ITEM_SIZE).expect("decode should succeed")
    }

    #[test]
    fn test_pack_count_checked_without_mutation() {
        let limits = ExecutionEngineLimits::DEFAULT;
        let mut eval = ValueStack::new(STACK_LIMIT);
        let alt = ValueStack::new(STACK_LIMIT);
        eval.push(VmValue::from((MAX_ARRAY_SIZE + 1) as i64))
            .expect("push should succeed");
        let err = limits
            .check_before_step(&decode(&[OpCode::PACK as u8]), &eval, &alt)
            .unwrap_err();
        assert!(matches!(err, VmError::OverMaxArraySize(_)));
        assert_eq!(eval.len(), 1);
    }

    #[test]
    fn test_stack_growth_counts_both_stacks() {
        let limits = ExecutionEngineLimits {
            max_stack_size: 2,
            ..ExecutionEngineLimits::DEFAULT
        };
        let mut eval = ValueStack::new(8);
        let mut alt = ValueStack::new(8);
        eval.push(VmValue::from(1i64)).expect("push should succeed");
        alt.push(VmValue::from(1i64)).expect("push should succeed");
        assert!(limits
            .check_before_step(&decode(&[OpCode::DUP as u8]), &eval, &alt)
            .is_err());
        assert!(limits
            .check_before_step(&decode(&[OpCode::DROP as u8]), &eval, &alt)
            .is_ok());
    }

    #[test]
    fn test_cat_result_size() {
        let limits = ExecutionEngineLimits {
            max_item_size: 4,
            ..ExecutionEngineLimits::DEFAULT
        };
        let mut eval = ValueStack::new(8);
        let alt = ValueStack::new(8);
        eval.push(VmValue::from(vec![1u8; 3])).expect("push should succeed");
        eval.push(VmValue::from(vec![1u8; 2])).expect("push should succeed");
        assert!(matches!(
            limits.check_before_step(&decode(&[OpCode::CAT as u8]), &eval, &alt),
            Err(VmError::OverMaxItemSize(_))
        ));
    }

    #[test]
    fn test_integer_operand_size() {
        let limits = ExecutionEngineLimits::DEFAULT;
        let mut eval = ValueStack::new(8);
        let alt = ValueStack::new(8);
        eval.push(VmValue::from(vec![1u8; 33])).expect("push should succeed");
        eval.push(VmValue::from(1i64)).expect("push should succeed");
        assert_eq!(
            limits
                .check_before_step(&decode(&[OpCode::ADD as u8]), &eval, &alt)
                .unwrap_err(),
            VmError::OverMaxBigIntegerSize
        );
    }

    #[test]
    fn test_features_gate_map_opcodes() {
        let features = VmFeatures {
            disable_has_key: true,
        };
        assert_eq!(
            features.check(OpCode::HASKEY as u8).unwrap_err(),
            VmError::NotSupportOpcode(OpCode::HASKEY as u8)
        );
        assert!(features.check(OpCode::NEWMAP as u8).is_ok());
        assert!(VmFeatures::default().check(OpCode::DCALL as u8).is_ok());
    }

    #[test]
    fn test_limits_from_config() {
        let config = VmConfig {
            max_array_size: 7,
            ..VmConfig::default()
        };
        let limits = ExecutionEngineLimits::from(&config);
        assert_eq!(limits.max_array_size, 7);
        assert_eq!(limits.max_stack_size, STACK_LIMIT);
    }
}
