//! Gas pricing and metering.
//!
//! Prices are looked up before an instruction runs. SYSCALLs take the price
//! registered with their interop descriptor; `System.Storage.Put` is charged
//! per started kilobyte of key plus value.

use crate::syscalls::STORAGE_PUT;
use neovm::{ExecutionEngine, ExecutionHost, Instruction, OpCode, VmError, VmResult};
use neovm_config::{
    APPCALL_GAS, HASH160_GAS, HASH256_GAS, OPCODE_GAS, SHA1_GAS, SHA256_GAS, STORAGE_PUT_BLOCK_SIZE,
    STORAGE_PUT_GAS, TAILCALL_GAS,
};

/// Price of a non-SYSCALL opcode byte.
pub fn opcode_price(byte: u8) -> u64 {
    match byte {
        b if b == OpCode::APPCALL as u8 => APPCALL_GAS,
        b if b == OpCode::TAILCALL as u8 => TAILCALL_GAS,
        b if b == OpCode::SHA1 as u8 => SHA1_GAS,
        b if b == OpCode::SHA256 as u8 => SHA256_GAS,
        b if b == OpCode::HASH160 as u8 => HASH160_GAS,
        b if b == OpCode::HASH256 as u8 => HASH256_GAS,
        _ => OPCODE_GAS,
    }
}

/// Price of a `System.Storage.Put` writing `size` bytes of key plus value.
pub fn storage_put_price(size: u64) -> u64 {
    STORAGE_PUT_GAS * (size.saturating_sub(1) / STORAGE_PUT_BLOCK_SIZE + 1)
}

/// Price of `instruction` given the engine's current stack.
pub fn instruction_price<H: ExecutionHost>(
    engine: &ExecutionEngine<H>,
    instruction: &Instruction,
) -> VmResult<u64> {
    let byte = instruction.opcode_byte();
    if byte != OpCode::SYSCALL as u8 {
        return Ok(opcode_price(byte));
    }
    let name = instruction.token_string()?;
    if name == STORAGE_PUT {
        // context, key, value from the top
        let key = engine.peek(1)?.as_bytes()?;
        let value = engine.peek(2)?.as_bytes()?;
        return Ok(storage_put_price((key.len() + value.len()) as u64));
    }
    Ok(engine
        .interop_service()
        .get_price(&name)
        .unwrap_or(OPCODE_GAS))
}

/// Tracks gas spent against a fixed budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasMeter {
    limit: u64,
    consumed: u64,
}

impl GasMeter {
    pub fn new(limit: u64) -> Self {
        Self { limit, consumed: 0 }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn remaining(&self) -> u64 {
        self.limit - self.consumed
    }

    /// Charges `price`. Nothing is charged when the budget cannot cover it.
    pub fn consume(&mut self, price: u64) -> VmResult<()> {
        if price > self.remaining() {
            return Err(VmError::OutOfGas);
        }
        self.consumed += price;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_prices() {
        assert_eq!(opcode_price(OpCode::ADD as u8), OPCODE_GAS);
        assert_eq!(opcode_price(OpCode::APPCALL as u8), APPCALL_GAS);
        assert_eq!(opcode_price(OpCode::HASH256 as u8), HASH256_GAS);
        assert_eq!(opcode_price(0x05), OPCODE_GAS);
    }

    #[test]
    fn test_storage_put_price_blocks() {
        assert_eq!(storage_put_price(0), STORAGE_PUT_GAS);
        assert_eq!(storage_put_price(1), STORAGE_PUT_GAS);
        assert_eq!(storage_put_price(1024), STORAGE_PUT_GAS);
        assert_eq!(storage_put_price(1025), 2 * STORAGE_PUT_GAS);
        assert_eq!(storage_put_price(3000), 3 * STORAGE_PUT_GAS);
    }

    #[test]
    fn test_meter_rejects_overspend() {
        let mut meter = GasMeter::new(10);
        meter.consume(4).expect("consume should succeed");
        meter.consume(6).expect("consume should succeed");
        assert_eq!(meter.remaining(), 0);
        assert_eq!(meter.consume(1), Err(VmError::OutOfGas));
        assert_eq!(meter.consumed(), 10);
    }
}
