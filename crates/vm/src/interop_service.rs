//! Interop service module for the virtual machine.
//!
//! SYSCALL resolves its operand against this registry. The base registry
//! only knows the execution-engine queries; hosts extend it with their own
//! services before sharing it between engines.

use crate::error::{VmError, VmResult};
use crate::execution_engine::ExecutionEngine;
use crate::host::ExecutionHost;
use crate::vm_value::VmValue;
use hashbrown::HashMap;
use log::debug;
use std::fmt;

/// A function that provides interoperability with external services.
pub type InteropMethod<H> = fn(engine: &mut ExecutionEngine<H>) -> VmResult<()>;

/// Checks the stack shape of a call before its handler runs.
pub type InteropValidator<H> = fn(engine: &ExecutionEngine<H>) -> VmResult<()>;

/// Represents an interop descriptor.
pub struct InteropDescriptor<H> {
    /// The name of the interop method
    pub name: String,

    /// The handler function
    pub handler: InteropMethod<H>,

    /// Optional argument check run before the handler
    pub validator: Option<InteropValidator<H>>,

    /// The fee charged for using this interop service
    pub price: u64,
}

impl<H> Clone for InteropDescriptor<H> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            handler: self.handler,
            validator: self.validator,
            price: self.price,
        }
    }
}

impl<H> fmt::Debug for InteropDescriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteropDescriptor")
            .field("name", &self.name)
            .field("price", &self.price)
            .field("validated", &self.validator.is_some())
            .finish()
    }
}

/// Provides interoperability between the VM and external services.
pub struct InteropService<H> {
    methods: HashMap<String, InteropDescriptor<H>>,
}

impl<H> Clone for InteropService<H> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
        }
    }
}

impl<H: ExecutionHost> Default for InteropService<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ExecutionHost> InteropService<H> {
    /// Creates a registry holding the execution-engine services.
    pub fn new() -> Self {
        let mut service = Self::empty();
        service.register_method(
            "System.ExecutionEngine.GetExecutingScriptHash",
            get_executing_script_hash::<H>,
            None,
            0,
        );
        service.register_method(
            "System.ExecutionEngine.GetCallingScriptHash",
            get_calling_script_hash::<H>,
            None,
            0,
        );
        service.register_method(
            "System.ExecutionEngine.GetEntryScriptHash",
            get_entry_script_hash::<H>,
            None,
            0,
        );
        service
    }

    /// Creates a registry with no services.
    pub fn empty() -> Self {
        Self {
            methods: HashMap::new(),
        }
    }

    /// Registers a descriptor. Returns false and keeps the existing entry
    /// when the name is already taken.
    pub fn register(&mut self, descriptor: InteropDescriptor<H>) -> bool {
        if self.methods.contains_key(&descriptor.name) {
            return false;
        }
        self.methods.insert(descriptor.name.clone(), descriptor);
        true
    }

    pub fn register_method(
        &mut self,
        name: &str,
        handler: InteropMethod<H>,
        validator: Option<InteropValidator<H>>,
        price: u64,
    ) -> bool {
        self.register(InteropDescriptor {
            name: name.to_string(),
            handler,
            validator,
            price,
        })
    }

    pub fn get_method(&self, name: &str) -> Option<&InteropDescriptor<H>> {
        self.methods.get(name)
    }

    /// Gets the price of an interop method, if registered.
    pub fn get_price(&self, name: &str) -> Option<u64> {
        self.methods.get(name).map(|descriptor| descriptor.price)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Invokes an interop method by name.
    pub fn invoke(&self, name: &str, engine: &mut ExecutionEngine<H>) -> VmResult<()> {
        let descriptor = self
            .methods
            .get(name)
            .ok_or_else(|| VmError::NotSupportService(name.to_string()))?;
        debug!("syscall {}", name);
        if let Some(validator) = descriptor.validator {
            validator(engine)?;
        }
        (descriptor.handler)(engine)
    }
}

fn get_executing_script_hash<H: ExecutionHost>(engine: &mut ExecutionEngine<H>) -> VmResult<()> {
    let hash = engine.current_context()?.script_hash().to_vec();
    engine.push(VmValue::ByteArray(hash))
}

fn get_calling_script_hash<H: ExecutionHost>(engine: &mut ExecutionEngine<H>) -> VmResult<()> {
    let hash = engine
        .calling_context()
        .ok_or_else(|| VmError::interop_msg("no calling context"))?
        .script_hash()
        .to_vec();
    engine.push(VmValue::ByteArray(hash))
}

fn get_entry_script_hash<H: ExecutionHost>(engine: &mut ExecutionEngine<H>) -> VmResult<()> {
    let hash = engine
        .entry_context()
        .ok_or_else(|| VmError::interop_msg("no entry context"))?
        .script_hash()
        .to_vec();
    engine.push(VmValue::ByteArray(hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BasicHost;

    fn noop(_engine: &mut ExecutionEngine<BasicHost>) -> VmResult<()> {
        Ok(())
    }

    #[test]
    fn test_first_registration_wins() {
        let mut service = InteropService::<BasicHost>::empty();
        assert!(service.register_method("Test.Noop", noop, None, 5));
        assert!(!service.register_method("Test.Noop", noop, None, 9));
        assert_eq!(service.get_price("Test.Noop"), Some(5));
        assert_eq!(service.len(), 1);
    }

    #[test]
    fn test_base_services_registered() {
        let service = InteropService::<BasicHost>::new();
        assert!(service.contains("System.ExecutionEngine.GetExecutingScriptHash"));
        assert!(service.contains("System.ExecutionEngine.GetCallingScriptHash"));
        assert!(service.contains("System.ExecutionEngine.GetEntryScriptHash"));
        assert!(service.get_method("System.Runtime.Log").is_none());
    }
}
