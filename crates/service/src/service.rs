//! Invocation of a contract under a gas budget.
//!
//! The service owns the per-invocation loop: before each step it peeks the
//! next instruction, prices it and charges gas, then lets the engine run
//! that one instruction. Storage writes stay in an overlay that is
//! committed only when the engine halts.

use crate::error::{ServiceError, ServiceResult};
use crate::events::{LogEvent, NotifyEvent};
use crate::gas::{instruction_price, GasMeter};
use crate::host::ServiceHost;
use crate::ledger::{LedgerStore, Transaction};
use crate::storage::{CacheDb, Storage};
use crate::syscalls::build_interop_service;
use neovm::{
    ExecutionEngine, ExecutionEngineLimits, InteropService, JumpTable, VMState, VmError,
    VmFeatures, VmResult, VmValue,
};
use neovm_config::ServiceConfig;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::{debug, info, warn};

static INTEROP_SERVICE: Lazy<Arc<InteropService<ServiceHost>>> =
    Lazy::new(|| Arc::new(build_interop_service()));

static JUMP_TABLE: Lazy<Arc<JumpTable<ServiceHost>>> = Lazy::new(|| Arc::new(JumpTable::new()));

/// Outcome of one invocation.
///
/// Notifications are only kept when the invocation halted; a faulted run
/// reports its error and the gas it burned and nothing else.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub state: VMState,
    /// Top of the evaluation stack after a HALT.
    pub result: Option<VmValue>,
    pub gas_consumed: u64,
    pub notifications: Vec<NotifyEvent>,
    pub logs: Vec<LogEvent>,
    pub error: Option<VmError>,
}

impl ExecutionResult {
    pub fn is_halt(&self) -> bool {
        self.state.is_halt()
    }

    /// Stable description of the fault, if any.
    pub fn error_kind(&self) -> Option<&'static str> {
        self.error.as_ref().map(VmError::kind)
    }
}

/// Runs contract code against a ledger and a storage backend.
pub struct NeoVmService {
    config: ServiceConfig,
    ledger: Arc<dyn LedgerStore>,
    storage: Arc<dyn Storage>,
    time: u32,
    container: Option<Transaction>,
}

impl NeoVmService {
    pub fn new(
        config: ServiceConfig,
        ledger: Arc<dyn LedgerStore>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            ledger,
            storage,
            time: 0,
            container: None,
        }
    }

    /// Sets the block time reported by `System.Runtime.GetTime`.
    pub fn with_time(mut self, time: u32) -> Self {
        self.time = time;
        self
    }

    /// Sets the transaction whose signers satisfy `CheckWitness`.
    pub fn with_container(mut self, container: Transaction) -> Self {
        self.container = Some(container);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The syscall registry shared by every invocation.
    pub fn interop_service() -> Arc<InteropService<ServiceHost>> {
        INTEROP_SERVICE.clone()
    }

    /// Executes `code` as the entry script.
    ///
    /// A FAULT is reported through the returned [`ExecutionResult`]; `Err`
    /// means the invocation could not run at all or its writes could not be
    /// committed.
    pub fn invoke(&self, code: Vec<u8>) -> ServiceResult<ExecutionResult> {
        if code.is_empty() {
            return Err(ServiceError::InvalidCode("empty script".to_string()));
        }
        self.config.validate()?;

        let host = ServiceHost::new(
            CacheDb::new(self.storage.clone()),
            self.ledger.clone(),
            self.container.clone(),
            self.time,
        );
        let mut engine = ExecutionEngine::with_services(
            host,
            ExecutionEngineLimits::from(&self.config.vm),
            VmFeatures::from(&self.config.vm),
            JUMP_TABLE.clone(),
            INTEROP_SERVICE.clone(),
        );
        engine.load_script(code)?;

        let mut meter = GasMeter::new(self.config.gas_limit);
        let mut steps = 0u64;
        while !engine.state().is_terminal() {
            if self.config.pre_exec && steps >= self.config.step_limit {
                warn!(steps, "step limit exceeded");
                engine.fault(VmError::StepLimitExceeded);
                break;
            }
            if let Err(err) = charge(&engine, &mut meter) {
                if err == VmError::OutOfGas {
                    warn!(
                        limit = meter.limit(),
                        consumed = meter.consumed(),
                        "out of gas"
                    );
                }
                engine.fault(err);
                break;
            }
            steps += 1;
            engine.step_into();
        }

        let state = engine.state();
        let error = engine.fault_error().cloned();
        let result = if state.is_halt() {
            engine.evaluation_stack().iter().next().cloned()
        } else {
            None
        };
        let (mut cache, mut notifications, mut logs) = engine.into_host().into_parts();
        if state.is_halt() {
            debug!(writes = cache.pending(), "committing storage");
            cache.commit()?;
        } else {
            notifications.clear();
            logs.clear();
        }

        info!(
            state = %state,
            gas = meter.consumed(),
            steps,
            notifications = notifications.len(),
            "invocation finished"
        );
        Ok(ExecutionResult {
            state,
            result,
            gas_consumed: meter.consumed(),
            notifications,
            logs,
            error,
        })
    }
}

/// Charges the instruction the next step will run. Implicit returns are free.
fn charge(engine: &ExecutionEngine<ServiceHost>, meter: &mut GasMeter) -> VmResult<()> {
    match engine.next_instruction()? {
        Some(instruction) => meter.consume(instruction_price(engine, &instruction)?),
        None => Ok(()),
    }
}
