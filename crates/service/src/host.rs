//! The execution host backing syscalls with ledger and storage state.

use crate::events::{LogEvent, NotifyEvent};
use crate::ledger::{LedgerStore, Transaction};
use crate::storage::CacheDb;
use neovm::{CodeTable, Crypto, DefaultCrypto, ExecutionHost, ScriptHash, VmResult};
use std::sync::Arc;

/// Per-invocation host state.
///
/// Storage writes go to the [`CacheDb`] overlay; notifications and logs
/// accumulate until the invocation finishes.
pub struct ServiceHost {
    cache: CacheDb,
    ledger: Arc<dyn LedgerStore>,
    container: Option<Transaction>,
    time: u32,
    crypto: DefaultCrypto,
    notifications: Vec<NotifyEvent>,
    logs: Vec<LogEvent>,
}

impl ServiceHost {
    pub fn new(
        cache: CacheDb,
        ledger: Arc<dyn LedgerStore>,
        container: Option<Transaction>,
        time: u32,
    ) -> Self {
        Self {
            cache,
            ledger,
            container,
            time,
            crypto: DefaultCrypto,
            notifications: Vec::new(),
            logs: Vec::new(),
        }
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut CacheDb {
        &mut self.cache
    }

    pub fn ledger(&self) -> &dyn LedgerStore {
        self.ledger.as_ref()
    }

    /// The transaction being executed, if any.
    pub fn container(&self) -> Option<&Transaction> {
        self.container.as_ref()
    }

    /// Block time the invocation runs at.
    pub fn time(&self) -> u32 {
        self.time
    }

    pub fn notifications(&self) -> &[NotifyEvent] {
        &self.notifications
    }

    pub fn logs(&self) -> &[LogEvent] {
        &self.logs
    }

    pub fn notify(&mut self, event: NotifyEvent) {
        self.notifications.push(event);
    }

    pub fn log(&mut self, event: LogEvent) {
        self.logs.push(event);
    }

    /// Splits the host into its overlay and collected events.
    pub fn into_parts(self) -> (CacheDb, Vec<NotifyEvent>, Vec<LogEvent>) {
        (self.cache, self.notifications, self.logs)
    }
}

impl CodeTable for ServiceHost {
    fn get_code(&self, script_hash: &ScriptHash) -> VmResult<Option<Vec<u8>>> {
        Ok(self
            .cache
            .get_contract(script_hash)?
            .map(|contract| contract.code))
    }
}

impl ExecutionHost for ServiceHost {
    fn code_table(&self) -> &dyn CodeTable {
        self
    }

    fn crypto(&self) -> &dyn Crypto {
        &self.crypto
    }

    fn script_container_message(&self) -> Option<Vec<u8>> {
        self.container.as_ref().map(Transaction::signing_message)
    }
}
