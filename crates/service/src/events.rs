//! Events emitted by contracts during execution.

use neovm::ScriptHash;
use serde::{Serialize, Serializer};
use serde_json::Value;

fn hex_address<S: Serializer>(address: &ScriptHash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(address))
}

/// A `System.Runtime.Notify` payload rendered as hex JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotifyEvent {
    #[serde(serialize_with = "hex_address")]
    pub contract_address: ScriptHash,
    pub states: Value,
}

/// A `System.Runtime.Log` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEvent {
    #[serde(serialize_with = "hex_address")]
    pub contract_address: ScriptHash,
    pub message: String,
}
