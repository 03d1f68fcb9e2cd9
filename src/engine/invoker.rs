//! Action invoker boundary
//!
//! The engine hands executed proposals to an [`ActionInvoker`] and only ever
//! observes success or failure; what the action does lives outside the core.
//! [`TransferLedger`] is the in-repo reference implementation used by the
//! CLI and the API server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Failure reported by an action invoker
#[derive(Error, Debug)]
#[error("{0}")]
pub struct InvokeError(pub String);

/// Performs the side-effecting operation named by an executed proposal
///
/// Exactly two outcomes: success or failure. The engine never inspects
/// anything beyond that.
pub trait ActionInvoker {
    /// Run the action addressed to `target`, carrying `value` and `payload`
    fn invoke(&mut self, target: &str, value: u64, payload: &[u8]) -> Result<(), InvokeError>;
}

/// One delivered invocation
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InvocationReceipt {
    pub target: String,
    pub value: u64,
    pub payload: Vec<u8>,
    pub at: DateTime<Utc>,
}

/// Reference invoker crediting transferred value to an account book
///
/// Targets can be marked as rejecting, which makes every invocation against
/// them fail without side effects; this is how operators and tests exercise
/// the engine's rollback path.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransferLedger {
    /// Credited balances by target
    accounts: HashMap<String, u64>,
    /// Every delivered invocation, in order
    receipts: Vec<InvocationReceipt>,
    /// Targets configured to reject invocations
    rejected: HashSet<String>,
}

impl TransferLedger {
    /// Create a new empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the credited balance of a target
    pub fn balance_of(&self, target: &str) -> u64 {
        *self.accounts.get(target).unwrap_or(&0)
    }

    /// Get all delivered invocations in order
    pub fn receipts(&self) -> &[InvocationReceipt] {
        &self.receipts
    }

    /// Mark a target as rejecting all invocations
    pub fn reject_target(&mut self, target: &str) {
        self.rejected.insert(target.to_string());
    }

    /// Clear a target's rejecting mark
    pub fn allow_target(&mut self, target: &str) {
        self.rejected.remove(target);
    }
}

impl ActionInvoker for TransferLedger {
    fn invoke(&mut self, target: &str, value: u64, payload: &[u8]) -> Result<(), InvokeError> {
        if self.rejected.contains(target) {
            return Err(InvokeError(format!("target {} rejected the call", target)));
        }

        *self.accounts.entry(target.to_string()).or_insert(0) += value;
        self.receipts.push(InvocationReceipt {
            target: target.to_string(),
            value,
            payload: payload.to_vec(),
            at: Utc::now(),
        });

        log::debug!(
            "Invoked {} with value {} and {} payload bytes",
            target,
            value,
            payload.len()
        );
        Ok(())
    }
}
