//! Audit events
//!
//! Structured events emitted after each committed state change, plus the
//! observer interface the engine notifies and an append-only recording log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Events emitted by the wallet, one per state-changing effect, in call order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum WalletEvent {
    /// Value was received by the wallet from outside
    Deposit { from: String, amount: u64 },
    /// A new proposal was created
    ProposalSubmitted {
        id: u64,
        target: String,
        value: u64,
        payload: Vec<u8>,
    },
    /// A principal confirmed a proposal
    ProposalConfirmed { id: u64, principal: String },
    /// A principal withdrew a confirmation
    ProposalRevoked { id: u64, principal: String },
    /// A proposal's action ran successfully
    ProposalExecuted { id: u64 },
    /// The quorum threshold changed through the governance path
    QuorumChanged { old: usize, new: usize },
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEvent::Deposit { from, amount } => {
                write!(f, "deposit of {} from {}", amount, from)
            }
            WalletEvent::ProposalSubmitted {
                id,
                target,
                value,
                payload,
            } => write!(
                f,
                "proposal {} submitted: target={} value={} payload={}",
                id,
                target,
                value,
                hex::encode(payload)
            ),
            WalletEvent::ProposalConfirmed { id, principal } => {
                write!(f, "proposal {} confirmed by {}", id, principal)
            }
            WalletEvent::ProposalRevoked { id, principal } => {
                write!(f, "proposal {} revoked by {}", id, principal)
            }
            WalletEvent::ProposalExecuted { id } => write!(f, "proposal {} executed", id),
            WalletEvent::QuorumChanged { old, new } => {
                write!(f, "quorum changed from {} to {}", old, new)
            }
        }
    }
}

/// Observer notified synchronously after each committed state change
///
/// Sinks travel with the engine across threads, hence the bounds.
pub trait EventSink: Send + Sync {
    /// Receive one committed event
    fn publish(&mut self, event: &WalletEvent);
}

/// A recorded audit entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EventRecord {
    /// Position in the audit stream, starting at 0
    pub seq: u64,
    /// When the entry was recorded
    pub at: DateTime<Utc>,
    /// The event itself
    pub event: WalletEvent,
}

/// Append-only audit log of committed events
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AuditLog {
    records: Vec<EventRecord>,
}

impl AuditLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append an event to the log
    pub fn record(&mut self, event: WalletEvent) {
        self.records.push(EventRecord {
            seq: self.records.len() as u64,
            at: Utc::now(),
            event,
        });
    }

    /// Get all recorded entries in append order
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Get the number of recorded entries
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sink that forwards committed events to the log facade
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&mut self, event: &WalletEvent) {
        log::info!("{}", event);
    }
}
