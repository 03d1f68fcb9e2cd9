//! Quorum-Wallet: a multi-signature wallet core in Rust
//!
//! This crate provides a multi-party transaction authorization engine:
//! - Fixed principal registry with an adjustable quorum threshold
//! - Append-only proposal store with a per-principal confirmation matrix
//! - Submit / confirm / revoke / execute state machine with atomic
//!   quorum-triggered execution and all-or-nothing rollback
//! - Self-governed quorum changes routed through the proposal mechanism
//! - Opaque action-invoker boundary for fund transfers and contract calls
//! - Append-only audit event stream with pluggable sinks
//! - JSON persistence with rotating backups
//! - REST API and WebSocket event broadcasting
//!
//! # Example
//!
//! ```rust
//! use quorum_wallet::engine::{QuorumEngine, TransferLedger};
//!
//! // Create a 2-of-3 wallet
//! let principals = vec!["p1".to_string(), "p2".to_string(), "p3".to_string()];
//! let mut engine = QuorumEngine::new(principals, 2).unwrap();
//! let mut ledger = TransferLedger::new();
//!
//! // Fund it, then propose a transfer
//! engine.deposit("funder", 100);
//! let id = engine.submit("p1", "recipient", 40, vec![], &mut ledger).unwrap();
//!
//! // The second confirmation reaches the quorum and executes the action
//! engine.confirm("p2", id, &mut ledger).unwrap();
//! assert!(engine.proposal(id).unwrap().executed);
//! assert_eq!(ledger.balance_of("recipient"), 40);
//! ```

pub mod api;
pub mod cli;
pub mod engine;
pub mod storage;

// Re-export commonly used types
pub use api::{create_router, ApiState};
pub use engine::{
    ActionInvoker, AuditLog, EventRecord, EventSink, GovernanceAction, InvokeError, Proposal,
    ProposalStore, PrincipalRegistry, QuorumEngine, TransferLedger, WalletError, WalletEvent,
    SELF_TARGET,
};
pub use storage::{Storage, StorageConfig, WalletSnapshot};
