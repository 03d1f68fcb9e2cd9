//! Multi-party transaction authorization engine
//!
//! A fixed set of principals jointly authorize and execute actions once a
//! quorum of confirmations is reached, with revocable consent and
//! self-governed quorum changes.
//!
//! # Example
//!
//! ```ignore
//! use quorum_wallet::engine::{QuorumEngine, TransferLedger};
//!
//! // Create a 2-of-3 wallet
//! let mut engine = QuorumEngine::new(vec![p1, p2, p3], 2)?;
//! let mut ledger = TransferLedger::new();
//!
//! // Fund it, then propose a transfer
//! engine.deposit("funder", 100);
//! let id = engine.submit(&p1, "recipient", 40, vec![], &mut ledger)?;
//!
//! // The second confirmation reaches the quorum and executes the action
//! engine.confirm(&p2, id, &mut ledger)?;
//! assert!(engine.proposal(id)?.executed);
//! ```

pub mod events;
pub mod invoker;
pub mod proposal;
pub mod quorum;
pub mod registry;

pub use events::{AuditLog, EventRecord, EventSink, LogSink, WalletEvent};
pub use invoker::{ActionInvoker, InvocationReceipt, InvokeError, TransferLedger};
pub use proposal::{Proposal, ProposalStore};
pub use quorum::{GovernanceAction, QuorumEngine, SELF_TARGET};
pub use registry::{PrincipalRegistry, WalletError};
