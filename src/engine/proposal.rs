//! Proposal store
//!
//! An append-only collection of authorization proposals, each carrying the
//! set of principals currently standing behind it. Sequence numbers are
//! assigned at creation and never reused.

use crate::engine::registry::WalletError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A proposed action awaiting confirmations, or already executed
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Proposal {
    /// Zero-based sequence number, assigned at submission
    pub id: u64,
    /// Opaque destination the action is addressed to
    pub target: String,
    /// Amount to transfer alongside the action
    pub value: u64,
    /// Opaque bytes interpreted by whatever is addressed by `target`
    pub payload: Vec<u8>,
    /// One-way flag: flips to true when the action has run successfully
    pub executed: bool,
    /// Number of principals currently confirming this proposal
    pub confirmation_count: usize,
    /// Principal that submitted the proposal
    pub submitted_by: String,
    /// When the proposal was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the proposal was executed, if it has been
    pub executed_at: Option<DateTime<Utc>>,
    /// Principals currently confirming. Kept in lockstep with
    /// `confirmation_count`.
    confirmed: HashSet<String>,
}

impl Proposal {
    /// Check whether a principal currently confirms this proposal
    pub fn is_confirmed_by(&self, principal: &str) -> bool {
        self.confirmed.contains(principal)
    }

    /// Get the principals currently confirming, in sorted order
    pub fn confirmed_by(&self) -> Vec<&str> {
        let mut principals: Vec<&str> = self.confirmed.iter().map(String::as_str).collect();
        principals.sort_unstable();
        principals
    }
}

/// Append-only store of proposals and their confirmation state
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProposalStore {
    proposals: Vec<Proposal>,
}

impl ProposalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            proposals: Vec::new(),
        }
    }

    /// Append a new proposal and return its sequence number
    pub fn create(
        &mut self,
        target: String,
        value: u64,
        payload: Vec<u8>,
        submitted_by: &str,
    ) -> u64 {
        let id = self.proposals.len() as u64;
        self.proposals.push(Proposal {
            id,
            target,
            value,
            payload,
            executed: false,
            confirmation_count: 0,
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now(),
            executed_at: None,
            confirmed: HashSet::new(),
        });
        id
    }

    /// Get a proposal by id
    pub fn get(&self, id: u64) -> Result<&Proposal, WalletError> {
        self.proposals
            .get(id as usize)
            .ok_or(WalletError::NotFound(id))
    }

    fn get_mut(&mut self, id: u64) -> Result<&mut Proposal, WalletError> {
        self.proposals
            .get_mut(id as usize)
            .ok_or(WalletError::NotFound(id))
    }

    /// Get the number of proposals ever created
    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Check whether a principal currently confirms a proposal
    pub fn is_confirmed(&self, id: u64, principal: &str) -> Result<bool, WalletError> {
        Ok(self.get(id)?.is_confirmed_by(principal))
    }

    /// Get the principals currently confirming a proposal, sorted
    pub fn confirmed_by(&self, id: u64) -> Result<Vec<&str>, WalletError> {
        Ok(self.get(id)?.confirmed_by())
    }

    /// Set or clear a principal's confirmation bit
    ///
    /// Adjusts `confirmation_count` by one only when the toggle actually
    /// changes the bit; detecting a redundant toggle up front is the
    /// caller's job via `is_confirmed`.
    pub fn set_confirmed(
        &mut self,
        id: u64,
        principal: &str,
        confirmed: bool,
    ) -> Result<(), WalletError> {
        let proposal = self.get_mut(id)?;
        if confirmed {
            if proposal.confirmed.insert(principal.to_string()) {
                proposal.confirmation_count += 1;
            }
        } else if proposal.confirmed.remove(principal) {
            proposal.confirmation_count -= 1;
        }
        Ok(())
    }

    /// Mark a proposal as executed
    pub fn mark_executed(&mut self, id: u64) -> Result<(), WalletError> {
        let proposal = self.get_mut(id)?;
        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        proposal.executed = true;
        proposal.executed_at = Some(Utc::now());
        Ok(())
    }

    /// Discard the newest proposal if it matches the given id
    ///
    /// Supports the engine's all-or-nothing submit: a proposal whose
    /// auto-triggered execution failed was never observable and its
    /// sequence number was never committed.
    pub(crate) fn discard(&mut self, id: u64) {
        if self.proposals.len() as u64 == id + 1 {
            self.proposals.pop();
        }
    }

    /// Iterate over all proposals in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Proposal> {
        self.proposals.iter()
    }

    /// List proposals that have not executed yet
    pub fn pending(&self) -> Vec<&Proposal> {
        self.proposals.iter().filter(|p| !p.executed).collect()
    }

    /// Count proposals that have executed
    pub fn executed_count(&self) -> usize {
        self.proposals.iter().filter(|p| p.executed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_one() -> (ProposalStore, u64) {
        let mut store = ProposalStore::new();
        let id = store.create("recipient".to_string(), 50, vec![1, 2, 3], "alice");
        (store, id)
    }

    #[test]
    fn test_create_assigns_sequence_numbers() {
        let mut store = ProposalStore::new();

        assert_eq!(store.create("a".to_string(), 1, vec![], "alice"), 0);
        assert_eq!(store.create("b".to_string(), 2, vec![], "bob"), 1);
        assert_eq!(store.len(), 2);

        let first = store.get(0).unwrap();
        assert_eq!(first.target, "a");
        assert_eq!(first.confirmation_count, 0);
        assert!(!first.executed);
        assert_eq!(first.submitted_by, "alice");
    }

    #[test]
    fn test_get_not_found() {
        let (store, _) = store_with_one();
        assert!(matches!(store.get(1), Err(WalletError::NotFound(1))));
    }

    #[test]
    fn test_get_is_idempotent() {
        let (store, id) = store_with_one();
        assert_eq!(store.get(id).unwrap(), store.get(id).unwrap());
    }

    #[test]
    fn test_confirmation_count_tracks_bits() {
        let (mut store, id) = store_with_one();

        store.set_confirmed(id, "alice", true).unwrap();
        store.set_confirmed(id, "bob", true).unwrap();
        assert_eq!(store.get(id).unwrap().confirmation_count, 2);
        assert_eq!(store.confirmed_by(id).unwrap(), vec!["alice", "bob"]);

        // Redundant set does not change the count
        store.set_confirmed(id, "alice", true).unwrap();
        assert_eq!(store.get(id).unwrap().confirmation_count, 2);

        store.set_confirmed(id, "alice", false).unwrap();
        assert_eq!(store.get(id).unwrap().confirmation_count, 1);
        assert!(!store.is_confirmed(id, "alice").unwrap());

        // Redundant clear does not change the count
        store.set_confirmed(id, "alice", false).unwrap();
        assert_eq!(store.get(id).unwrap().confirmation_count, 1);
    }

    #[test]
    fn test_mark_executed_one_way() {
        let (mut store, id) = store_with_one();

        store.mark_executed(id).unwrap();
        let proposal = store.get(id).unwrap();
        assert!(proposal.executed);
        assert!(proposal.executed_at.is_some());

        assert!(matches!(
            store.mark_executed(id),
            Err(WalletError::AlreadyExecuted(_))
        ));
    }

    #[test]
    fn test_discard_only_removes_newest() {
        let mut store = ProposalStore::new();
        store.create("a".to_string(), 1, vec![], "alice");
        let id = store.create("b".to_string(), 2, vec![], "alice");

        // Discarding an older id is a no-op
        store.discard(0);
        assert_eq!(store.len(), 2);

        store.discard(id);
        assert_eq!(store.len(), 1);
        assert!(matches!(store.get(id), Err(WalletError::NotFound(_))));
    }

    #[test]
    fn test_pending_listing() {
        let mut store = ProposalStore::new();
        store.create("a".to_string(), 1, vec![], "alice");
        let id = store.create("b".to_string(), 2, vec![], "alice");
        store.mark_executed(id).unwrap();

        let pending = store.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, 0);
        assert_eq!(store.executed_count(), 1);
    }
}
