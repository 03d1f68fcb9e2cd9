//! Quorum engine
//!
//! Orchestrates the proposal state machine: submit, confirm, revoke,
//! execute, and the self-governed quorum change. Owns the principal
//! registry, the proposal store, and the held balance; hands executed
//! actions to an [`ActionInvoker`] and notifies event sinks after each
//! committed state change.

use crate::engine::events::{AuditLog, EventRecord, EventSink, WalletEvent};
use crate::engine::invoker::ActionInvoker;
use crate::engine::proposal::{Proposal, ProposalStore};
use crate::engine::registry::{PrincipalRegistry, WalletError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination designating the wallet itself
///
/// A proposal addressed here is interpreted by the engine's own governance
/// path during execution instead of being handed to the action invoker.
pub const SELF_TARGET: &str = "self";

/// Self-governed actions the wallet can apply to itself
///
/// Carried as the serde_json-encoded payload of a proposal addressed to
/// [`SELF_TARGET`].
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum GovernanceAction {
    /// Change the quorum threshold
    SetQuorum { new_quorum: usize },
}

/// Multi-party transaction authorization engine
///
/// All mutating operations take `&mut self` and run to a definite outcome
/// before returning; a failed operation leaves no trace of its writes.
#[derive(Serialize, Deserialize)]
pub struct QuorumEngine {
    registry: PrincipalRegistry,
    store: ProposalStore,
    balance: u64,
    audit: AuditLog,
    #[serde(skip)]
    sinks: Vec<Box<dyn EventSink>>,
}

impl QuorumEngine {
    /// Create a new engine
    ///
    /// # Errors
    /// Fails if the principal set or quorum violates the registry's
    /// construction invariants; a failed construction yields no engine.
    pub fn new(principals: Vec<String>, quorum: usize) -> Result<Self, WalletError> {
        let registry = PrincipalRegistry::new(principals, quorum)?;
        log::info!("Wallet created: {}", registry.description());

        Ok(Self {
            registry,
            store: ProposalStore::new(),
            balance: 0,
            audit: AuditLog::new(),
            sinks: Vec::new(),
        })
    }

    /// Attach an observer notified synchronously after each committed change
    pub fn attach_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    // =========================================================================
    // Mutating operations
    // =========================================================================

    /// Receive value from outside
    ///
    /// Anyone may fund the wallet; no principal check applies.
    pub fn deposit(&mut self, from: &str, amount: u64) {
        self.balance += amount;
        if amount > 0 {
            self.commit(vec![WalletEvent::Deposit {
                from: from.to_string(),
                amount,
            }]);
        }
    }

    /// Submit a new proposal, auto-confirming it for the submitter
    ///
    /// A freshly submitted proposal always starts with exactly one
    /// confirmation, so with a quorum of one this continues straight into
    /// execution. Returns the new proposal id.
    pub fn submit(
        &mut self,
        caller: &str,
        target: &str,
        value: u64,
        payload: Vec<u8>,
        invoker: &mut dyn ActionInvoker,
    ) -> Result<u64, WalletError> {
        self.require_principal(caller)?;
        if target.is_empty() {
            return Err(WalletError::InvalidDestination);
        }

        let id = self
            .store
            .create(target.to_string(), value, payload.clone(), caller);
        let mut pending = vec![WalletEvent::ProposalSubmitted {
            id,
            target: target.to_string(),
            value,
            payload,
        }];

        match self.confirm_inner(caller, id, invoker, &mut pending) {
            Ok(()) => {
                self.commit(pending);
                log::info!("Proposal {} submitted by {}", id, caller);
                Ok(id)
            }
            Err(e) => {
                // The whole submit is one operation; a failed auto-triggered
                // execution discards the creation as well.
                self.store.discard(id);
                Err(e)
            }
        }
    }

    /// Submit a self-governed quorum change proposal
    ///
    /// Convenience wrapper building the self-referential proposal; the new
    /// threshold is validated when the proposal executes.
    pub fn submit_quorum_change(
        &mut self,
        caller: &str,
        new_quorum: usize,
        invoker: &mut dyn ActionInvoker,
    ) -> Result<u64, WalletError> {
        let payload = serde_json::to_vec(&GovernanceAction::SetQuorum { new_quorum })
            .expect("governance action serializes");
        self.submit(caller, SELF_TARGET, 0, payload, invoker)
    }

    /// Confirm a proposal
    ///
    /// If the caller's confirmation reaches the quorum, this atomically
    /// continues into the execute path for the same proposal within the
    /// same logical operation.
    pub fn confirm(
        &mut self,
        caller: &str,
        id: u64,
        invoker: &mut dyn ActionInvoker,
    ) -> Result<(), WalletError> {
        self.require_principal(caller)?;

        let mut pending = Vec::new();
        self.confirm_inner(caller, id, invoker, &mut pending)?;
        self.commit(pending);
        Ok(())
    }

    /// Withdraw a confirmation from a non-terminal proposal
    pub fn revoke(&mut self, caller: &str, id: u64) -> Result<(), WalletError> {
        self.require_principal(caller)?;

        let proposal = self.store.get(id)?;
        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        if !proposal.is_confirmed_by(caller) {
            return Err(WalletError::NotConfirmed {
                id,
                principal: caller.to_string(),
            });
        }

        self.store.set_confirmed(id, caller, false)?;
        self.commit(vec![WalletEvent::ProposalRevoked {
            id,
            principal: caller.to_string(),
        }]);
        Ok(())
    }

    /// Execute a proposal that has reached the quorum
    ///
    /// A failed action leaves the proposal pending with its confirmations
    /// intact; the call may be retried once the external condition is fixed.
    pub fn execute(
        &mut self,
        caller: &str,
        id: u64,
        invoker: &mut dyn ActionInvoker,
    ) -> Result<(), WalletError> {
        self.require_principal(caller)?;

        let proposal = self.store.get(id)?;
        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        let have = proposal.confirmation_count;
        let need = self.registry.quorum();
        if have < need {
            return Err(WalletError::InsufficientConfirmations { have, need });
        }

        let mut pending = Vec::new();
        self.run_execution(id, invoker, &mut pending)?;
        self.commit(pending);
        Ok(())
    }

    /// Change the quorum directly; always rejected
    ///
    /// The threshold is self-governed: the only reachable path is a
    /// proposal addressed to [`SELF_TARGET`] passing through the engine's
    /// own execute step. Direct invocation fails regardless of caller.
    pub fn reconfigure(&mut self, caller: &str, _new_quorum: usize) -> Result<(), WalletError> {
        Err(WalletError::NotAuthorized(caller.to_string()))
    }

    // =========================================================================
    // Query surface
    // =========================================================================

    /// Get the held balance
    pub fn balance(&self) -> u64 {
        self.balance
    }

    /// Get the current quorum threshold
    pub fn quorum(&self) -> usize {
        self.registry.quorum()
    }

    /// Get the number of registered principals
    pub fn principal_count(&self) -> usize {
        self.registry.count()
    }

    /// Get all principals in registration order
    pub fn principals(&self) -> &[String] {
        self.registry.principals()
    }

    /// Get the principal at a 0-based index
    pub fn principal_at(&self, index: usize) -> Result<&str, WalletError> {
        self.registry.principal_at(index)
    }

    /// Check if an identity is an authorized principal
    pub fn is_principal(&self, id: &str) -> bool {
        self.registry.is_principal(id)
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        self.registry.description()
    }

    /// Get the number of proposals ever created
    pub fn proposal_count(&self) -> usize {
        self.store.len()
    }

    /// Get a proposal by id
    pub fn proposal(&self, id: u64) -> Result<&Proposal, WalletError> {
        self.store.get(id)
    }

    /// Iterate over all proposals in creation order
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.store.iter()
    }

    /// List proposals that have not executed yet
    pub fn pending_proposals(&self) -> Vec<&Proposal> {
        self.store.pending()
    }

    /// Count proposals that have executed
    pub fn executed_count(&self) -> usize {
        self.store.executed_count()
    }

    /// Check whether a principal currently confirms a proposal
    pub fn is_confirmed(&self, id: u64, principal: &str) -> Result<bool, WalletError> {
        self.store.is_confirmed(id, principal)
    }

    /// Get the principals currently confirming a proposal, sorted
    pub fn confirmed_by(&self, id: u64) -> Result<Vec<&str>, WalletError> {
        self.store.confirmed_by(id)
    }

    /// Get the recorded audit stream in append order
    pub fn events(&self) -> &[EventRecord] {
        self.audit.records()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require_principal(&self, caller: &str) -> Result<(), WalletError> {
        if self.registry.is_principal(caller) {
            Ok(())
        } else {
            Err(WalletError::NotAuthorized(caller.to_string()))
        }
    }

    /// Record the caller's confirmation and auto-execute on reaching quorum
    ///
    /// On a failed execution the triggering confirmation bit is rolled
    /// back, leaving the proposal exactly as before the call. Events are
    /// appended to `pending` and only reach the log if the caller commits.
    fn confirm_inner(
        &mut self,
        caller: &str,
        id: u64,
        invoker: &mut dyn ActionInvoker,
        pending: &mut Vec<WalletEvent>,
    ) -> Result<(), WalletError> {
        let proposal = self.store.get(id)?;
        if proposal.executed {
            return Err(WalletError::AlreadyExecuted(id));
        }
        if proposal.is_confirmed_by(caller) {
            return Err(WalletError::AlreadyConfirmed {
                id,
                principal: caller.to_string(),
            });
        }

        self.store.set_confirmed(id, caller, true)?;
        pending.push(WalletEvent::ProposalConfirmed {
            id,
            principal: caller.to_string(),
        });

        if self.store.get(id)?.confirmation_count >= self.registry.quorum() {
            if let Err(e) = self.run_execution(id, invoker, pending) {
                let _ = self.store.set_confirmed(id, caller, false);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Run a quorum-satisfying proposal's action and mark it executed
    ///
    /// The persistent writes (balance debit, executed flag) happen only
    /// after the action succeeds, so a failure here leaves the proposal
    /// untouched.
    fn run_execution(
        &mut self,
        id: u64,
        invoker: &mut dyn ActionInvoker,
        pending: &mut Vec<WalletEvent>,
    ) -> Result<(), WalletError> {
        let (target, value, payload) = {
            let proposal = self.store.get(id)?;
            (
                proposal.target.clone(),
                proposal.value,
                proposal.payload.clone(),
            )
        };

        if target == SELF_TARGET {
            self.apply_governance(id, &payload, pending)?;
        } else {
            if value > self.balance {
                return Err(WalletError::ExecutionFailed {
                    id,
                    reason: format!("insufficient funds: have {}, need {}", self.balance, value),
                });
            }
            invoker
                .invoke(&target, value, &payload)
                .map_err(|e| WalletError::ExecutionFailed {
                    id,
                    reason: e.to_string(),
                })?;
            self.balance -= value;
        }

        self.store.mark_executed(id)?;
        pending.push(WalletEvent::ProposalExecuted { id });
        log::info!("Proposal {} executed", id);
        Ok(())
    }

    /// Internal entry point for self-governed actions
    ///
    /// Reachable only from the execute step; this is what makes the
    /// governance path "the engine acting on its own authority".
    fn apply_governance(
        &mut self,
        id: u64,
        payload: &[u8],
        pending: &mut Vec<WalletEvent>,
    ) -> Result<(), WalletError> {
        let action: GovernanceAction =
            serde_json::from_slice(payload).map_err(|e| WalletError::ExecutionFailed {
                id,
                reason: format!("malformed governance payload: {}", e),
            })?;

        match action {
            GovernanceAction::SetQuorum { new_quorum } => {
                let old = self.registry.quorum();
                self.registry.set_quorum(new_quorum)?;
                pending.push(WalletEvent::QuorumChanged {
                    old,
                    new: new_quorum,
                });
                log::info!("Quorum changed from {} to {}", old, new_quorum);
            }
        }
        Ok(())
    }

    /// Flush a committed operation's events to the sinks and the audit log
    fn commit(&mut self, events: Vec<WalletEvent>) {
        for event in events {
            for sink in &mut self.sinks {
                sink.publish(&event);
            }
            self.audit.record(event);
        }
    }
}

impl fmt::Debug for QuorumEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuorumEngine")
            .field("registry", &self.registry)
            .field("store", &self.store)
            .field("balance", &self.balance)
            .field("audit", &self.audit)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::invoker::TransferLedger;

    const P1: &str = "alice";
    const P2: &str = "bob";

    fn two_of_two() -> (QuorumEngine, TransferLedger) {
        let engine = QuorumEngine::new(vec![P1.to_string(), P2.to_string()], 2).unwrap();
        (engine, TransferLedger::new())
    }

    fn event_kinds(engine: &QuorumEngine) -> Vec<&'static str> {
        engine
            .events()
            .iter()
            .map(|r| match r.event {
                WalletEvent::Deposit { .. } => "Deposit",
                WalletEvent::ProposalSubmitted { .. } => "Submitted",
                WalletEvent::ProposalConfirmed { .. } => "Confirmed",
                WalletEvent::ProposalRevoked { .. } => "Revoked",
                WalletEvent::ProposalExecuted { .. } => "Executed",
                WalletEvent::QuorumChanged { .. } => "QuorumChanged",
            })
            .collect()
    }

    #[test]
    fn test_submit_auto_confirms_submitter() {
        let (mut engine, mut ledger) = two_of_two();

        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();

        assert_eq!(id, 0);
        let proposal = engine.proposal(0).unwrap();
        assert_eq!(proposal.confirmation_count, 1);
        assert!(!proposal.executed);
        assert!(engine.is_confirmed(0, P1).unwrap());
        assert!(!engine.is_confirmed(0, P2).unwrap());
        assert_eq!(event_kinds(&engine), vec!["Submitted", "Confirmed"]);
    }

    #[test]
    fn test_submit_rejects_outsiders_and_empty_target() {
        let (mut engine, mut ledger) = two_of_two();

        assert!(matches!(
            engine.submit("mallory", "recipient", 1, vec![], &mut ledger),
            Err(WalletError::NotAuthorized(_))
        ));
        assert!(matches!(
            engine.submit(P1, "", 1, vec![], &mut ledger),
            Err(WalletError::InvalidDestination)
        ));
        assert_eq!(engine.proposal_count(), 0);
    }

    #[test]
    fn test_second_confirmation_auto_executes() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);

        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();
        engine.confirm(P2, id, &mut ledger).unwrap();

        let proposal = engine.proposal(id).unwrap();
        assert!(proposal.executed);
        assert_eq!(proposal.confirmation_count, 2);
        assert_eq!(engine.balance(), 9);
        assert_eq!(ledger.balance_of("recipient"), 1);
        assert_eq!(ledger.receipts().len(), 1);
        assert_eq!(
            event_kinds(&engine),
            vec!["Deposit", "Submitted", "Confirmed", "Confirmed", "Executed"]
        );
    }

    #[test]
    fn test_confirm_errors() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();

        assert!(matches!(
            engine.confirm("mallory", id, &mut ledger),
            Err(WalletError::NotAuthorized(_))
        ));
        assert!(matches!(
            engine.confirm(P1, id, &mut ledger),
            Err(WalletError::AlreadyConfirmed { .. })
        ));
        assert!(matches!(
            engine.confirm(P2, 9, &mut ledger),
            Err(WalletError::NotFound(9))
        ));

        engine.confirm(P2, id, &mut ledger).unwrap();
        assert!(matches!(
            engine.confirm(P2, id, &mut ledger),
            Err(WalletError::AlreadyExecuted(_))
        ));
    }

    #[test]
    fn test_revoke_clears_confirmation() {
        let (mut engine, mut ledger) = two_of_two();

        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();
        engine.revoke(P1, id).unwrap();

        assert_eq!(engine.proposal(id).unwrap().confirmation_count, 0);
        assert!(!engine.is_confirmed(id, P1).unwrap());

        // A later single confirmation does not reach the quorum of two
        engine.confirm(P2, id, &mut ledger).unwrap();
        let proposal = engine.proposal(id).unwrap();
        assert_eq!(proposal.confirmation_count, 1);
        assert!(!proposal.executed);
    }

    #[test]
    fn test_revoke_errors() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();

        assert!(matches!(
            engine.revoke(P2, id),
            Err(WalletError::NotConfirmed { .. })
        ));
        assert!(matches!(
            engine.revoke("mallory", id),
            Err(WalletError::NotAuthorized(_))
        ));

        engine.confirm(P2, id, &mut ledger).unwrap();
        assert!(matches!(
            engine.revoke(P1, id),
            Err(WalletError::AlreadyExecuted(_))
        ));
    }

    #[test]
    fn test_explicit_execute_below_quorum() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();

        assert!(matches!(
            engine.execute(P1, id, &mut ledger),
            Err(WalletError::InsufficientConfirmations { have: 1, need: 2 })
        ));
        assert!(!engine.proposal(id).unwrap().executed);
        assert_eq!(engine.balance(), 10);
    }

    #[test]
    fn test_failed_execution_rolls_back_confirm() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);
        ledger.reject_target("recipient");

        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();
        let before = engine.proposal(id).unwrap().clone();
        let events_before = engine.events().len();

        let result = engine.confirm(P2, id, &mut ledger);
        assert!(matches!(result, Err(WalletError::ExecutionFailed { .. })));

        // Byte-for-byte identical to the pre-call state
        assert_eq!(engine.proposal(id).unwrap(), &before);
        assert!(!engine.is_confirmed(id, P2).unwrap());
        assert_eq!(engine.balance(), 10);
        assert_eq!(engine.events().len(), events_before);
        assert!(ledger.receipts().is_empty());

        // Retryable once the external condition is fixed
        ledger.allow_target("recipient");
        engine.confirm(P2, id, &mut ledger).unwrap();
        assert!(engine.proposal(id).unwrap().executed);
        assert_eq!(ledger.balance_of("recipient"), 1);
    }

    #[test]
    fn test_failed_auto_execute_discards_submit() {
        let mut engine = QuorumEngine::new(vec![P1.to_string()], 1).unwrap();
        let mut ledger = TransferLedger::new();
        engine.deposit("funder", 10);
        ledger.reject_target("recipient");

        // Quorum of one: the submitter's auto-confirmation triggers
        // execution immediately, so the whole submit rolls back.
        let result = engine.submit(P1, "recipient", 1, vec![], &mut ledger);
        assert!(matches!(result, Err(WalletError::ExecutionFailed { .. })));
        assert_eq!(engine.proposal_count(), 0);
        assert_eq!(engine.events().len(), 1); // only the deposit

        ledger.allow_target("recipient");
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();
        assert_eq!(id, 0);
        assert!(engine.proposal(id).unwrap().executed);
    }

    #[test]
    fn test_underfunded_execution_fails_and_is_retryable() {
        let (mut engine, mut ledger) = two_of_two();
        let id = engine.submit(P1, "recipient", 5, vec![], &mut ledger).unwrap();

        let result = engine.confirm(P2, id, &mut ledger);
        assert!(matches!(result, Err(WalletError::ExecutionFailed { .. })));
        assert_eq!(engine.proposal(id).unwrap().confirmation_count, 1);

        // Fund the wallet, then confirm again
        engine.deposit("funder", 5);
        engine.confirm(P2, id, &mut ledger).unwrap();
        assert!(engine.proposal(id).unwrap().executed);
        assert_eq!(engine.balance(), 0);
    }

    #[test]
    fn test_direct_reconfigure_is_rejected() {
        let (mut engine, _) = two_of_two();

        assert!(matches!(
            engine.reconfigure(P1, 1),
            Err(WalletError::NotAuthorized(_))
        ));
        assert!(matches!(
            engine.reconfigure("mallory", 1),
            Err(WalletError::NotAuthorized(_))
        ));
        assert_eq!(engine.quorum(), 2);
    }

    #[test]
    fn test_quorum_change_via_proposal() {
        let (mut engine, mut ledger) = two_of_two();

        let id = engine.submit_quorum_change(P1, 1, &mut ledger).unwrap();
        assert_eq!(engine.quorum(), 2);

        engine.confirm(P2, id, &mut ledger).unwrap();
        assert_eq!(engine.quorum(), 1);
        assert!(engine.proposal(id).unwrap().executed);

        // The governance event precedes the execution event
        let kinds = event_kinds(&engine);
        let changed = kinds.iter().position(|k| *k == "QuorumChanged").unwrap();
        let executed = kinds.iter().position(|k| *k == "Executed").unwrap();
        assert!(changed < executed);

        // With quorum 1, a fresh submit executes immediately
        engine.deposit("funder", 3);
        let id = engine.submit(P1, "recipient", 3, vec![], &mut ledger).unwrap();
        assert!(engine.proposal(id).unwrap().executed);

        // The governance path never touched the action invoker
        assert_eq!(ledger.receipts().len(), 1);
    }

    #[test]
    fn test_invalid_quorum_change_rolls_back() {
        let (mut engine, mut ledger) = two_of_two();

        let id = engine.submit_quorum_change(P1, 3, &mut ledger).unwrap();
        let result = engine.confirm(P2, id, &mut ledger);

        assert!(matches!(result, Err(WalletError::InvalidQuorum { .. })));
        assert_eq!(engine.quorum(), 2);
        let proposal = engine.proposal(id).unwrap();
        assert!(!proposal.executed);
        assert_eq!(proposal.confirmation_count, 1);
        assert!(!engine.is_confirmed(id, P2).unwrap());
    }

    #[test]
    fn test_malformed_governance_payload_fails_execution() {
        let (mut engine, mut ledger) = two_of_two();

        let id = engine
            .submit(P1, SELF_TARGET, 0, b"not json".to_vec(), &mut ledger)
            .unwrap();
        let result = engine.confirm(P2, id, &mut ledger);

        assert!(matches!(result, Err(WalletError::ExecutionFailed { .. })));
        assert!(!engine.proposal(id).unwrap().executed);
    }

    #[test]
    fn test_deposit_events() {
        let (mut engine, _) = two_of_two();

        engine.deposit("funder", 25);
        engine.deposit("funder", 0);

        assert_eq!(engine.balance(), 25);
        // Zero-value receipts are not logged
        assert_eq!(engine.events().len(), 1);
        assert!(matches!(
            engine.events()[0].event,
            WalletEvent::Deposit { amount: 25, .. }
        ));
    }

    #[test]
    fn test_confirmation_count_matches_matrix() {
        let (mut engine, mut ledger) = two_of_two();
        engine.deposit("funder", 10);
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();

        let check = |engine: &QuorumEngine| {
            let proposal = engine.proposal(id).unwrap();
            assert_eq!(proposal.confirmation_count, proposal.confirmed_by().len());
        };

        check(&engine);
        engine.revoke(P1, id).unwrap();
        check(&engine);
        engine.confirm(P1, id, &mut ledger).unwrap();
        check(&engine);
        engine.confirm(P2, id, &mut ledger).unwrap();
        check(&engine);
    }

    #[test]
    fn test_sink_sees_committed_events_only() {
        use std::sync::{Arc, Mutex};

        struct Recording(Arc<Mutex<Vec<WalletEvent>>>);
        impl EventSink for Recording {
            fn publish(&mut self, event: &WalletEvent) {
                self.0.lock().unwrap().push(event.clone());
            }
        }

        let (mut engine, mut ledger) = two_of_two();
        let seen = Arc::new(Mutex::new(Vec::new()));
        engine.attach_sink(Box::new(Recording(seen.clone())));

        engine.deposit("funder", 10);
        ledger.reject_target("recipient");
        let id = engine.submit(P1, "recipient", 1, vec![], &mut ledger).unwrap();
        let _ = engine.confirm(P2, id, &mut ledger);

        // The failed confirm published nothing
        assert_eq!(seen.lock().unwrap().len(), engine.events().len());
        assert_eq!(seen.lock().unwrap().len(), 3);
    }
}
