//! Principal registry
//!
//! Holds the fixed set of authorized principals and the current quorum
//! threshold. Membership is immutable after construction; only the quorum
//! can change, and only through the engine's self-governed proposal path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to wallet operations
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Caller not authorized: {0}")]
    NotAuthorized(String),
    #[error("Proposal not found: {0}")]
    NotFound(u64),
    #[error("Invalid destination: target must not be empty")]
    InvalidDestination,
    #[error("Proposal {0} already executed")]
    AlreadyExecuted(u64),
    #[error("Proposal {id} already confirmed by {principal}")]
    AlreadyConfirmed { id: u64, principal: String },
    #[error("Proposal {id} not confirmed by {principal}")]
    NotConfirmed { id: u64, principal: String },
    #[error("Insufficient confirmations: have {have}, need {need}")]
    InsufficientConfirmations { have: usize, need: usize },
    #[error("Invalid quorum: {requested} not in 1..={principals}")]
    InvalidQuorum { requested: usize, principals: usize },
    #[error("Principal index out of range: {index} >= {count}")]
    OutOfRange { index: usize, count: usize },
    #[error("Principal set must not be empty")]
    NoPrincipals,
    #[error("Duplicate principal: {0}")]
    DuplicatePrincipal(String),
    #[error("Principal identity must not be empty")]
    EmptyPrincipal,
    #[error("Execution of proposal {id} failed: {reason}")]
    ExecutionFailed { id: u64, reason: String },
}

/// The fixed set of principals authorized to act on the wallet,
/// plus the confirmation threshold they agreed on.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PrincipalRegistry {
    /// Authorized principal identities, in registration order
    principals: Vec<String>,
    /// Confirmations required before a proposal may execute
    quorum: usize,
}

impl PrincipalRegistry {
    /// Create a new registry
    ///
    /// # Errors
    /// Returns an error if the principal set is empty, contains a duplicate
    /// or empty identity, or if the quorum is outside `1..=principals.len()`.
    /// These invariants are checked exactly once; a failed construction
    /// cannot be repaired afterward.
    pub fn new(principals: Vec<String>, quorum: usize) -> Result<Self, WalletError> {
        if principals.is_empty() {
            return Err(WalletError::NoPrincipals);
        }

        if principals.iter().any(|p| p.is_empty()) {
            return Err(WalletError::EmptyPrincipal);
        }

        // Check for duplicates
        let mut sorted = principals.clone();
        sorted.sort();
        for i in 1..sorted.len() {
            if sorted[i] == sorted[i - 1] {
                return Err(WalletError::DuplicatePrincipal(sorted[i].clone()));
            }
        }

        if quorum == 0 || quorum > principals.len() {
            return Err(WalletError::InvalidQuorum {
                requested: quorum,
                principals: principals.len(),
            });
        }

        Ok(Self { principals, quorum })
    }

    /// Check if an identity is an authorized principal
    pub fn is_principal(&self, id: &str) -> bool {
        self.principals.iter().any(|p| p == id)
    }

    /// Get the number of registered principals
    pub fn count(&self) -> usize {
        self.principals.len()
    }

    /// Get the principal at a 0-based index (for enumeration)
    pub fn principal_at(&self, index: usize) -> Result<&str, WalletError> {
        self.principals
            .get(index)
            .map(String::as_str)
            .ok_or(WalletError::OutOfRange {
                index,
                count: self.principals.len(),
            })
    }

    /// Get all principals in registration order
    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    /// Get the current quorum threshold
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Change the quorum threshold
    ///
    /// Membership is fixed, so the valid range never changes after
    /// construction.
    pub fn set_quorum(&mut self, quorum: usize) -> Result<(), WalletError> {
        if quorum == 0 || quorum > self.principals.len() {
            return Err(WalletError::InvalidQuorum {
                requested: quorum,
                principals: self.principals.len(),
            });
        }
        self.quorum = quorum;
        Ok(())
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.quorum, self.principals.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_principals() -> Vec<String> {
        vec![
            "alice".to_string(),
            "bob".to_string(),
            "carol".to_string(),
        ]
    }

    #[test]
    fn test_registry_creation() {
        let registry = PrincipalRegistry::new(sample_principals(), 2).unwrap();

        assert_eq!(registry.count(), 3);
        assert_eq!(registry.quorum(), 2);
        assert_eq!(registry.description(), "2-of-3");
        assert!(registry.is_principal("alice"));
        assert!(!registry.is_principal("mallory"));
    }

    #[test]
    fn test_registry_validation() {
        // Empty set
        assert!(matches!(
            PrincipalRegistry::new(vec![], 1),
            Err(WalletError::NoPrincipals)
        ));

        // Empty identity
        assert!(matches!(
            PrincipalRegistry::new(vec!["alice".to_string(), "".to_string()], 1),
            Err(WalletError::EmptyPrincipal)
        ));

        // Duplicate
        assert!(matches!(
            PrincipalRegistry::new(vec!["same".to_string(), "same".to_string()], 1),
            Err(WalletError::DuplicatePrincipal(_))
        ));

        // Zero quorum
        assert!(matches!(
            PrincipalRegistry::new(sample_principals(), 0),
            Err(WalletError::InvalidQuorum { .. })
        ));

        // Quorum above principal count
        assert!(matches!(
            PrincipalRegistry::new(sample_principals(), 4),
            Err(WalletError::InvalidQuorum { .. })
        ));
    }

    #[test]
    fn test_principal_enumeration() {
        let registry = PrincipalRegistry::new(sample_principals(), 2).unwrap();

        assert_eq!(registry.principal_at(0).unwrap(), "alice");
        assert_eq!(registry.principal_at(2).unwrap(), "carol");
        assert!(matches!(
            registry.principal_at(3),
            Err(WalletError::OutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_set_quorum_bounds() {
        let mut registry = PrincipalRegistry::new(sample_principals(), 2).unwrap();

        registry.set_quorum(3).unwrap();
        assert_eq!(registry.quorum(), 3);

        assert!(matches!(
            registry.set_quorum(0),
            Err(WalletError::InvalidQuorum { .. })
        ));
        assert!(matches!(
            registry.set_quorum(4),
            Err(WalletError::InvalidQuorum { .. })
        ));

        // Failed updates leave the threshold untouched
        assert_eq!(registry.quorum(), 3);
    }
}
