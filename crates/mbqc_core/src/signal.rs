//! Outcome signals
//!
//! Gantree: L1_Frame → Signal
//!
//! A [`Domain`] is a set of measured nodes standing for the XOR of their
//! outcomes. A [`Signal`] adds a constant bit, which appears once Pauli
//! outcomes have been fixed ahead of time.

use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::btree_set;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{BitXor, BitXorAssign};

// ============================================================================
// Domain
// ============================================================================

/// XOR-sum of measurement outcomes
/// Gantree: Domain // GF(2) 합
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(BTreeSet<NodeId>);

impl Domain {
    /// Empty domain
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-node domain
    pub fn single(node: NodeId) -> Self {
        Self(BTreeSet::from([node]))
    }

    /// Toggle membership of `node`
    pub fn toggle(&mut self, node: NodeId) {
        if !self.0.remove(&node) {
            self.0.insert(node);
        }
    }

    /// Membership
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// Remove `node` if present, returning whether it was present
    pub fn remove(&mut self, node: NodeId) -> bool {
        self.0.remove(&node)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the domain is trivially zero
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate nodes in ascending order
    pub fn iter(&self) -> btree_set::Iter<'_, NodeId> {
        self.0.iter()
    }

    /// Underlying node set
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.0
    }

    /// Evaluate against recorded outcomes (missing nodes count as 0)
    pub fn parity(&self, outcomes: &BTreeMap<NodeId, u8>) -> bool {
        self.0
            .iter()
            .filter(|n| outcomes.get(n).copied().unwrap_or(0) & 1 == 1)
            .count()
            % 2
            == 1
    }

    /// Replace every node by its substitution (identity if absent)
    ///
    /// Each node `n` in the domain contributes `subst[n]` instead of
    /// itself; contributions are XOR-ed so duplicates cancel.
    pub fn substitute(&self, subst: &BTreeMap<NodeId, Signal>) -> Signal {
        let mut out = Signal::zero();
        for &n in &self.0 {
            match subst.get(&n) {
                Some(sig) => out ^= sig,
                None => out.domain.toggle(n),
            }
        }
        out
    }
}

impl FromIterator<NodeId> for Domain {
    /// Collect nodes with XOR semantics: repeated nodes cancel
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut d = Domain::new();
        for n in iter {
            d.toggle(n);
        }
        d
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = &'a NodeId;
    type IntoIter = btree_set::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl BitXorAssign<&Domain> for Domain {
    fn bitxor_assign(&mut self, rhs: &Domain) {
        for &n in &rhs.0 {
            self.toggle(n);
        }
    }
}

impl BitXor<&Domain> for &Domain {
    type Output = Domain;

    fn bitxor(self, rhs: &Domain) -> Domain {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", n)?;
        }
        write!(f, "}}")
    }
}

// ============================================================================
// Signal
// ============================================================================

/// Affine outcome expression `constant ⊕ domain`
/// Gantree: Signal // 상수 + 도메인
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signal {
    /// Constant bit
    pub constant: bool,
    /// Outcome dependency
    pub domain: Domain,
}

impl Signal {
    /// Zero signal
    pub fn zero() -> Self {
        Self::default()
    }

    /// Constant signal
    pub fn constant(bit: bool) -> Self {
        Self {
            constant: bit,
            domain: Domain::new(),
        }
    }

    /// Pure domain signal
    pub fn from_domain(domain: Domain) -> Self {
        Self {
            constant: false,
            domain,
        }
    }

    /// Zero constant and empty domain
    pub fn is_zero(&self) -> bool {
        !self.constant && self.domain.is_empty()
    }

    /// Evaluate against recorded outcomes
    pub fn evaluate(&self, outcomes: &BTreeMap<NodeId, u8>) -> bool {
        self.constant ^ self.domain.parity(outcomes)
    }
}

impl From<Domain> for Signal {
    fn from(domain: Domain) -> Self {
        Self::from_domain(domain)
    }
}

impl BitXorAssign<&Signal> for Signal {
    fn bitxor_assign(&mut self, rhs: &Signal) {
        self.constant ^= rhs.constant;
        self.domain ^= &rhs.domain;
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constant {
            write!(f, "1^{}", self.domain)
        } else {
            write!(f, "{}", self.domain)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_xor_cancels() {
        let mut a: Domain = [1, 2, 3].into_iter().collect();
        let b: Domain = [2, 3, 4].into_iter().collect();
        a ^= &b;
        assert_eq!(a, [1, 4].into_iter().collect());

        let dup: Domain = [5, 5, 6].into_iter().collect();
        assert_eq!(dup, Domain::single(6));
    }

    #[test]
    fn test_parity() {
        let d: Domain = [0, 1, 2].into_iter().collect();
        let outcomes = BTreeMap::from([(0, 1), (1, 1), (2, 0)]);
        assert!(!d.parity(&outcomes));
        let outcomes = BTreeMap::from([(0, 1)]);
        assert!(d.parity(&outcomes));
    }

    #[test]
    fn test_substitute() {
        let d: Domain = [1, 2].into_iter().collect();
        let mut subst = BTreeMap::new();
        subst.insert(
            1,
            Signal {
                constant: true,
                domain: Domain::single(0),
            },
        );
        let s = d.substitute(&subst);
        assert!(s.constant);
        assert_eq!(s.domain, [0, 2].into_iter().collect());
    }

    #[test]
    fn test_display() {
        let d: Domain = [3, 1].into_iter().collect();
        assert_eq!(d.to_string(), "{1,3}");
        assert_eq!(Signal::constant(true).to_string(), "1^{}");
    }
}
