//! Pattern commands
//!
//! Gantree: L2_Pattern → Command
//!
//! Command semantics: `N` prepares `|+⟩`, `E` applies CZ, `M` applies
//! `X^s Z^t` and then measures, `X`/`Z` apply a byproduct when their
//! domain has odd parity, `C` applies a Clifford.

use crate::clifford::Clifford;
use crate::measurement::MeasurementBasis;
use crate::signal::Domain;
use crate::types::{Angle, NodeId, Plane};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement command payload
/// Gantree: Measurement // 노드+평면+각도+도메인
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Measured node
    pub node: NodeId,
    /// Measurement plane
    pub plane: Plane,
    /// Angle in units of π
    pub angle: Angle,
    /// X-dependency domain
    pub s_domain: Domain,
    /// Z-dependency domain
    pub t_domain: Domain,
}

impl Measurement {
    /// Measurement without dependencies
    pub fn new(node: NodeId, plane: Plane, angle: Angle) -> Self {
        Self {
            node,
            plane,
            angle,
            s_domain: Domain::new(),
            t_domain: Domain::new(),
        }
    }

    /// Set both domains
    pub fn with_domains(mut self, s_domain: Domain, t_domain: Domain) -> Self {
        self.s_domain = s_domain;
        self.t_domain = t_domain;
        self
    }

    /// Plane and angle
    pub fn basis(&self) -> MeasurementBasis {
        MeasurementBasis::new(self.plane, self.angle)
    }

    /// Overwrite plane and angle
    pub fn set_basis(&mut self, basis: MeasurementBasis) {
        self.plane = basis.plane;
        self.angle = basis.angle;
    }
}

/// Kind tag of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommandKind {
    /// Preparation
    Prepare,
    /// Entanglement
    Entangle,
    /// Measurement
    Measure,
    /// X byproduct
    X,
    /// Z byproduct
    Z,
    /// Clifford correction
    Clifford,
}

/// Pattern command
/// Gantree: Command // N | E | M | X | Z | C
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Prepare node in `|+⟩`
    Prepare(NodeId),
    /// CZ between two nodes
    Entangle(NodeId, NodeId),
    /// Adaptive measurement
    Measure(Measurement),
    /// `X^parity(domain)`
    X(NodeId, Domain),
    /// `Z^parity(domain)`
    Z(NodeId, Domain),
    /// Clifford correction
    Clifford(NodeId, Clifford),
}

impl Command {
    /// Kind tag
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Prepare(_) => CommandKind::Prepare,
            Command::Entangle(..) => CommandKind::Entangle,
            Command::Measure(_) => CommandKind::Measure,
            Command::X(..) => CommandKind::X,
            Command::Z(..) => CommandKind::Z,
            Command::Clifford(..) => CommandKind::Clifford,
        }
    }

    /// Nodes the command acts on
    pub fn targets(&self) -> Vec<NodeId> {
        match self {
            Command::Prepare(n) | Command::X(n, _) | Command::Z(n, _) | Command::Clifford(n, _) => {
                vec![*n]
            }
            Command::Entangle(a, b) => vec![*a, *b],
            Command::Measure(m) => vec![m.node],
        }
    }

    /// Domains read by the command
    pub fn domains(&self) -> Vec<&Domain> {
        match self {
            Command::Measure(m) => vec![&m.s_domain, &m.t_domain],
            Command::X(_, d) | Command::Z(_, d) => vec![d],
            _ => Vec::new(),
        }
    }

    /// True for X, Z and Clifford corrections
    pub fn is_correction(&self) -> bool {
        matches!(
            self,
            Command::X(..) | Command::Z(..) | Command::Clifford(..)
        )
    }

    /// Measurement shorthand
    pub fn measure(node: NodeId, plane: Plane, angle: Angle) -> Self {
        Command::Measure(Measurement::new(node, plane, angle))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Prepare(n) => write!(f, "N({})", n),
            Command::Entangle(a, b) => write!(f, "E({},{})", a, b),
            Command::Measure(m) => {
                write!(f, "M({},{},{}", m.node, m.plane, m.angle)?;
                if !m.s_domain.is_empty() {
                    write!(f, ",s={}", m.s_domain)?;
                }
                if !m.t_domain.is_empty() {
                    write!(f, ",t={}", m.t_domain)?;
                }
                write!(f, ")")
            }
            Command::X(n, d) => write!(f, "X({},{})", n, d),
            Command::Z(n, d) => write!(f, "Z({},{})", n, d),
            Command::Clifford(n, c) => write!(f, "C({},{})", n, c),
        }
    }
}
