//! Live-qubit accounting
//!
//! Gantree: L4_Pattern → Space
//!
//! A standard pattern prepares every node before the first measurement.
//! Preparing and entangling each node only when a measurement first needs
//! it keeps far fewer qubits alive at once.

use crate::standardize::Standardizer;
use log::debug;
use mbqc_core::{Command, MbqcResult, NodeId, Pattern};
use std::collections::{BTreeMap, BTreeSet};

/// Peak number of simultaneously live qubits
/// Gantree: max_space(P) -> usize // 최대 활성 큐비트
pub fn max_space(pattern: &Pattern) -> usize {
    let mut live = pattern.inputs().len();
    let mut peak = live;
    for cmd in pattern.commands() {
        match cmd {
            Command::Prepare(_) => {
                live += 1;
                peak = peak.max(live);
            }
            Command::Measure(_) => live = live.saturating_sub(1),
            _ => {}
        }
    }
    peak
}

/// Reorder preparations and entanglements just in time
/// Gantree: minimize_space(P) -> Result<Pattern> // 지연 준비
///
/// Measurement order and corrections are kept; a non-standard pattern is
/// standardized first with its source measurement order. Before each
/// measurement of `v`, the unprepared nodes of `{v} ∪ N(v)` are prepared
/// and every pending edge at `v` is applied.
pub fn minimize_space(pattern: &Pattern) -> MbqcResult<Pattern> {
    let standard = if pattern.is_standard() {
        pattern.validate()?;
        pattern.clone()
    } else {
        Standardizer::preserving().standardize(pattern)?
    };

    let mut to_prepare: BTreeSet<NodeId> = BTreeSet::new();
    let mut adjacency: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    let mut measurements = Vec::new();
    let mut corrections = Vec::new();
    for cmd in standard.commands() {
        match cmd {
            Command::Prepare(n) => {
                to_prepare.insert(*n);
            }
            Command::Entangle(a, b) => {
                // 중복 간선은 상쇄
                let (a, b) = (*a, *b);
                let present = adjacency.get(&a).is_some_and(|s| s.contains(&b));
                if present {
                    adjacency.entry(a).or_default().remove(&b);
                    adjacency.entry(b).or_default().remove(&a);
                } else {
                    adjacency.entry(a).or_default().insert(b);
                    adjacency.entry(b).or_default().insert(a);
                }
            }
            Command::Measure(m) => measurements.push(m.clone()),
            other => corrections.push(other.clone()),
        }
    }

    let mut commands = Vec::with_capacity(standard.len());
    for m in measurements {
        let v = m.node;
        let mut needed: BTreeSet<NodeId> = adjacency.get(&v).cloned().unwrap_or_default();
        needed.insert(v);
        for n in needed {
            if to_prepare.remove(&n) {
                commands.push(Command::Prepare(n));
            }
        }
        let pending = adjacency.remove(&v).unwrap_or_default();
        for w in pending {
            if let Some(s) = adjacency.get_mut(&w) {
                s.remove(&v);
            }
            commands.push(Command::Entangle(v.min(w), v.max(w)));
        }
        commands.push(Command::Measure(m));
    }
    commands.extend(to_prepare.into_iter().map(Command::Prepare));
    for (&a, s) in &adjacency {
        commands.extend(s.range(a + 1..).map(|&b| Command::Entangle(a, b)));
    }
    commands.extend(corrections);

    let out = Pattern::from_parts(
        standard.inputs().to_vec(),
        standard.outputs().to_vec(),
        commands,
    );
    debug!(
        "space: {} -> {} live qubits",
        max_space(&standard),
        max_space(&out)
    );
    Ok(match standard.name() {
        Some(n) => out.with_name(n),
        None => out,
    })
}

// ============================================================================
// Tests
// ============================================================================
