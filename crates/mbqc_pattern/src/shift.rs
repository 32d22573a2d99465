//! Signal shifting
//!
//! Gantree: L4_Pattern → SignalShifter
//!
//! A byproduct that flips a measurement outcome does not need to be applied
//! before the measurement: the flip can be moved into every later command
//! that reads the outcome. Per plane the flipping part is
//!
//! | plane | signal | left on the measurement |
//! |-------|--------|-------------------------|
//! | XY    | `t`    | `s`                     |
//! | XZ    | `s`    | `t ⊕ s` as Z            |
//! | YZ    | `s`    | `t`                     |

use log::debug;
use mbqc_core::{Command, Domain, Measurement, MbqcResult, NodeId, Pattern, Plane, Signal};
use std::collections::BTreeMap;

/// Extract the outcome-flipping signal of `m`, leaving the rest in place
/// Gantree: extract_signal(m) -> Domain // 평면별 신호 분리
pub(crate) fn extract_signal(m: &mut Measurement) -> Domain {
    match m.plane {
        Plane::XY => std::mem::take(&mut m.t_domain),
        Plane::XZ => {
            let s = std::mem::take(&mut m.s_domain);
            m.t_domain ^= &s;
            s
        }
        Plane::YZ => std::mem::take(&mut m.s_domain),
    }
}

/// Rewrite `domain` in terms of shifted outcomes
pub(crate) fn substitute(domain: &Domain, subst: &BTreeMap<NodeId, Signal>) -> Domain {
    domain.substitute(subst).domain
}

/// Record that the outcome of `node` now reads `node ⊕ signal`
pub(crate) fn record_shift(subst: &mut BTreeMap<NodeId, Signal>, node: NodeId, signal: Domain) {
    if signal.is_empty() {
        return;
    }
    let mut domain = signal;
    domain.toggle(node);
    subst.insert(node, Signal::from_domain(domain));
}

/// Shift every extractable signal forward
/// Gantree: shift_signals(P) -> Result<Pattern> // 신호 전파
///
/// Works on any valid pattern. Corrections with an empty domain are
/// dropped. Running it twice gives the same pattern.
pub fn shift_signals(pattern: &Pattern) -> MbqcResult<Pattern> {
    pattern.validate()?;

    let mut subst: BTreeMap<NodeId, Signal> = BTreeMap::new();
    let mut commands = Vec::with_capacity(pattern.len());

    for cmd in pattern.commands() {
        match cmd {
            Command::Measure(m) => {
                let mut m = m.clone();
                m.s_domain = substitute(&m.s_domain, &subst);
                m.t_domain = substitute(&m.t_domain, &subst);
                let signal = extract_signal(&mut m);
                if !signal.is_empty() {
                    debug!("shift: node {} carries signal {}", m.node, signal);
                }
                record_shift(&mut subst, m.node, signal);
                commands.push(Command::Measure(m));
            }
            Command::X(n, d) => {
                let d = substitute(d, &subst);
                if !d.is_empty() {
                    commands.push(Command::X(*n, d));
                }
            }
            Command::Z(n, d) => {
                let d = substitute(d, &subst);
                if !d.is_empty() {
                    commands.push(Command::Z(*n, d));
                }
            }
            other => commands.push(other.clone()),
        }
    }

    let out = Pattern::from_parts(pattern.inputs().to_vec(), pattern.outputs().to_vec(), commands);
    Ok(match pattern.name() {
        Some(n) => out.with_name(n),
        None => out,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use mbqc_core::PatternBuilder;

    fn dom(nodes: &[NodeId]) -> Domain {
        nodes.iter().copied().collect()
    }

    #[test]
    fn test_extract_signal_per_plane() {
        let base = Measurement::new(4, Plane::XY, 0.1)
            .with_domains(Domain::single(1), dom(&[1, 2]));

        let mut xy = base.clone();
        assert_eq!(extract_signal(&mut xy), dom(&[1, 2]));
        assert_eq!(xy.s_domain, Domain::single(1));
        assert!(xy.t_domain.is_empty());

        let mut xz = base.clone();
        xz.plane = Plane::XZ;
        assert_eq!(extract_signal(&mut xz), Domain::single(1));
        assert!(xz.s_domain.is_empty());
        assert_eq!(xz.t_domain, Domain::single(2));

        let mut yz = base;
        yz.plane = Plane::YZ;
        assert_eq!(extract_signal(&mut yz), Domain::single(1));
        assert_eq!(yz.t_domain, dom(&[1, 2]));
    }

    #[test]
    fn test_shift_moves_t_domain_forward() {
        let p = PatternBuilder::new(vec![], vec![2])
            .n(0)
            .n(1)
            .n(2)
            .e(0, 1)
            .e(1, 2)
            .m(0, Plane::XY, 0.0)
            .m_adaptive(1, Plane::XY, 0.3, &[], &[0])
            .x(2, &[1])
            .z(2, &[0])
            .build();
        let out = shift_signals(&p).unwrap();
        let m1 = out.measurement(1).unwrap();
        assert!(m1.t_domain.is_empty());
        // X2{1} -> X2{0,1}
        assert!(out
            .commands()
            .contains(&Command::X(2, dom(&[0, 1]))));
        assert!(out.commands().contains(&Command::Z(2, Domain::single(0))));
    }

    #[test]
    fn test_empty_correction_dropped() {
        let p = PatternBuilder::new(vec![0], vec![1])
            .j(0, 1, 0.0)
            .z(1, &[])
            .build();
        let out = shift_signals(&p).unwrap();
        assert_eq!(out.len(), p.len() - 1);
        assert!(out.commands().iter().all(|c| !matches!(c, Command::Z(..))));
    }

    #[test]
    fn test_shift_idempotent() {
        let p = PatternBuilder::new(vec![0], vec![3])
            .n(1)
            .n(2)
            .n(3)
            .e(0, 1)
            .e(1, 2)
            .e(2, 3)
            .m(0, Plane::XZ, 0.2)
            .m_adaptive(1, Plane::YZ, 0.7, &[0], &[0])
            .m_adaptive(2, Plane::XY, 0.4, &[1], &[0, 1])
            .x(3, &[2])
            .z(3, &[1])
            .build();
        let once = shift_signals(&p).unwrap();
        let twice = shift_signals(&once).unwrap();
        assert_eq!(once, twice);
        assert!(once
            .measurements()
            .filter(|m| m.plane == Plane::XY)
            .all(|m| m.t_domain.is_empty()));
    }
}
