//! Subset construction: epsilon-NFA -> deterministic automaton.
//!
//! The alphabet is partitioned into the coarsest set of intervals that are
//! distinguishable by the class boundaries actually used in the pattern,
//! rather than exploding to individual `char`s (some classes span most of
//! Unicode). Every `char` in one interval is transition-equivalent, so a
//! DFA edge carries an inclusive `(lo, hi)` range and enumeration always
//! proposes `lo` first, since it is also the smallest code unit reachable
//! through that edge.

use std::collections::{BTreeMap, BTreeSet};

use super::nfa::Nfa;
use super::parser::CharClass;

/// One DFA transition: an inclusive `char` range mapped to a target state.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub lo: char,
    pub hi: char,
    pub target: usize,
}

/// One DFA state.
#[derive(Debug, Clone, Default)]
pub struct DfaState {
    pub accept: bool,
    pub edges: Vec<Edge>,
}

/// A deterministic automaton over `char`, built by subset construction.
#[derive(Debug, Clone)]
pub struct Dfa {
    pub states: Vec<DfaState>,
    pub start: usize,
}

fn epsilon_closure(nfa: &Nfa, seed: &BTreeSet<usize>) -> BTreeSet<usize> {
    let mut closure = seed.clone();
    let mut stack: Vec<usize> = seed.iter().copied().collect();
    while let Some(s) = stack.pop() {
        for &next in &nfa.states[s].epsilon {
            if closure.insert(next) {
                stack.push(next);
            }
        }
    }
    closure
}

/// Every half-open boundary implied by the classes appearing in `nfa`,
/// producing the coarsest partition of `char` into transition-equivalence
/// intervals.
fn alphabet_partition(nfa: &Nfa) -> Vec<(char, char)> {
    let mut boundaries: BTreeSet<u32> = BTreeSet::new();
    boundaries.insert(0);
    for state in &nfa.states {
        for (class, _) in &state.on_class {
            for &(lo, hi) in &class.ranges {
                boundaries.insert(lo as u32);
                let hi_next = hi as u32 + 1;
                boundaries.insert(hi_next);
            }
        }
    }
    let points: Vec<u32> = boundaries.into_iter().collect();
    let mut intervals = Vec::new();
    for window in points.windows(2) {
        let (start, end) = (window[0], window[1]);
        if let (Some(lo), Some(hi)) = (char::from_u32(start), char::from_u32(end - 1)) {
            intervals.push((lo, hi));
        }
    }
    intervals
}

fn class_matches(class: &CharClass, c: char) -> bool {
    class.contains(c)
}

fn mv(nfa: &Nfa, set: &BTreeSet<usize>, c: char) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    for &s in set {
        for (class, target) in &nfa.states[s].on_class {
            if class_matches(class, c) {
                out.insert(*target);
            }
        }
    }
    out
}

/// Build a DFA by subset construction over `nfa`.
#[must_use]
pub fn compile(nfa: &Nfa) -> Dfa {
    let intervals = alphabet_partition(nfa);
    let start_set = epsilon_closure(nfa, &BTreeSet::from([nfa.start]));
    let mut state_ids: BTreeMap<BTreeSet<usize>, usize> = BTreeMap::new();
    let mut states: Vec<DfaState> = Vec::new();
    state_ids.insert(start_set.clone(), 0);
    states.push(DfaState { accept: start_set.contains(&nfa.accept), edges: Vec::new() });

    let mut queue = vec![start_set];
    while let Some(current) = queue.pop() {
        let current_id = state_ids[&current];
        for &(lo, hi) in &intervals {
            let moved = mv(nfa, &current, lo);
            if moved.is_empty() {
                continue;
            }
            let closure = epsilon_closure(nfa, &moved);
            let target_id = *state_ids.entry(closure.clone()).or_insert_with(|| {
                states.push(DfaState { accept: closure.contains(&nfa.accept), edges: Vec::new() });
                queue.push(closure.clone());
                states.len() - 1
            });
            states[current_id].edges.push(Edge { lo, hi, target: target_id });
        }
    }
    Dfa { states, start: 0 }
}

impl Dfa {
    /// `true` if the language accepted by this DFA is empty (no accept
    /// state is reachable from the start state).
    #[must_use]
    pub fn is_empty_language(&self) -> bool {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.start];
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            if self.states[s].accept {
                return false;
            }
            for edge in &self.states[s].edges {
                stack.push(edge.target);
            }
        }
        true
    }

    /// `true` if the accepted language is finite (no cycle lies on a path
    /// from the start state through an accept state).
    #[must_use]
    pub fn is_finite_language(&self) -> bool {
        let accept_reachable = self.states_reaching_accept();
        let mut color = vec![0u8; self.states.len()]; // 0=white,1=gray,2=black
        let mut has_cycle = false;
        self.dfs_cycle_check(self.start, &mut color, &accept_reachable, &mut has_cycle);
        !has_cycle
    }

    fn states_reaching_accept(&self) -> BTreeSet<usize> {
        // Reverse reachability from every accept state.
        let mut reverse: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (id, state) in self.states.iter().enumerate() {
            for edge in &state.edges {
                reverse.entry(edge.target).or_default().push(id);
            }
        }
        let mut seen = BTreeSet::new();
        let mut stack: Vec<usize> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.accept)
            .map(|(id, _)| id)
            .collect();
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            if let Some(preds) = reverse.get(&s) {
                stack.extend(preds.iter().copied());
            }
        }
        seen
    }

    fn dfs_cycle_check(
        &self,
        node: usize,
        color: &mut [u8],
        accept_reachable: &BTreeSet<usize>,
        has_cycle: &mut bool,
    ) {
        if *has_cycle || !accept_reachable.contains(&node) {
            return;
        }
        color[node] = 1;
        for edge in &self.states[node].edges {
            if !accept_reachable.contains(&edge.target) {
                continue;
            }
            match color[edge.target] {
                1 => {
                    *has_cycle = true;
                    return;
                }
                0 => self.dfs_cycle_check(edge.target, color, accept_reachable, has_cycle),
                _ => {}
            }
        }
        color[node] = 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::{nfa, parser::parse};

    fn build(src: &str) -> Dfa {
        let p = parse(src).unwrap();
        let n = nfa::compile(&p.ast);
        compile(&n)
    }

    #[test]
    fn accepts_literal() {
        let dfa = build("ab");
        assert!(!dfa.is_empty_language());
        assert!(dfa.is_finite_language());
    }

    #[test]
    fn star_is_infinite() {
        let dfa = build("a*");
        assert!(!dfa.is_finite_language());
    }

    #[test]
    fn bounded_repeat_is_finite() {
        let dfa = build("a{2,4}");
        assert!(dfa.is_finite_language());
    }

    #[test]
    fn alternation_not_empty() {
        let dfa = build("a|b");
        assert!(!dfa.is_empty_language());
    }

    #[test]
    fn class_range_not_empty() {
        let dfa = build("[a-z]+");
        assert!(!dfa.is_empty_language());
        assert!(!dfa.is_finite_language());
    }
}
