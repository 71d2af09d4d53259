//! Product DFA: simultaneous intersection of several pattern DFAs.
//!
//! A location can be constrained by more than one pattern at once (a
//! `pattern` on the schema plus a `patternProperties` key regex the same
//! property name must also satisfy). Rather than enumerate each DFA
//! separately and intersect witness sets after the fact, this builds one
//! product automaton up front so enumeration only ever walks states that
//! satisfy every active constraint.

use std::collections::BTreeMap;

use super::dfa::{Dfa, Edge};

/// Summary of a product automaton's language, computed via reachability
/// (`empty`) and accept-reachable cycle detection (`finite`), mirroring
/// [`super::dfa::Dfa::is_empty_language`]/`is_finite_language` but over the
/// product state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductSummary {
    pub states: usize,
    pub empty: bool,
    pub finite: bool,
    pub caps_hit: bool,
}

/// The product automaton itself, reusing [`super::dfa::DfaState`]'s shape.
#[derive(Debug, Clone)]
pub struct ProductDfa {
    pub states: Vec<super::dfa::DfaState>,
    pub start: usize,
    pub caps_hit: bool,
}

/// Intersect `dfas` into one product automaton, capping expansion at
/// `state_cap` product states (the `ComplexityCap` budget shared with
/// [`super::lift`]). When the cap is hit, exploration stops early and
/// `caps_hit` is set; the partial automaton is still sound, just possibly
/// incomplete (unexplored states are dropped rather than treated as dead
/// ends, so `empty`/`finite` on a capped automaton should be read as
/// "as far as we looked").
#[must_use]
pub fn build(dfas: &[Dfa], state_cap: usize) -> ProductDfa {
    if dfas.is_empty() {
        return ProductDfa { states: vec![super::dfa::DfaState { accept: true, edges: Vec::new() }], start: 0, caps_hit: false };
    }
    let starts: Vec<usize> = dfas.iter().map(|d| d.start).collect();
    let mut ids: BTreeMap<Vec<usize>, usize> = BTreeMap::new();
    let mut states: Vec<super::dfa::DfaState> = Vec::new();
    ids.insert(starts.clone(), 0);
    states.push(super::dfa::DfaState { accept: all_accept(dfas, &starts), edges: Vec::new() });
    let mut queue = vec![starts];
    let mut caps_hit = false;

    while let Some(current) = queue.pop() {
        if states.len() >= state_cap {
            caps_hit = true;
            break;
        }
        let current_id = ids[&current];
        for (lo, hi) in combined_intervals(dfas, &current) {
            let mut next = Vec::with_capacity(dfas.len());
            let mut all_defined = true;
            for (dfa, &component) in dfas.iter().zip(current.iter()) {
                match find_edge(dfa, component, lo) {
                    Some(target) => next.push(target),
                    None => {
                        all_defined = false;
                        break;
                    }
                }
            }
            if !all_defined {
                continue;
            }
            let target_id = *ids.entry(next.clone()).or_insert_with(|| {
                states.push(super::dfa::DfaState { accept: all_accept(dfas, &next), edges: Vec::new() });
                queue.push(next.clone());
                states.len() - 1
            });
            states[current_id].edges.push(Edge { lo, hi, target: target_id });
        }
    }
    ProductDfa { states, start: 0, caps_hit }
}

fn all_accept(dfas: &[Dfa], tuple: &[usize]) -> bool {
    dfas.iter().zip(tuple.iter()).all(|(d, &s)| d.states[s].accept)
}

fn find_edge(dfa: &Dfa, state: usize, c: char) -> Option<usize> {
    dfa.states[state]
        .edges
        .iter()
        .find(|e| c >= e.lo && c <= e.hi)
        .map(|e| e.target)
}

fn combined_intervals(dfas: &[Dfa], tuple: &[usize]) -> Vec<(char, char)> {
    let mut boundaries: Vec<u32> = vec![0];
    for (dfa, &component) in dfas.iter().zip(tuple.iter()) {
        for edge in &dfa.states[component].edges {
            boundaries.push(edge.lo as u32);
            boundaries.push(edge.hi as u32 + 1);
        }
    }
    boundaries.sort_unstable();
    boundaries.dedup();
    let mut intervals = Vec::new();
    for window in boundaries.windows(2) {
        let (start, end) = (window[0], window[1]);
        if let (Some(lo), Some(hi)) = (char::from_u32(start), char::from_u32(end - 1)) {
            intervals.push((lo, hi));
        }
    }
    intervals
}

impl ProductDfa {
    /// Reduce this product automaton to a [`ProductSummary`].
    #[must_use]
    pub fn summarize(&self) -> ProductSummary {
        let as_dfa = Dfa { states: self.states.clone(), start: self.start };
        ProductSummary {
            states: self.states.len(),
            empty: as_dfa.is_empty_language(),
            finite: as_dfa.is_finite_language(),
            caps_hit: self.caps_hit,
        }
    }
}
