//! Thompson construction: regex AST -> epsilon-NFA.
//!
//! Anchors (`^`/`$`) carry no run-time transition of their own: the
//! sublanguage only uses them to mark whether a pattern is meant to match a
//! whole string (surfaced by [`crate::automata::parser::Pattern::anchored_start`]/
//! `anchored_end`), so here they compile to a no-op epsilon edge and the
//! anchoring is enforced entirely at the match-semantics layer, the same
//! distinction POSIX engines draw between "assertion" and "consuming" states.

use super::parser::{Ast, CharClass};

/// One NFA state: a set of epsilon successors and a set of
/// `(class, successor)` consuming transitions.
#[derive(Debug, Clone, Default)]
pub struct NfaState {
    pub epsilon: Vec<usize>,
    pub on_class: Vec<(CharClass, usize)>,
}

/// An epsilon-NFA with a single start and single accept state (Thompson's
/// construction always produces exactly one of each per fragment).
#[derive(Debug, Clone)]
pub struct Nfa {
    pub states: Vec<NfaState>,
    pub start: usize,
    pub accept: usize,
}

struct Builder {
    states: Vec<NfaState>,
}

impl Builder {
    fn new_state(&mut self) -> usize {
        self.states.push(NfaState::default());
        self.states.len() - 1
    }

    fn add_epsilon(&mut self, from: usize, to: usize) {
        self.states[from].epsilon.push(to);
    }

    fn add_class(&mut self, from: usize, class: CharClass, to: usize) {
        self.states[from].on_class.push((class, to));
    }

    fn fragment(&mut self, ast: &Ast) -> (usize, usize) {
        match ast {
            Ast::Empty | Ast::StartAnchor | Ast::EndAnchor => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_epsilon(s, e);
                (s, e)
            }
            Ast::Char(c) => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_class(s, CharClass { ranges: vec![(*c, *c)], negated: false }, e);
                (s, e)
            }
            Ast::AnyChar => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_class(s, CharClass { ranges: vec![('\u{0}', char::MAX)], negated: false }, e);
                (s, e)
            }
            Ast::Class(class) => {
                let s = self.new_state();
                let e = self.new_state();
                self.add_class(s, class.clone(), e);
                (s, e)
            }
            Ast::Concat(items) => {
                let mut iter = items.iter();
                let Some(first) = iter.next() else {
                    return self.fragment(&Ast::Empty);
                };
                let (mut start, mut end) = self.fragment(first);
                for item in iter {
                    let (s2, e2) = self.fragment(item);
                    self.add_epsilon(end, s2);
                    end = e2;
                }
                (start, end)
            }
            Ast::Alt(branches) => {
                let s = self.new_state();
                let e = self.new_state();
                for branch in branches {
                    let (bs, be) = self.fragment(branch);
                    self.add_epsilon(s, bs);
                    self.add_epsilon(be, e);
                }
                (s, e)
            }
            Ast::Star(inner) => {
                let s = self.new_state();
                let e = self.new_state();
                let (is, ie) = self.fragment(inner);
                self.add_epsilon(s, is);
                self.add_epsilon(s, e);
                self.add_epsilon(ie, is);
                self.add_epsilon(ie, e);
                (s, e)
            }
            Ast::Plus(inner) => {
                let (is, ie) = self.fragment(inner);
                let e = self.new_state();
                self.add_epsilon(ie, is);
                self.add_epsilon(ie, e);
                (is, e)
            }
            Ast::Question(inner) => {
                let s = self.new_state();
                let e = self.new_state();
                let (is, ie) = self.fragment(inner);
                self.add_epsilon(s, is);
                self.add_epsilon(s, e);
                self.add_epsilon(ie, e);
                (s, e)
            }
            Ast::Repeat(inner, min, max) => self.fragment_repeat(inner, *min, *max),
        }
    }

    fn fragment_repeat(&mut self, inner: &Ast, min: u32, max: Option<u32>) -> (usize, usize) {
        match max {
            None => {
                // min copies of `inner` followed by `inner*`.
                let mut parts: Vec<Ast> = (0..min).map(|_| inner.clone()).collect();
                parts.push(Ast::Star(Box::new(inner.clone())));
                self.fragment(&Ast::Concat(parts))
            }
            Some(max) => {
                // `min` mandatory copies, then `(max - min)` optional copies nested
                // so each optional copy only matters if the previous one matched.
                let mut parts: Vec<Ast> = (0..min).map(|_| inner.clone()).collect();
                let optional_count = max.saturating_sub(min);
                if optional_count > 0 {
                    let mut tail = Ast::Question(Box::new(inner.clone()));
                    for _ in 1..optional_count {
                        tail = Ast::Question(Box::new(Ast::Concat(vec![inner.clone(), tail])));
                    }
                    parts.push(tail);
                }
                if parts.is_empty() {
                    self.fragment(&Ast::Empty)
                } else {
                    self.fragment(&Ast::Concat(parts))
                }
            }
        }
    }
}

/// Compile an AST into a Thompson NFA.
#[must_use]
pub fn compile(ast: &Ast) -> Nfa {
    let mut builder = Builder { states: Vec::new() };
    let (start, accept) = builder.fragment(ast);
    Nfa { states: builder.states, start, accept }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automata::parser::parse;

    #[test]
    fn compiles_without_panicking_for_all_constructs() {
        for src in ["a", "a|b", "a*", "a+", "a?", "a{2,4}", "[a-z]+", "(?:ab)+", "^a$", "."] {
            let p = parse(src).unwrap();
            let nfa = compile(&p.ast);
            assert!(!nfa.states.is_empty());
        }
    }

    #[test]
    fn repeat_bounds_expand_to_right_shape() {
        let p = parse("a{2,3}").unwrap();
        let nfa = compile(&p.ast);
        // start/accept must be distinct and reachable via epsilon+class closure.
        assert_ne!(nfa.start, nfa.accept);
    }
}
