//! Regex-sublanguage automata: parse, compile, lift, enumerate.
//!
//! `pattern`/`patternProperties` keys are small regexes over a deliberately
//! restricted sublanguage (concatenation, alternation, char classes, `.`,
//! the repetition operators, bounded `{m,n}`, non-capturing groups, and the
//! `^`/`$` anchors). Design Notes §9 directs a from-scratch Thompson
//! NFA/DFA rather than the `regex` crate: this module needs to *enumerate*
//! strings a pattern accepts, in a specific deterministic order, which a
//! match-only engine cannot give us for free.
//!
//! Pipeline: [`parser`] builds an AST, [`nfa`] compiles it to a Thompson
//! NFA, [`dfa`] subset-constructs a DFA, [`product`] intersects several
//! DFAs (e.g. a `pattern` DFA and a `patternProperties` key DFA active on
//! the same location), and [`enumerate`] walks the product DFA breadth
//! first to produce witnesses in `(length asc, code unit asc)` order.
//! [`lift`] decides whether a pattern is simple enough to lift into an
//! explicit `enum` of literals instead of driving generation through the
//! automaton at all.

pub mod dfa;
pub mod enumerate;
pub mod lift;
pub mod nfa;
pub mod parser;
pub mod product;

pub use enumerate::OrderedFrontier;
pub use lift::{LiftKind, LiftOutcome, RefusalReason};
pub use parser::{ParseError, Pattern};
pub use product::ProductSummary;
