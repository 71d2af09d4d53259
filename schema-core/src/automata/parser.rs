//! Recursive-descent parser for the supported regex sublanguage.
//!
//! Grammar (informal): alternation of concatenations of repeated atoms,
//! where an atom is a literal char, `.`, a bracket class, a non-capturing
//! group `(?:...)`, or an anchor. Unsupported constructs -- lookaround,
//! backreferences, bare capturing groups -- are rejected here rather than
//! silently accepted and mishandled downstream.

use std::fmt;

/// Parsed regex AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Empty,
    Char(char),
    AnyChar,
    Class(CharClass),
    Concat(Vec<Ast>),
    Alt(Vec<Ast>),
    Star(Box<Ast>),
    Plus(Box<Ast>),
    Question(Box<Ast>),
    Repeat(Box<Ast>, u32, Option<u32>),
    StartAnchor,
    EndAnchor,
}

/// A bracket character class: a set of inclusive ranges, optionally negated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub ranges: Vec<(char, char)>,
    pub negated: bool,
}

impl CharClass {
    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        let hit = self.ranges.iter().any(|&(lo, hi)| c >= lo && c <= hi);
        hit != self.negated
    }
}

/// A fully parsed pattern: the AST plus the two anchor flags pulled to the
/// surface so callers don't need to walk the tree to answer "is this
/// pattern fully anchored" (needed by [`crate::automata::lift`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub ast: Ast,
    pub anchored_start: bool,
    pub anchored_end: bool,
}

/// Why a pattern was rejected during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `(?=`, `(?!`, `(?<=`, `(?<!` lookaround.
    Lookaround,
    /// `\1`-style backreference.
    Backreference,
    /// A bare capturing group `(...)` around a class-only pattern; the
    /// sublanguage only supports non-capturing groups.
    BareCapturingGroup,
    /// Unbalanced `(`/`)` or `[`/`]`.
    UnbalancedGroup,
    /// `{m,n}` with `m > n`, or a non-numeric bound.
    InvalidRepeatBound,
    /// An escape sequence this sublanguage doesn't recognize.
    UnsupportedEscape(char),
    /// Any other structurally invalid input.
    Malformed(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lookaround => write!(f, "lookaround assertions are not supported"),
            Self::Backreference => write!(f, "backreferences are not supported"),
            Self::BareCapturingGroup => write!(f, "bare capturing groups are not supported, use (?:...)"),
            Self::UnbalancedGroup => write!(f, "unbalanced group or class delimiter"),
            Self::InvalidRepeatBound => write!(f, "invalid repetition bound"),
            Self::UnsupportedEscape(c) => write!(f, "unsupported escape sequence \\{c}"),
            Self::Malformed(msg) => write!(f, "malformed pattern: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse `source` as a pattern in the supported sublanguage.
///
/// # Errors
///
/// Returns [`ParseError`] for any construct outside the sublanguage.
pub fn parse(source: &str) -> Result<Pattern, ParseError> {
    let chars: Vec<char> = source.chars().collect();
    let mut parser = Parser { chars: &chars, pos: 0 };
    let ast = parser.parse_alt()?;
    if parser.pos != parser.chars.len() {
        return Err(ParseError::UnbalancedGroup);
    }
    let (anchored_start, anchored_end) = top_level_anchors(&ast);
    Ok(Pattern { ast, anchored_start, anchored_end })
}

fn top_level_anchors(ast: &Ast) -> (bool, bool) {
    fn leading_anchor(ast: &Ast) -> bool {
        match ast {
            Ast::StartAnchor => true,
            Ast::Concat(items) => items.first().is_some_and(leading_anchor),
            Ast::Alt(items) => items.iter().all(leading_anchor),
            _ => false,
        }
    }
    fn trailing_anchor(ast: &Ast) -> bool {
        match ast {
            Ast::EndAnchor => true,
            Ast::Concat(items) => items.last().is_some_and(trailing_anchor),
            Ast::Alt(items) => items.iter().all(trailing_anchor),
            _ => false,
        }
    }
    (leading_anchor(ast), trailing_anchor(ast))
}

struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn parse_alt(&mut self) -> Result<Ast, ParseError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.bump();
            branches.push(self.parse_concat()?);
        }
        if branches.len() == 1 {
            Ok(branches.pop().unwrap())
        } else {
            Ok(Ast::Alt(branches))
        }
    }

    fn parse_concat(&mut self) -> Result<Ast, ParseError> {
        let mut items = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            items.push(self.parse_repeat()?);
        }
        if items.is_empty() {
            Ok(Ast::Empty)
        } else if items.len() == 1 {
            Ok(items.pop().unwrap())
        } else {
            Ok(Ast::Concat(items))
        }
    }

    fn parse_repeat(&mut self) -> Result<Ast, ParseError> {
        let atom = self.parse_atom()?;
        match self.peek() {
            Some('*') => {
                self.bump();
                Ok(Ast::Star(Box::new(atom)))
            }
            Some('+') => {
                self.bump();
                Ok(Ast::Plus(Box::new(atom)))
            }
            Some('?') => {
                self.bump();
                Ok(Ast::Question(Box::new(atom)))
            }
            Some('{') => self.parse_bounded_repeat(atom),
            _ => Ok(atom),
        }
    }

    fn parse_bounded_repeat(&mut self, atom: Ast) -> Result<Ast, ParseError> {
        let start = self.pos;
        self.bump(); // '{'
        let min_digits = self.take_digits();
        let (min, max) = if self.peek() == Some(',') {
            self.bump();
            let max_digits = self.take_digits();
            if self.peek() != Some('}') {
                self.pos = start;
                return Ok(atom); // not a valid bound; treat `{` as literal-ish, but we don't support literal braces -> error instead
            }
            self.bump();
            let min: u32 = if min_digits.is_empty() {
                return Err(ParseError::InvalidRepeatBound);
            } else {
                min_digits.parse().map_err(|_| ParseError::InvalidRepeatBound)?
            };
            let max = if max_digits.is_empty() {
                None
            } else {
                Some(max_digits.parse().map_err(|_| ParseError::InvalidRepeatBound)?)
            };
            (min, max)
        } else if self.peek() == Some('}') {
            self.bump();
            if min_digits.is_empty() {
                return Err(ParseError::InvalidRepeatBound);
            }
            let n: u32 = min_digits.parse().map_err(|_| ParseError::InvalidRepeatBound)?;
            (n, Some(n))
        } else {
            return Err(ParseError::InvalidRepeatBound);
        };
        if let Some(max) = max {
            if min > max {
                return Err(ParseError::InvalidRepeatBound);
            }
        }
        Ok(Ast::Repeat(Box::new(atom), min, max))
    }

    fn take_digits(&mut self) -> String {
        let mut s = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            s.push(self.bump().unwrap());
        }
        s
    }

    fn parse_atom(&mut self) -> Result<Ast, ParseError> {
        match self.bump() {
            Some('^') => Ok(Ast::StartAnchor),
            Some('$') => Ok(Ast::EndAnchor),
            Some('.') => Ok(Ast::AnyChar),
            Some('(') => self.parse_group(),
            Some('[') => self.parse_class(),
            Some('\\') => self.parse_escape(),
            Some(c) => Ok(Ast::Char(c)),
            None => Err(ParseError::Malformed("unexpected end of pattern".to_string())),
        }
    }

    fn parse_group(&mut self) -> Result<Ast, ParseError> {
        if self.peek() == Some('?') {
            let save = self.pos;
            self.bump();
            match self.peek() {
                Some(':') => {
                    self.bump();
                }
                Some('=') | Some('!') => return Err(ParseError::Lookaround),
                Some('<') => {
                    self.pos = save + 1;
                    self.bump();
                    match self.peek() {
                        Some('=') | Some('!') => return Err(ParseError::Lookaround),
                        _ => return Err(ParseError::Malformed("unsupported (?< construct".to_string())),
                    }
                }
                _ => return Err(ParseError::Malformed("unsupported (? construct".to_string())),
            }
        } else {
            return Err(ParseError::BareCapturingGroup);
        }
        let inner = self.parse_alt()?;
        if self.bump() != Some(')') {
            return Err(ParseError::UnbalancedGroup);
        }
        Ok(inner)
    }

    fn parse_class(&mut self) -> Result<Ast, ParseError> {
        let negated = if self.peek() == Some('^') {
            self.bump();
            true
        } else {
            false
        };
        let mut ranges = Vec::new();
        let mut first = true;
        loop {
            match self.peek() {
                None => return Err(ParseError::UnbalancedGroup),
                Some(']') if !first => {
                    self.bump();
                    break;
                }
                _ => {}
            }
            first = false;
            let lo = self.class_char()?;
            if self.peek() == Some('-') && self.chars.get(self.pos + 1) != Some(&']') {
                self.bump();
                let hi = self.class_char()?;
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }
        Ok(Ast::Class(CharClass { ranges, negated }))
    }

    fn class_char(&mut self) -> Result<char, ParseError> {
        match self.bump() {
            Some('\\') => escape_to_char(self.bump()),
            Some(c) => Ok(c),
            None => Err(ParseError::UnbalancedGroup),
        }
    }

    fn parse_escape(&mut self) -> Result<Ast, ParseError> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() && c != '0' => Err(ParseError::Backreference),
            Some('d') => {
                self.bump();
                Ok(Ast::Class(CharClass { ranges: vec![('0', '9')], negated: false }))
            }
            Some('D') => {
                self.bump();
                Ok(Ast::Class(CharClass { ranges: vec![('0', '9')], negated: true }))
            }
            Some('w') => {
                self.bump();
                Ok(Ast::Class(CharClass {
                    ranges: vec![('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')],
                    negated: false,
                }))
            }
            Some('W') => {
                self.bump();
                Ok(Ast::Class(CharClass {
                    ranges: vec![('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')],
                    negated: true,
                }))
            }
            Some('s') => {
                self.bump();
                Ok(Ast::Class(CharClass { ranges: vec![(' ', ' '), ('\t', '\t'), ('\n', '\n'), ('\r', '\r')], negated: false }))
            }
            _ => {
                let c = self.bump();
                Ok(Ast::Char(escape_to_char(c)?))
            }
        }
    }
}

fn escape_to_char(c: Option<char>) -> Result<char, ParseError> {
    match c {
        Some('n') => Ok('\n'),
        Some('t') => Ok('\t'),
        Some('r') => Ok('\r'),
        Some(c) if "\\^$.|?*+()[]{}".contains(c) => Ok(c),
        Some(c) if c.is_ascii_alphanumeric() => Err(ParseError::UnsupportedEscape(c)),
        Some(c) => Ok(c),
        None => Err(ParseError::UnbalancedGroup),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_literal_concat() {
        let p = parse("abc").unwrap();
        assert_eq!(p.ast, Ast::Concat(vec![Ast::Char('a'), Ast::Char('b'), Ast::Char('c')]));
    }

    #[test]
    fn parses_alternation() {
        let p = parse("a|b").unwrap();
        assert_eq!(p.ast, Ast::Alt(vec![Ast::Char('a'), Ast::Char('b')]));
    }

    #[test]
    fn parses_star_plus_question() {
        assert!(matches!(parse("a*").unwrap().ast, Ast::Star(_)));
        assert!(matches!(parse("a+").unwrap().ast, Ast::Plus(_)));
        assert!(matches!(parse("a?").unwrap().ast, Ast::Question(_)));
    }

    #[test]
    fn parses_bounded_repeat() {
        let p = parse("a{2,4}").unwrap();
        assert_eq!(p.ast, Ast::Repeat(Box::new(Ast::Char('a')), 2, Some(4)));
        let p2 = parse("a{3}").unwrap();
        assert_eq!(p2.ast, Ast::Repeat(Box::new(Ast::Char('a')), 3, Some(3)));
        let p3 = parse("a{2,}").unwrap();
        assert_eq!(p3.ast, Ast::Repeat(Box::new(Ast::Char('a')), 2, None));
    }

    #[test]
    fn invalid_repeat_bound_rejected() {
        assert_eq!(parse("a{4,2}").unwrap_err(), ParseError::InvalidRepeatBound);
    }

    #[test]
    fn parses_char_class_and_negation() {
        let p = parse("[a-z]").unwrap();
        assert_eq!(
            p.ast,
            Ast::Class(CharClass { ranges: vec![('a', 'z')], negated: false })
        );
        let p2 = parse("[^0-9]").unwrap();
        assert!(matches!(p2.ast, Ast::Class(CharClass { negated: true, .. })));
    }

    #[test]
    fn non_capturing_group_supported() {
        let p = parse("(?:ab)+").unwrap();
        assert!(matches!(p.ast, Ast::Plus(_)));
    }

    #[test]
    fn bare_capturing_group_rejected() {
        assert_eq!(parse("(ab)").unwrap_err(), ParseError::BareCapturingGroup);
    }

    #[test]
    fn lookaround_rejected() {
        assert_eq!(parse("a(?=b)").unwrap_err(), ParseError::Lookaround);
        assert_eq!(parse("a(?!b)").unwrap_err(), ParseError::Lookaround);
        assert_eq!(parse("(?<=a)b").unwrap_err(), ParseError::Lookaround);
    }

    #[test]
    fn backreference_rejected() {
        assert_eq!(parse("(?:a)\\1").unwrap_err(), ParseError::Backreference);
    }

    #[test]
    fn anchors_detected() {
        let p = parse("^abc$").unwrap();
        assert!(p.anchored_start);
        assert!(p.anchored_end);
        let p2 = parse("abc").unwrap();
        assert!(!p2.anchored_start);
        assert!(!p2.anchored_end);
    }

    #[test]
    fn unbalanced_group_rejected() {
        assert_eq!(parse("(?:ab").unwrap_err(), ParseError::UnbalancedGroup);
        assert_eq!(parse("[a-z").unwrap_err(), ParseError::UnbalancedGroup);
    }
}
