//! Classification of terms into the shapes the validator knows about.

use std::fmt;

use crate::term::Term;

/// Shape of a single term node, ignoring its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// `nil`.
    Null,
    /// `true` / `false`.
    Boolean,
    /// Integer, bignum or float.
    Number,
    /// Binary or bitstring.
    String,
    /// Symbolic atom.
    Atom,
    /// Pid or reference.
    Handle,
    /// Proper or improper list.
    Sequence,
    /// Tuple.
    Tuple,
    /// Map.
    Mapping,
    /// Anything outside the allow-list.
    Disallowed(DisallowedKind),
}

/// Kinds that are never accepted from the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisallowedKind {
    /// Port identifier.
    Port,
    /// Closure.
    Fun,
    /// External function reference.
    Export,
    /// A kind with no classification rule.
    Unclassified,
}

impl TermKind {
    /// Classify a term node.
    pub fn of(term: &Term) -> Self {
        match term {
            Term::Nil => TermKind::Null,
            Term::Bool(_) => TermKind::Boolean,
            Term::Int(_) | Term::BigInt(_) | Term::Float(_) => TermKind::Number,
            Term::Binary(_) | Term::BitString(_) => TermKind::String,
            Term::Atom(atom) if atom.is_sentinel() => match atom.as_str() {
                "nil" => TermKind::Null,
                _ => TermKind::Boolean,
            },
            Term::Atom(_) => TermKind::Atom,
            Term::Pid(_) | Term::Reference(_) => TermKind::Handle,
            Term::List(_) | Term::ImproperList { .. } => TermKind::Sequence,
            Term::Tuple(_) => TermKind::Tuple,
            Term::Map(_) => TermKind::Mapping,
            other => TermKind::Disallowed(DisallowedKind::of(other)),
        }
    }

    /// Whether values of this kind may appear in a trusted term.
    pub fn is_allowed(self) -> bool {
        !matches!(self, TermKind::Disallowed(_))
    }
}

impl DisallowedKind {
    fn of(term: &Term) -> Self {
        match term {
            Term::Port(_) => DisallowedKind::Port,
            Term::Fun(_) => DisallowedKind::Fun,
            Term::Export(_) => DisallowedKind::Export,
            _ => DisallowedKind::Unclassified,
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKind::Null => write!(f, "null"),
            TermKind::Boolean => write!(f, "boolean"),
            TermKind::Number => write!(f, "number"),
            TermKind::String => write!(f, "string"),
            TermKind::Atom => write!(f, "atom"),
            TermKind::Handle => write!(f, "handle"),
            TermKind::Sequence => write!(f, "sequence"),
            TermKind::Tuple => write!(f, "tuple"),
            TermKind::Mapping => write!(f, "mapping"),
            TermKind::Disallowed(kind) => write!(f, "{}", kind),
        }
    }
}

impl fmt::Display for DisallowedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisallowedKind::Port => write!(f, "port"),
            DisallowedKind::Fun => write!(f, "function"),
            DisallowedKind::Export => write!(f, "external function"),
            DisallowedKind::Unclassified => write!(f, "unclassified term"),
        }
    }
}
