//! Structured values decoded from, or encoded to, registry wire terms.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::map::Entry;
use indexmap::IndexMap;

/// Names of the atoms that stand for `nil`, `true` and `false`.
pub const SENTINEL_ATOMS: [&str; 3] = ["nil", "true", "false"];

/// Symbolic name, distinct from a text string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Create an atom with the given name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The atom name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this atom is one of `nil`, `true` or `false`.
    pub fn is_sentinel(&self) -> bool {
        SENTINEL_ATOMS.contains(&self.as_str())
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.as_str();
        let bare = name
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@');
        if bare {
            write!(f, ":{}", name)
        } else {
            write!(f, ":{:?}", name)
        }
    }
}

/// Integer outside the `i64` range.
///
/// Stored as sign plus little-endian magnitude bytes, the way the wire
/// format carries bignums. The magnitude never has trailing zero bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    magnitude: Vec<u8>,
}

impl BigInt {
    /// Build from a sign and little-endian magnitude.
    pub fn from_le_bytes(negative: bool, mut magnitude: Vec<u8>) -> Self {
        while magnitude.last() == Some(&0) {
            magnitude.pop();
        }
        let negative = negative && !magnitude.is_empty();
        Self {
            negative,
            magnitude,
        }
    }

    /// Build from an `i64`.
    pub fn from_i64(value: i64) -> Self {
        Self::from_le_bytes(value < 0, value.unsigned_abs().to_le_bytes().to_vec())
    }

    /// Build from a `u64`.
    pub fn from_u64(value: u64) -> Self {
        Self::from_le_bytes(false, value.to_le_bytes().to_vec())
    }

    /// Whether the value is below zero.
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Little-endian magnitude bytes.
    pub fn magnitude(&self) -> &[u8] {
        &self.magnitude
    }

    /// The value as an `i64`, if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.magnitude.len() > 8 {
            return None;
        }
        let mut buf = [0_u8; 8];
        buf[..self.magnitude.len()].copy_from_slice(&self.magnitude);
        let unsigned = i128::from(u64::from_le_bytes(buf));
        let signed = if self.negative { -unsigned } else { unsigned };
        i64::try_from(signed).ok()
    }

    /// Decimal digits of the magnitude.
    fn decimal_digits(&self) -> String {
        // Repeated division by 10 over big-endian base-256 digits.
        let mut digits: Vec<u8> = self.magnitude.iter().rev().copied().collect();
        let mut out = Vec::new();
        while !digits.is_empty() {
            let mut remainder: u16 = 0;
            let mut next = Vec::with_capacity(digits.len());
            for byte in &digits {
                let acc = (remainder << 8) | u16::from(*byte);
                let q = (acc / 10) as u8;
                remainder = acc % 10;
                if !next.is_empty() || q != 0 {
                    next.push(q);
                }
            }
            out.push(b'0' + remainder as u8);
            digits = next;
        }
        if out.is_empty() {
            out.push(b'0');
        }
        out.reverse();
        String::from_utf8(out).unwrap_or_default()
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "{}", self.decimal_digits())
    }
}

/// Binary whose final byte is only partially used.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString {
    /// Payload bytes.
    pub bytes: Vec<u8>,
    /// Number of bits used in the last byte (1..=8).
    pub tail_bits: u8,
}

/// Process identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    pub node: Atom,
    pub id: u32,
    pub serial: u32,
    pub creation: u32,
}

/// Unique reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub node: Atom,
    pub creation: u32,
    pub ids: Vec<u32>,
}

/// Port identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub node: Atom,
    pub id: u64,
    pub creation: u32,
}

/// Closure, including its captured environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Fun {
    pub module: Atom,
    pub arity: u8,
    pub uniq: [u8; 16],
    pub index: u32,
    pub old_index: i64,
    pub old_uniq: i64,
    pub pid: Pid,
    pub free_vars: Vec<Term>,
}

/// External function reference (`&module.function/arity`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Export {
    pub module: Atom,
    pub function: Atom,
    pub arity: u8,
}

/// Structured value.
///
/// Floats are always finite: the decoder never produces NaN or infinities,
/// the encoder refuses them and `TryFrom<f64>` rejects them. Building
/// `Term::Float` directly with a non-finite value breaks `Eq` and `Hash`.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// The `nil` atom.
    Nil,
    /// The `true` and `false` atoms.
    Bool(bool),
    /// Integer that fits in `i64`.
    Int(i64),
    /// Integer outside `i64`.
    BigInt(BigInt),
    /// Finite float.
    Float(f64),
    /// Byte string; text strings are UTF-8 binaries.
    Binary(Vec<u8>),
    /// Byte string with a partial last byte.
    BitString(BitString),
    /// Atom other than the three sentinels.
    Atom(Atom),
    /// Proper list.
    List(Vec<Term>),
    /// List terminated by something other than the empty list.
    ImproperList { elements: Vec<Term>, tail: Box<Term> },
    /// Fixed-size tuple.
    Tuple(Vec<Term>),
    /// Key-value map.
    Map(TermMap),
    /// Process identifier.
    Pid(Pid),
    /// Reference.
    Reference(Reference),
    /// Port identifier.
    Port(Port),
    /// Closure.
    Fun(Fun),
    /// External function reference.
    Export(Export),
}

impl Term {
    /// Atom term; `nil`, `true` and `false` become [`Term::Nil`] and [`Term::Bool`].
    pub fn atom(name: &str) -> Self {
        match name {
            "nil" => Term::Nil,
            "true" => Term::Bool(true),
            "false" => Term::Bool(false),
            _ => Term::Atom(Atom::new(name)),
        }
    }

    /// UTF-8 text binary.
    pub fn text(text: impl Into<String>) -> Self {
        Term::Binary(text.into().into_bytes())
    }

    /// Raw binary.
    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Term::Binary(bytes.into())
    }

    /// Proper list.
    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    /// Tuple.
    pub fn tuple(items: impl IntoIterator<Item = Term>) -> Self {
        Term::Tuple(items.into_iter().collect())
    }

    /// Map; later pairs replace earlier ones with an equal key.
    pub fn map(pairs: impl IntoIterator<Item = (Term, Term)>) -> Self {
        Term::Map(pairs.into_iter().collect())
    }

    /// List with an explicit tail, folded into its canonical form.
    ///
    /// A list tail is spliced into the elements; an empty element list
    /// yields the tail itself.
    pub fn improper(mut elements: Vec<Term>, tail: Term) -> Self {
        match tail {
            Term::List(rest) => {
                elements.extend(rest);
                Term::List(elements)
            }
            Term::ImproperList {
                elements: rest,
                tail,
            } => {
                elements.extend(rest);
                Term::ImproperList { elements, tail }
            }
            tail if elements.is_empty() => tail,
            tail => Term::ImproperList {
                elements,
                tail: Box::new(tail),
            },
        }
    }

    /// Whether this is `nil`.
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Nil)
    }

    /// Binary contents, if this is a binary.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Term::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Binary contents as text, if this is a UTF-8 binary.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Integer value, if this is an `i64` integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Term::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Elements, if this is a proper list.
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items),
            _ => None,
        }
    }

    /// Entries, if this is a map.
    pub fn as_map(&self) -> Option<&TermMap> {
        match self {
            Term::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a text key in a map term.
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.as_map().and_then(|m| m.get_text(key))
    }
}

impl From<bool> for Term {
    fn from(value: bool) -> Self {
        Term::Bool(value)
    }
}

impl From<i32> for Term {
    fn from(value: i32) -> Self {
        Term::Int(i64::from(value))
    }
}

impl From<u32> for Term {
    fn from(value: u32) -> Self {
        Term::Int(i64::from(value))
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Int(value)
    }
}

/// A float that is NaN or infinite, which no term can hold.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("non-finite float {0}")]
pub struct NonFiniteFloat(pub f64);

impl TryFrom<f64> for Term {
    type Error = NonFiniteFloat;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            Ok(Term::Float(value))
        } else {
            Err(NonFiniteFloat(value))
        }
    }
}

impl From<&str> for Term {
    fn from(value: &str) -> Self {
        Term::text(value)
    }
}

impl From<String> for Term {
    fn from(value: String) -> Self {
        Term::text(value)
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Term::List(items)
    }
}

impl From<TermMap> for Term {
    fn from(map: TermMap) -> Self {
        Term::Map(map)
    }
}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Term::Nil => {}
            Term::Bool(b) => b.hash(state),
            Term::Int(v) => v.hash(state),
            Term::BigInt(v) => v.hash(state),
            // 0.0 and -0.0 compare equal, so they must hash equal.
            Term::Float(v) => (if *v == 0.0 { 0 } else { v.to_bits() }).hash(state),
            Term::Binary(b) => b.hash(state),
            Term::BitString(b) => b.hash(state),
            Term::Atom(a) => a.hash(state),
            Term::List(items) | Term::Tuple(items) => items.hash(state),
            Term::ImproperList { elements, tail } => {
                elements.hash(state);
                tail.hash(state);
            }
            Term::Map(map) => map.hash(state),
            Term::Pid(p) => p.hash(state),
            Term::Reference(r) => r.hash(state),
            Term::Port(p) => p.hash(state),
            Term::Fun(fun) => {
                fun.module.hash(state);
                fun.uniq.hash(state);
                fun.index.hash(state);
                fun.free_vars.hash(state);
            }
            Term::Export(e) => e.hash(state),
        }
    }
}

// Floats are finite, and `Hash` folds -0.0 into 0.0.
impl Eq for Term {}

/// Key-value map with unique keys.
///
/// Iteration follows insertion order; equality ignores order.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TermMap {
    entries: IndexMap<Term, Term>,
}

impl TermMap {
    /// Empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Build from pairs, failing with the first duplicated key.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Term, Term)>) -> Result<Self, Term> {
        let mut map = Self::new();
        for (key, value) in pairs {
            match map.entries.entry(key) {
                Entry::Occupied(entry) => return Err(entry.key().clone()),
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        Ok(map)
    }

    /// Insert a pair, returning the value it replaced.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, key: Term, value: Term) -> Option<Term> {
        self.entries.insert(key, value)
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &Term) -> Option<&Term> {
        self.entries.get(key)
    }

    /// Value stored under the text binary `key`.
    pub fn get_text(&self, key: &str) -> Option<&Term> {
        self.get(&Term::text(key))
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &Term) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Term, Term> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Term, Term> {
        self.entries.keys()
    }

    /// Values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Term, Term> {
        self.entries.values()
    }
}

impl Hash for TermMap {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-independent so that equal maps hash equal.
        let combined = self.entries.iter().fold(0_u64, |acc, (k, v)| {
            let mut hasher = DefaultHasher::new();
            k.hash(&mut hasher);
            v.hash(&mut hasher);
            acc.wrapping_add(hasher.finish())
        });
        self.len().hash(state);
        combined.hash(state);
    }
}

impl fmt::Debug for TermMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl FromIterator<(Term, Term)> for TermMap {
    fn from_iter<I: IntoIterator<Item = (Term, Term)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TermMap {
    type Item = (Term, Term);
    type IntoIter = indexmap::map::IntoIter<Term, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a TermMap {
    type Item = (&'a Term, &'a Term);
    type IntoIter = indexmap::map::Iter<'a, Term, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_bytes(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", byte)?;
    }
    Ok(())
}

/// Inspect-style rendering, e.g. `%{"name" => :ok, "items" => [1, 2]}`.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Nil => write!(f, "nil"),
            Term::Bool(b) => write!(f, "{}", b),
            Term::Int(v) => write!(f, "{}", v),
            Term::BigInt(v) => write!(f, "{}", v),
            Term::Float(v) => write!(f, "{:?}", v),
            Term::Binary(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) if !text.chars().any(char::is_control) || text.is_empty() => {
                    write!(f, "{:?}", text)
                }
                _ => {
                    write!(f, "<<")?;
                    write_bytes(f, bytes)?;
                    write!(f, ">>")
                }
            },
            Term::BitString(bits) => {
                let (last, init) = match bits.bytes.split_last() {
                    Some(split) => split,
                    None => return write!(f, "<<>>"),
                };
                write!(f, "<<")?;
                write_bytes(f, init)?;
                if !init.is_empty() {
                    write!(f, ", ")?;
                }
                write!(f, "{}::size({})>>", last, bits.tail_bits)
            }
            Term::Atom(atom) => write!(f, "{}", atom),
            Term::List(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Term::ImproperList { elements, tail } => {
                write!(f, "[")?;
                write_seq(f, elements)?;
                write!(f, " | {}]", tail)
            }
            Term::Tuple(items) => {
                write!(f, "{{")?;
                write_seq(f, items)?;
                write!(f, "}}")
            }
            Term::Map(map) => {
                write!(f, "%{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "}}")
            }
            Term::Pid(pid) => write!(f, "#PID<{}.{}.{}>", pid.node.as_str(), pid.id, pid.serial),
            Term::Reference(r) => {
                write!(f, "#Reference<{}", r.node.as_str())?;
                for id in &r.ids {
                    write!(f, ".{}", id)?;
                }
                write!(f, ">")
            }
            Term::Port(port) => write!(f, "#Port<{}.{}>", port.node.as_str(), port.id),
            Term::Fun(fun) => write!(f, "#Function<{}.{}/{}>", fun.index, fun.module.as_str(), fun.arity),
            Term::Export(e) => write!(f, "&{}.{}/{}", e.module.as_str(), e.function.as_str(), e.arity),
        }
    }
}
