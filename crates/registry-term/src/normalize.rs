//! Normalizer for outbound terms.
//!
//! Application values may hold atoms, tuples and maps keyed by atoms. Before
//! they are encoded for the registry they are rewritten depth-first:
//!
//! | Input | Output |
//! |-------|--------|
//! | `nil`, `true`, `false` | unchanged |
//! | other atoms | UTF-8 text binary |
//! | numbers, binaries | unchanged |
//! | lists, improper lists | elements (and tail) normalized |
//! | tuples | elements normalized; shape per [`TupleShape`] |
//! | maps | keys and values normalized; shape per [`MapShape`] |
//! | pids, references, ports, funs | unchanged |
//!
//! [`normalize`] is total and idempotent.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecResult, EncodeOptions, Etf, WireCodec};
use crate::term::{Term, TermMap};

/// Output shape for maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapShape {
    /// Keep maps as maps.
    #[default]
    Keep,
    /// Rewrite each map into a list of `{key, value}` pairs.
    Pairs,
}

/// Output shape for tuples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleShape {
    /// Keep tuples as tuples.
    #[default]
    Keep,
    /// Rewrite each tuple into a list.
    List,
}

/// Normalizer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizeOptions {
    #[serde(default)]
    pub maps: MapShape,
    #[serde(default)]
    pub tuples: TupleShape,
}

impl NormalizeOptions {
    /// Set the map shape.
    pub fn with_maps(mut self, maps: MapShape) -> Self {
        self.maps = maps;
        self
    }

    /// Set the tuple shape.
    pub fn with_tuples(mut self, tuples: TupleShape) -> Self {
        self.tuples = tuples;
        self
    }
}

/// Rewrite a term into the shapes the registry accepts.
///
/// When two map keys normalize to the same value (an atom and the matching
/// text binary), the later entry wins. A `Term::Atom` named `nil`, `true` or
/// `false` becomes the matching native value.
///
/// Floats must be finite; see [`Term`].
pub fn normalize(term: &Term, options: &NormalizeOptions) -> Term {
    match term {
        Term::Atom(atom) if atom.is_sentinel() => Term::atom(atom.as_str()),
        Term::Atom(atom) => Term::text(atom.as_str()),
        Term::List(items) => Term::List(normalize_all(items, options)),
        Term::ImproperList { elements, tail } => {
            Term::improper(normalize_all(elements, options), normalize(tail, options))
        }
        Term::Tuple(items) => shape_tuple(normalize_all(items, options), options),
        Term::Map(map) => match options.maps {
            MapShape::Keep => Term::Map(
                map.iter()
                    .map(|(k, v)| (normalize(k, options), normalize(v, options)))
                    .collect::<TermMap>(),
            ),
            MapShape::Pairs => Term::List(
                map.iter()
                    .map(|(k, v)| {
                        shape_tuple(vec![normalize(k, options), normalize(v, options)], options)
                    })
                    .collect(),
            ),
        },
        // Sentinels, numbers, binaries and opaque kinds are fixed points.
        other => other.clone(),
    }
}

fn normalize_all(items: &[Term], options: &NormalizeOptions) -> Vec<Term> {
    items.iter().map(|item| normalize(item, options)).collect()
}

fn shape_tuple(items: Vec<Term>, options: &NormalizeOptions) -> Term {
    match options.tuples {
        TupleShape::Keep => Term::Tuple(items),
        TupleShape::List => Term::List(items),
    }
}

/// Normalize a term and encode it with [`Etf`].
pub fn serialize(
    term: &Term,
    normalize_options: &NormalizeOptions,
    encode_options: &EncodeOptions,
) -> CodecResult<Vec<u8>> {
    serialize_with(&Etf, term, normalize_options, encode_options)
}

/// Normalize a term and encode it with an explicit codec.
pub fn serialize_with<C: WireCodec + ?Sized>(
    codec: &C,
    term: &Term,
    normalize_options: &NormalizeOptions,
    encode_options: &EncodeOptions,
) -> CodecResult<Vec<u8>> {
    codec.encode(&normalize(term, normalize_options), encode_options)
}
