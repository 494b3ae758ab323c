//! Decoder-Validator.
//!
//! Untrusted bytes go through [`decode_and_validate`]; nothing else in a
//! caller should decode registry bytes directly. The decoded term is walked
//! iteratively and every node is classified with [`TermKind::of`]. One
//! disallowed node anywhere rejects the whole value.

use std::ops::Deref;

use tracing::{debug, warn};

use crate::codec::{Etf, WireCodec};
use crate::config::GuardOptions;
use crate::error::{GuardError, GuardResult};
use crate::kind::{DisallowedKind, TermKind};
use crate::term::Term;

/// Why a decoded term was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// A node of a disallowed kind.
    #[error("disallowed {kind} at depth {depth}")]
    Disallowed { kind: DisallowedKind, depth: usize },

    /// Nesting beyond the configured limit.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    TooDeep { depth: usize, limit: usize },
}

/// A term that passed validation.
///
/// Only produced by this module, so holding one means every node in the
/// tree is of an allowed kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Trusted(Term);

impl Trusted {
    /// Borrow the term.
    pub fn as_term(&self) -> &Term {
        &self.0
    }

    /// Take the term.
    pub fn into_inner(self) -> Term {
        self.0
    }
}

impl Deref for Trusted {
    type Target = Term;

    fn deref(&self) -> &Term {
        &self.0
    }
}

impl AsRef<Term> for Trusted {
    fn as_ref(&self) -> &Term {
        &self.0
    }
}

impl From<Trusted> for Term {
    fn from(trusted: Trusted) -> Self {
        trusted.0
    }
}

/// Decode untrusted bytes with the default [`Etf`] codec and validate them.
///
/// Empty input yields `nil`. Bytes the codec cannot parse fail with
/// [`GuardError::MalformedInput`]; a term holding a disallowed kind fails
/// with [`GuardError::UnsafeOrMalformed`].
pub fn decode_and_validate(bytes: &[u8], options: &GuardOptions) -> GuardResult<Trusted> {
    decode_and_validate_with(&Etf, bytes, options)
}

/// Like [`decode_and_validate`], with an explicit codec.
pub fn decode_and_validate_with<C: WireCodec + ?Sized>(
    codec: &C,
    bytes: &[u8],
    options: &GuardOptions,
) -> GuardResult<Trusted> {
    if bytes.is_empty() {
        debug!("empty input decoded as nil");
        return Ok(Trusted(Term::Nil));
    }

    let term = codec
        .decode(bytes, &options.decode_options())
        .map_err(|e| {
            warn!(size = bytes.len(), error = %e, "rejected malformed term");
            GuardError::from(e)
        })?;

    let trusted = validate_term(term, options.max_depth)?;
    debug!(size = bytes.len(), kind = %TermKind::of(trusted.as_term()), "accepted term");
    Ok(trusted)
}

/// Decode and validate, panicking on rejection.
///
/// For call sites that have no way to recover from bad registry data.
///
/// # Panics
///
/// Panics if the bytes are malformed or hold a disallowed kind.
pub fn decode_and_validate_strict(bytes: &[u8], options: &GuardOptions) -> Term {
    match decode_and_validate(bytes, options) {
        Ok(trusted) => trusted.into_inner(),
        Err(e) => panic!("{}", e),
    }
}

/// Validate a term obtained by other means.
pub fn validate_term(term: Term, max_depth: usize) -> GuardResult<Trusted> {
    match check(&term, max_depth) {
        Ok(()) => Ok(Trusted(term)),
        Err(rejection) => {
            warn!(%rejection, "rejected unsafe term");
            Err(rejection.into())
        }
    }
}

/// Walk the tree with an explicit stack, stopping at the first bad node.
fn check(term: &Term, max_depth: usize) -> Result<(), Rejection> {
    let mut stack = vec![(term, 0_usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(Rejection::TooDeep {
                depth,
                limit: max_depth,
            });
        }
        if let TermKind::Disallowed(kind) = TermKind::of(node) {
            return Err(Rejection::Disallowed { kind, depth });
        }

        let child = depth + 1;
        match node {
            Term::List(items) | Term::Tuple(items) => {
                stack.extend(items.iter().rev().map(|item| (item, child)));
            }
            Term::ImproperList { elements, tail } => {
                stack.push((tail, child));
                stack.extend(elements.iter().rev().map(|item| (item, child)));
            }
            Term::Map(map) => {
                for (key, value) in map.iter().rev() {
                    stack.push((value, child));
                    stack.push((key, child));
                }
            }
            _ => {}
        }
    }
    Ok(())
}
