//! Wire codec for registry terms.
//!
//! The registry speaks the Erlang External Term Format. [`WireCodec`] is the
//! seam between the guard and the byte-level format; [`Etf`] is the
//! implementation used by default.
//!
//! # Decoding limits
//!
//! - Max depth: 128 by default, never more than 512
//! - Max input size: 16 MiB (raw, and again after decompression)
//! - Length prefixes are checked against the remaining input before any
//!   allocation
//! - Duplicate map keys, non-finite floats and trailing bytes are rejected

mod atoms;
mod decode;
mod encode;
mod error;
mod tags;

#[cfg(test)]
mod tests;

pub use atoms::{AtomPolicy, AtomTable, DEFAULT_ATOMS};
pub use error::{CodecError, CodecResult};

use crate::term::Term;

/// Maximum nesting depth for decoded terms.
pub const MAX_DEPTH: usize = 128;

/// Hard ceiling on any configured depth limit.
///
/// The decoder recurses once per nesting level, so this bounds its stack use.
pub const MAX_DEPTH_CEILING: usize = 512;

/// Maximum input size, raw or decompressed (16 MiB).
pub const MAX_INPUT_SIZE: usize = 16 * 1_024 * 1_024;

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Deepest allowed nesting; the top-level term is depth 0. Values above
    /// [`MAX_DEPTH_CEILING`] are treated as the ceiling.
    pub max_depth: usize,
    /// Largest accepted input, before and after decompression.
    pub max_input_size: usize,
    /// Whether the zlib-compressed envelope is accepted.
    pub allow_compressed: bool,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_input_size: MAX_INPUT_SIZE,
            allow_compressed: true,
        }
    }
}

/// Decoder options.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Whether unseen atoms may be created.
    pub atom_policy: AtomPolicy,
    /// Atoms treated as existing under [`AtomPolicy::ExistingOnly`].
    pub known_atoms: AtomTable,
    /// Resource limits.
    pub limits: DecodeLimits,
}

impl DecodeOptions {
    /// Accept any atom.
    pub fn allow_new_atoms(mut self) -> Self {
        self.atom_policy = AtomPolicy::CreateNew;
        self
    }

    /// Treat additional atoms as existing.
    pub fn with_known_atoms<I, S>(mut self, atoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_atoms.extend(atoms);
        self
    }

    /// Replace the resource limits.
    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Encoder options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Zlib level (0-9) for the compressed envelope, or `None` for plain output.
    pub compression: Option<u32>,
}

impl EncodeOptions {
    /// Compress the output at the given zlib level.
    pub fn compressed(mut self, level: u32) -> Self {
        self.compression = Some(level.min(9));
        self
    }
}

/// Byte-level encode/decode primitive.
pub trait WireCodec {
    /// Decode a complete, non-empty byte blob into a term.
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> CodecResult<Term>;

    /// Encode a term into a complete byte blob.
    fn encode(&self, term: &Term, options: &EncodeOptions) -> CodecResult<Vec<u8>>;
}

/// Erlang External Term Format codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Etf;

impl WireCodec for Etf {
    fn decode(&self, bytes: &[u8], options: &DecodeOptions) -> CodecResult<Term> {
        decode::decode(bytes, options)
    }

    fn encode(&self, term: &Term, options: &EncodeOptions) -> CodecResult<Vec<u8>> {
        encode::encode(term, options)
    }
}
