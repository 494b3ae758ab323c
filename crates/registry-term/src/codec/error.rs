//! Codec error type.

/// Errors raised by the wire codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// Input ended in the middle of a term.
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// First byte is not the format version marker.
    #[error("unsupported format version byte {0}")]
    BadVersion(u8),

    /// Tag byte that does not start any term.
    #[error("unknown term tag {tag} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },

    /// Tag that exists in the format but is not accepted here.
    #[error("unsupported {what} (tag {tag}) at byte {offset}")]
    UnsupportedTag {
        tag: u8,
        offset: usize,
        what: &'static str,
    },

    /// Atom not present in the known atom table.
    #[error("unknown atom {0:?}")]
    UnknownAtom(String),

    /// Nesting deeper than the configured limit.
    #[error("nesting depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    /// Raw or decompressed input larger than the configured limit.
    #[error("input size {size} exceeds limit {limit}")]
    InputTooLarge { size: usize, limit: usize },

    /// Compressed envelope seen while compression is disabled.
    #[error("compressed terms are not accepted")]
    CompressedNotAllowed,

    /// Zlib stream could not be inflated or deflated.
    #[error("compression error: {0}")]
    Compression(String),

    /// Map carries the same key twice.
    #[error("duplicate map key {0}")]
    DuplicateKey(String),

    /// Float is NaN or infinite.
    #[error("non-finite float")]
    NonFiniteFloat,

    /// Bytes left over after the top-level term.
    #[error("{count} trailing bytes after term")]
    TrailingBytes { count: usize },

    /// Field carries a value the format does not allow.
    #[error("invalid {what}: {detail}")]
    Invalid { what: &'static str, detail: String },

    /// Atom longer than the format allows.
    #[error("atom {0:?} exceeds 255 characters")]
    AtomTooLong(String),

    /// Length that does not fit its length prefix.
    #[error("{what} length {len} exceeds format limit")]
    TooLong { what: &'static str, len: usize },
}

impl CodecError {
    pub(crate) fn invalid(what: &'static str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            detail: detail.into(),
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
