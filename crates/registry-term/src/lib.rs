//! Boundary guard for terms exchanged with a package registry.
//!
//! Registry API responses arrive as Erlang External Term Format blobs. This
//! crate provides the two halves of handling them safely:
//!
//! - **Validate on decode**: bytes are decoded and then walked so that every
//!   node is one of an explicit allow-list of shapes before the value is
//!   handed out as [`Trusted`].
//! - **Normalize on encode**: application values (which may carry atoms,
//!   tuples and nested maps) are rewritten into the canonical shapes the
//!   registry accepts before they are serialized.
//!
//! # Quick Start
//!
//! ```
//! use registry_term::{decode_and_validate, serialize, GuardOptions, NormalizeOptions, Term};
//! use registry_term::codec::EncodeOptions;
//!
//! let body = Term::map([
//!     (Term::text("name"), Term::atom("ok")),
//!     (Term::text("items"), Term::list([Term::from(1), Term::from(2)])),
//! ]);
//! let bytes = serialize(&body, &NormalizeOptions::default(), &EncodeOptions::default()).unwrap();
//!
//! let trusted = decode_and_validate(&bytes, &GuardOptions::default()).unwrap();
//! assert_eq!(trusted.get("name").and_then(Term::as_str), Some("ok"));
//! ```
//!
//! # Allowed shapes
//!
//! | Kind | Accepted |
//! |------|----------|
//! | `nil`, booleans, numbers, binaries, atoms | yes |
//! | pids, references | yes (opaque) |
//! | lists (proper and improper), tuples, maps | yes, if every child is |
//! | ports, funs, external funs | no, the whole value is rejected |
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `REGISTRY_TERM_ALLOW_NEW_ATOMS` | Accept atoms outside the known table (default: false) |
//! | `REGISTRY_TERM_MAX_DEPTH` | Nesting limit (default: 128, at most 512) |
//! | `REGISTRY_TERM_MAX_INPUT_SIZE` | Raw and decompressed byte limit (default: 16 MiB) |
//! | `REGISTRY_TERM_ALLOW_COMPRESSED` | Accept compressed terms (default: true) |

pub mod codec;
pub mod config;
pub mod error;
pub mod json;
pub mod kind;
pub mod normalize;
pub mod report;
pub mod term;
pub mod validate;

// Re-export main types
pub use codec::{CodecError, Etf, WireCodec};
pub use config::GuardOptions;
pub use error::{GuardError, GuardResult};
pub use kind::{DisallowedKind, TermKind};
pub use normalize::{normalize, serialize, serialize_with, MapShape, NormalizeOptions, TupleShape};
pub use report::{error_lines, pretty_http_code};
pub use term::{
    Atom, BigInt, BitString, Export, Fun, NonFiniteFloat, Pid, Port, Reference, Term, TermMap,
};
pub use validate::{
    decode_and_validate, decode_and_validate_strict, decode_and_validate_with, validate_term,
    Rejection, Trusted,
};
