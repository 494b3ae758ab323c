//! Guard configuration.

use serde::{Deserialize, Serialize};

use crate::codec::{
    AtomPolicy, DecodeLimits, DecodeOptions, MAX_DEPTH, MAX_DEPTH_CEILING, MAX_INPUT_SIZE,
};

/// Options for [`decode_and_validate`](crate::decode_and_validate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOptions {
    /// Accept atoms that are not in the known atom table.
    #[serde(default)]
    pub allow_new_atoms: bool,

    /// Nesting limit, enforced by both the decoder and the validator.
    /// Capped at [`MAX_DEPTH_CEILING`].
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Byte limit for raw and decompressed input.
    #[serde(default = "default_max_input_size")]
    pub max_input_size: usize,

    /// Accept the zlib-compressed envelope.
    #[serde(default = "default_allow_compressed")]
    pub allow_compressed: bool,

    /// Atoms treated as known in addition to the defaults.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_atoms: Vec<String>,
}

fn default_max_depth() -> usize {
    MAX_DEPTH
}

fn default_max_input_size() -> usize {
    MAX_INPUT_SIZE
}

fn default_allow_compressed() -> bool {
    true
}

impl Default for GuardOptions {
    fn default() -> Self {
        Self {
            allow_new_atoms: false,
            max_depth: default_max_depth(),
            max_input_size: default_max_input_size(),
            allow_compressed: default_allow_compressed(),
            extra_atoms: Vec::new(),
        }
    }
}

impl GuardOptions {
    /// Create options from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `REGISTRY_TERM_ALLOW_NEW_ATOMS` | Accept unknown atoms (`1`/`true`) |
    /// | `REGISTRY_TERM_MAX_DEPTH` | Nesting limit (at most 512) |
    /// | `REGISTRY_TERM_MAX_INPUT_SIZE` | Byte limit |
    /// | `REGISTRY_TERM_ALLOW_COMPRESSED` | Accept compressed terms (`0`/`false` to refuse) |
    ///
    /// Unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str, default: bool| {
            lookup(name)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };
        Self {
            allow_new_atoms: flag("REGISTRY_TERM_ALLOW_NEW_ATOMS", false),
            max_depth: lookup("REGISTRY_TERM_MAX_DEPTH")
                .and_then(|v| v.parse::<usize>().ok())
                .map_or_else(default_max_depth, |depth| depth.min(MAX_DEPTH_CEILING)),
            max_input_size: lookup("REGISTRY_TERM_MAX_INPUT_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_max_input_size),
            allow_compressed: flag("REGISTRY_TERM_ALLOW_COMPRESSED", default_allow_compressed()),
            extra_atoms: Vec::new(),
        }
    }

    /// Accept atoms outside the known table.
    pub fn with_allow_new_atoms(mut self, allow: bool) -> Self {
        self.allow_new_atoms = allow;
        self
    }

    /// Set the nesting limit, capped at [`MAX_DEPTH_CEILING`].
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.min(MAX_DEPTH_CEILING);
        self
    }

    /// Set the byte limit.
    pub fn with_max_input_size(mut self, size: usize) -> Self {
        self.max_input_size = size;
        self
    }

    /// Accept or refuse compressed terms.
    pub fn with_allow_compressed(mut self, allow: bool) -> Self {
        self.allow_compressed = allow;
        self
    }

    /// Treat additional atoms as known.
    pub fn with_extra_atoms<I, S>(mut self, atoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_atoms.extend(atoms.into_iter().map(Into::into));
        self
    }

    /// Codec options derived from these settings.
    pub fn decode_options(&self) -> DecodeOptions {
        let options = DecodeOptions {
            atom_policy: if self.allow_new_atoms {
                AtomPolicy::CreateNew
            } else {
                AtomPolicy::ExistingOnly
            },
            limits: DecodeLimits {
                max_depth: self.max_depth.min(MAX_DEPTH_CEILING),
                max_input_size: self.max_input_size,
                allow_compressed: self.allow_compressed,
            },
            ..DecodeOptions::default()
        };
        options.with_known_atoms(self.extra_atoms.iter().cloned())
    }
}
