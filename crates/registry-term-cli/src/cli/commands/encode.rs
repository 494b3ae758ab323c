//! CLI command: regterm encode
//!
//! Usage:
//!   regterm encode [FILE] [--pairs] [--compress [--level N]] [-o OUT]
//!
//! Reads JSON, normalizes it and writes the encoded term.

use anyhow::{Context, Result};
use registry_term::codec::EncodeOptions;
use registry_term::json::from_json;
use registry_term::{serialize, MapShape, NormalizeOptions};
use std::io::{self, Write};

use super::input::read_input;
use crate::cli::args::EncodeArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: EncodeArgs) -> Result<i32> {
    let raw = read_input(args.input.as_deref())?;
    let value: serde_json::Value = serde_json::from_slice(&raw).context("invalid JSON input")?;

    let mut normalize_options = NormalizeOptions::default();
    if args.pairs {
        normalize_options = normalize_options.with_maps(MapShape::Pairs);
    }
    let mut encode_options = EncodeOptions::default();
    if args.compress {
        encode_options = encode_options.compressed(args.level);
    }

    let bytes = serialize(&from_json(&value), &normalize_options, &encode_options)
        .context("failed to encode term")?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(SUCCESS)
}
