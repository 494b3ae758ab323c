//! Input helpers shared by the commands.

use anyhow::{Context, Result};
use registry_term::{GuardError, GuardOptions};
use std::io::{self, Read};
use std::path::Path;

use crate::cli::args::GuardArgs;

/// Read a whole file, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Environment defaults with command-line overrides applied.
pub fn guard_options(args: &GuardArgs) -> GuardOptions {
    let mut options = GuardOptions::from_env();
    if args.allow_new_atoms {
        options = options.with_allow_new_atoms(true);
    }
    if let Some(depth) = args.max_depth {
        options = options.with_max_depth(depth);
    }
    if args.no_compressed {
        options = options.with_allow_compressed(false);
    }
    options
}

/// Report a rejection on stderr and return its exit code.
pub fn report_rejection(err: &GuardError) -> i32 {
    eprintln!("error: {}", err.user_message());
    eprintln!("  reason: {}", err.reason());
    err.exit_code()
}
