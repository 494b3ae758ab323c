//! CLI command: regterm decode
//!
//! Usage:
//!   regterm decode [FILE] [--json] [--allow-new-atoms] [--max-depth N]

use anyhow::Result;
use registry_term::decode_and_validate;
use registry_term::json::to_json;

use super::input::{guard_options, read_input, report_rejection};
use crate::cli::args::DecodeArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: DecodeArgs) -> Result<i32> {
    let bytes = read_input(args.input.as_deref())?;
    let options = guard_options(&args.guard);

    let trusted = match decode_and_validate(&bytes, &options) {
        Ok(trusted) => trusted,
        Err(e) => return Ok(report_rejection(&e)),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&trusted))?);
    } else {
        println!("{}", trusted.as_term());
    }
    Ok(SUCCESS)
}
