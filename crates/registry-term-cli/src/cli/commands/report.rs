//! CLI command: regterm report
//!
//! Usage:
//!   regterm report --status N [FILE]

use anyhow::Result;
use registry_term::{decode_and_validate, error_lines};

use super::input::{guard_options, read_input, report_rejection};
use crate::cli::args::ReportArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: ReportArgs) -> Result<i32> {
    let bytes = read_input(args.input.as_deref())?;
    let body = match decode_and_validate(&bytes, &guard_options(&args.guard)) {
        Ok(body) => body,
        Err(e) => return Ok(report_rejection(&e)),
    };

    for line in error_lines(args.status, &body) {
        println!("{}", line);
    }
    Ok(SUCCESS)
}
