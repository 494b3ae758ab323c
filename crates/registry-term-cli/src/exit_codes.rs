//! Exit codes for `regterm`.
//! Rejected registry data exits with `GuardError::exit_code()`.

pub const SUCCESS: i32 = 0;
pub const INTERNAL_ERROR: i32 = 2; // I/O failure, bad JSON, or a term the encoder cannot carry
