#![no_main]

use libfuzzer_sys::fuzz_target;
use registry_term::codec::EncodeOptions;
use registry_term::{
    decode_and_validate, normalize, serialize, GuardOptions, NormalizeOptions, Term,
};

// Anything that passes the guard must normalize idempotently and re-encode.
fuzz_target!(|data: &[u8]| {
    let options = GuardOptions::default().with_allow_new_atoms(true);
    let Ok(trusted) = decode_and_validate(data, &options) else {
        return;
    };
    let term: Term = trusted.into_inner();
    let normalized = normalize(&term, &NormalizeOptions::default());
    assert_eq!(normalize(&normalized, &NormalizeOptions::default()), normalized);
    assert!(serialize(&term, &NormalizeOptions::default(), &EncodeOptions::default()).is_ok());
});
