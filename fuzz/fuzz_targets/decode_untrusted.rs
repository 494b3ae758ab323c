#![no_main]

use libfuzzer_sys::fuzz_target;
use registry_term::{decode_and_validate, GuardOptions, TermKind};

fuzz_target!(|data: &[u8]| {
    let options = GuardOptions::default().with_allow_new_atoms(true);
    if let Ok(trusted) = decode_and_validate(data, &options) {
        assert!(TermKind::of(&trusted).is_allowed());
    }
});
