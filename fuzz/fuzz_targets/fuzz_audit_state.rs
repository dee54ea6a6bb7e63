//! Fuzz target for the audit-state text parser.
//!
//! Goal: every input reduces to one of the five settings and **never panics**.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_audit_state
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use postureguard_domain::checks::parse_audit_state;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let setting = parse_audit_state(&text);

    // Reduction ignores ASCII case and surrounding whitespace.
    assert_eq!(setting, parse_audit_state(&text.to_ascii_uppercase()));
    assert_eq!(setting, parse_audit_state(&format!("  {text}\t")));
});
