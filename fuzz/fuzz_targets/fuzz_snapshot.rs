//! Fuzz target for collector snapshot parsing.
//!
//! Goal: malformed snapshots are a connection error, malformed targets are per-target
//! errors or warnings, and nothing **ever panics**.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_snapshot
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = postureguard_collect::fuzz::parse_snapshot(text);
    }
});
