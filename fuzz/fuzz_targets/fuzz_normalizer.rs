//! Fuzz target for the fact normalizer.
//!
//! Goal: a single record **never fails** to normalize. Malformed fields become
//! warnings, never panics.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_normalizer
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use postureguard_domain::model::RawFact;
use postureguard_domain::normalize::{
    normalize_log, normalize_mail_rule, normalize_principal, resolve_recipient,
};
use postureguard_types::Category;
use serde_json::Value;

#[derive(Arbitrary, Debug)]
struct FactInput {
    target: String,
    /// Attribute name -> JSON text of the value.
    attributes: Vec<(String, String)>,
}

fuzz_target!(|input: FactInput| {
    if input.attributes.len() > 64 {
        return;
    }

    let mut fact = RawFact::new(Category::MailRule, input.target);
    for (key, text) in input.attributes {
        let value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        let _ = resolve_recipient(&value);
        fact.attributes.insert(key, value);
    }

    let _ = normalize_mail_rule(&fact);
    let _ = normalize_principal(&fact);
    let _ = normalize_log(&fact);
});
