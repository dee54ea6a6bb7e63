//! Fact normalizer: raw collector records to canonical attribute sets.
//!
//! A single record never fails to normalize. Anything that cannot be interpreted in
//! its expected shape is treated as absent and reported as a [`ParseWarning`].
//! Attribute names compare case-insensitively and each logical attribute accepts a
//! short list of aliases, tried in order.

use crate::model::{LogFacts, LogMode, MailRuleFacts, PrincipalFacts, RawFact};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseWarning {
    pub target: String,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.target, self.field, self.message)
    }
}

/// A canonical record plus the non-fatal problems met while building it.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized<T> {
    pub value: T,
    pub warnings: Vec<ParseWarning>,
}

impl<T> Normalized<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }
}

pub fn normalize_mail_rule(fact: &RawFact) -> Normalized<MailRuleFacts> {
    let mut r = FieldReader::new(fact);

    let name = r
        .string("name", &["Name", "RuleName", "DisplayName"])
        .unwrap_or_else(|| {
            r.warn("name", "rule has no name");
            "(unnamed)".to_string()
        });

    let value = MailRuleFacts {
        name,
        enabled: r.flag("enabled", &["Enabled", "IsEnabled"]).unwrap_or(true),
        priority: r.integer("priority", &["Priority"]),
        description: r.string("description", &["Description"]),
        forward_to: r.recipients("forward_to", &["ForwardTo"]),
        forward_as_attachment_to: r
            .recipients("forward_as_attachment_to", &["ForwardAsAttachmentTo"]),
        redirect_to: r.recipients("redirect_to", &["RedirectTo"]),
        from_address_contains: r.list(
            "from_address_contains",
            &["FromAddressContainsWords", "FromAddressContains"],
        ),
        sent_to_contains: r.list(
            "sent_to_contains",
            &["SentTo", "SentToContains", "SentToAddressContainsWords"],
        ),
        subject_contains: r.list(
            "subject_contains",
            &["SubjectContainsWords", "SubjectContains"],
        ),
        body_contains: r.list("body_contains", &["BodyContainsWords", "BodyContains"]),
        delete_message: r
            .flag("delete_message", &["DeleteMessage", "Delete"])
            .unwrap_or(false),
        move_to_folder: r.folder("move_to_folder", &["MoveToFolder"]),
        mark_as_read: r
            .flag("mark_as_read", &["MarkAsRead"])
            .unwrap_or(false),
        stop_processing_rules: r
            .flag("stop_processing_rules", &["StopProcessingRules"])
            .unwrap_or(false),
    };

    r.finish(value)
}

pub fn normalize_principal(fact: &RawFact) -> Normalized<PrincipalFacts> {
    let mut r = FieldReader::new(fact);

    let principal_id = r
        .string(
            "principal_id",
            &["UserPrincipalName", "PrincipalId", "ObjectId", "Id"],
        )
        .unwrap_or_else(|| fact.target.trim().to_string());

    let blocked = match r.flag("blocked", &["BlockCredential", "Blocked", "AccountDisabled"]) {
        Some(blocked) => blocked,
        None => r
            .flag("account_enabled", &["AccountEnabled"])
            .map(|enabled| !enabled)
            .unwrap_or(false),
    };

    let value = PrincipalFacts {
        principal_id,
        display_name: r.string("display_name", &["DisplayName"]),
        mfa_requirement_state: r.first_requirement_state(),
        mfa_methods_registered: r.method_count(),
        blocked,
        is_licensed: r.flag("is_licensed", &["IsLicensed", "Licensed"]),
        last_sync: r.timestamp("last_sync", &["LastDirSyncTime", "LastSync", "LastSyncTime"]),
    };

    r.finish(value)
}

pub fn normalize_log(fact: &RawFact) -> Normalized<LogFacts> {
    let mut r = FieldReader::new(fact);

    let name = r
        .string("log_name", &["LogName", "Name"])
        .unwrap_or_else(|| fact.target.trim().to_string());

    let value = LogFacts {
        name,
        enabled: r.flag("enabled", &["IsEnabled", "Enabled"]),
        max_size_bytes: r.size("max_size_bytes", &["MaximumSizeInBytes", "MaxSizeBytes", "MaxSize"]),
        mode: r
            .string("log_mode", &["LogMode", "Mode", "Retention"])
            .map(|raw| LogMode::parse(&raw))
            .unwrap_or(LogMode::Missing),
    };

    r.finish(value)
}

// --- Recipient resolution ---

/// The shapes a forwarding recipient is known to arrive in.
enum RecipientShape<'a> {
    Bare(&'a str),
    Object(&'a Map<String, Value>),
    Unsupported,
}

impl<'a> RecipientShape<'a> {
    fn of(value: &'a Value) -> Self {
        match value {
            Value::String(s) => RecipientShape::Bare(s),
            Value::Object(map) => RecipientShape::Object(map),
            _ => RecipientShape::Unsupported,
        }
    }
}

type RecipientStrategy = fn(&RecipientShape<'_>) -> Option<String>;

/// Extraction strategies in priority order; the first non-empty result wins.
const RECIPIENT_STRATEGIES: [RecipientStrategy; 3] =
    [bare_address, primary_smtp_address, generic_address];

/// Resolve one recipient entry to an address, or `None` when no strategy applies.
pub fn resolve_recipient(value: &Value) -> Option<String> {
    let shape = RecipientShape::of(value);
    RECIPIENT_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(&shape))
}

fn bare_address(shape: &RecipientShape<'_>) -> Option<String> {
    let RecipientShape::Bare(text) = shape else {
        return None;
    };
    // Exchange renders recipients as `"Display Name" [SMTP:addr]`.
    let text = match text.find("SMTP:").or_else(|| text.find("smtp:")) {
        Some(idx) => text[idx + 5..].trim_end_matches(']'),
        None => text,
    };
    non_empty(text.trim().trim_matches('"'))
}

fn primary_smtp_address(shape: &RecipientShape<'_>) -> Option<String> {
    object_text(shape, "PrimarySmtpAddress")
}

fn generic_address(shape: &RecipientShape<'_>) -> Option<String> {
    object_text(shape, "Address")
}

fn object_text(shape: &RecipientShape<'_>, key: &str) -> Option<String> {
    let RecipientShape::Object(map) = shape else {
        return None;
    };
    map.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .and_then(|(_, v)| v.as_str())
        .and_then(|s| non_empty(s.trim()))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

// --- Field reading ---

struct FieldReader<'a> {
    fact: &'a RawFact,
    warnings: Vec<ParseWarning>,
}

impl<'a> FieldReader<'a> {
    fn new(fact: &'a RawFact) -> Self {
        Self {
            fact,
            warnings: Vec::new(),
        }
    }

    fn finish<T>(self, value: T) -> Normalized<T> {
        Normalized {
            value,
            warnings: self.warnings,
        }
    }

    fn warn(&mut self, field: &str, message: impl Into<String>) {
        self.warnings.push(ParseWarning {
            target: self.fact.target.clone(),
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// First alias present with a non-null value.
    fn lookup(&self, aliases: &[&str]) -> Option<&'a Value> {
        let fact: &'a RawFact = self.fact;
        aliases.iter().find_map(|alias| {
            fact.attributes
                .iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(alias) && !value.is_null())
                .map(|(_, value)| value)
        })
    }

    fn string(&mut self, field: &str, aliases: &[&str]) -> Option<String> {
        match self.lookup(aliases)? {
            Value::String(s) => non_empty(s.trim()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => {
                self.warn(field, format!("expected text, got {}", kind(other)));
                None
            }
        }
    }

    /// Folder paths are text only; a boolean or number is not a destination.
    fn folder(&mut self, field: &str, aliases: &[&str]) -> Option<String> {
        match self.lookup(aliases)? {
            Value::String(s) => non_empty(s.trim()),
            other => {
                self.warn(field, format!("expected a folder path, got {}", kind(other)));
                None
            }
        }
    }

    fn flag(&mut self, field: &str, aliases: &[&str]) -> Option<bool> {
        let value = self.lookup(aliases)?;
        let parsed = match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "$true" | "yes" | "1" => Some(true),
                "false" | "$false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        };
        if parsed.is_none() {
            self.warn(field, format!("expected a boolean, got {}", render(value)));
        }
        parsed
    }

    fn integer(&mut self, field: &str, aliases: &[&str]) -> Option<i64> {
        let value = self.lookup(aliases)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.warn(field, format!("expected an integer, got {}", render(value)));
        }
        parsed
    }

    fn size(&mut self, field: &str, aliases: &[&str]) -> Option<u64> {
        let value = self.lookup(aliases)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.warn(field, format!("expected a byte count, got {}", render(value)));
        }
        parsed
    }

    fn list(&mut self, field: &str, aliases: &[&str]) -> Vec<String> {
        let Some(value) = self.lookup(aliases) else {
            return Vec::new();
        };
        match value {
            Value::Array(items) => {
                let mut out = Vec::new();
                for item in items {
                    match item {
                        Value::String(s) => out.extend(non_empty(s.trim())),
                        Value::Number(n) => out.push(n.to_string()),
                        Value::Null => {}
                        other => self.warn(field, format!("skipped {} entry", kind(other))),
                    }
                }
                out
            }
            Value::String(s) => non_empty(s.trim()).into_iter().collect(),
            other => {
                self.warn(field, format!("expected a list, got {}", kind(other)));
                Vec::new()
            }
        }
    }

    fn recipients(&mut self, field: &str, aliases: &[&str]) -> Vec<String> {
        let Some(value) = self.lookup(aliases) else {
            return Vec::new();
        };
        let entries: Vec<&Value> = match value {
            Value::Array(items) => items.iter().filter(|v| !v.is_null()).collect(),
            single => vec![single],
        };

        let mut out = Vec::new();
        for entry in entries {
            match resolve_recipient(entry) {
                Some(address) => {
                    if !address.contains('@') {
                        self.warn(field, format!("recipient {address} has no domain, treated as internal"));
                    }
                    out.push(address);
                }
                None => self.warn(field, format!("unresolvable recipient {}", render(entry))),
            }
        }
        out
    }

    /// Only the first requirement record is consulted.
    fn first_requirement_state(&mut self) -> Option<String> {
        let records = self.lookup(&["StrongAuthenticationRequirements", "MfaRequirements"]);
        if let Some(records) = records {
            let first = match records {
                Value::Array(items) => items.first(),
                single => Some(single),
            };
            return match first {
                None => None,
                Some(Value::String(s)) => non_empty(s.trim()),
                Some(Value::Object(map)) => map
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case("State"))
                    .and_then(|(_, v)| v.as_str())
                    .and_then(|s| non_empty(s.trim())),
                Some(other) => {
                    self.warn(
                        "mfa_requirement_state",
                        format!("unexpected requirement record {}", kind(other)),
                    );
                    None
                }
            };
        }
        self.string(
            "mfa_requirement_state",
            &["MfaState", "MfaRequirementState", "PerUserMfaState"],
        )
    }

    fn method_count(&mut self) -> usize {
        let Some(value) = self.lookup(&[
            "StrongAuthenticationMethods",
            "MfaMethods",
            "MethodsRegistered",
        ]) else {
            return 0;
        };
        match value {
            Value::Array(items) => items.iter().filter(|v| !v.is_null()).count(),
            Value::Number(n) => n.as_u64().unwrap_or(0) as usize,
            Value::Bool(true) => 1,
            Value::Bool(false) => 0,
            other => {
                self.warn(
                    "mfa_methods",
                    format!("expected a list of methods, got {}", kind(other)),
                );
                0
            }
        }
    }

    fn timestamp(&mut self, field: &str, aliases: &[&str]) -> Option<OffsetDateTime> {
        let raw = self.string(field, aliases)?;
        match OffsetDateTime::parse(&raw, &Rfc3339) {
            Ok(ts) => Some(ts),
            Err(err) => {
                self.warn(field, format!("not an RFC 3339 timestamp ({raw}): {err}"));
                None
            }
        }
    }
}

/// JSON type name of a value, for warning messages.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render(value: &Value) -> String {
    let text = value.to_string();
    if text.len() > 60 {
        format!("{}...", &text[..text.floor_char_boundary(60)])
    } else {
        text
    }
}
