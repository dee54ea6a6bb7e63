//! Reader for the JSON snapshot a collector exports.
//!
//! Only the top-level layout is typed. Each per-target payload stays a
//! [`serde_json::Value`] until that target is read, so a malformed record costs
//! one target (or one entry, with a warning) and never the whole snapshot.

use crate::source::{DirectorySource, HostAuditSource, MailDomainSource, MailSource};
use camino::Utf8Path;
use postureguard_domain::model::RawFact;
use postureguard_domain::normalize::{Normalized, ParseWarning, kind};
use postureguard_types::{Category, PostureError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Deserialize)]
struct Snapshot {
    #[serde(default)]
    mailboxes: Map<String, Value>,
    #[serde(default)]
    directory: SnapshotDirectory,
    #[serde(default)]
    hosts: Map<String, Value>,
    #[serde(default)]
    mail_domains: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct SnapshotDirectory {
    #[serde(default)]
    roles: Map<String, Value>,
    #[serde(default)]
    principals: Vec<Value>,
}

/// Fact source backed by a snapshot file. Sections that are absent are empty.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    /// An unreadable snapshot, or one whose top-level layout is wrong, is a
    /// connection failure: nothing can be collected.
    pub fn load(path: &Utf8Path) -> Result<Self, PostureError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PostureError::Connection(format!("read snapshot {path}: {e}")))?;
        let source = Self::from_json_str(&text)
            .map_err(|e| PostureError::Connection(format!("{path}: {e}")))?;
        tracing::debug!(
            %path,
            mailboxes = source.snapshot.mailboxes.len(),
            principals = source.snapshot.directory.principals.len(),
            hosts = source.snapshot.hosts.len(),
            mail_domains = source.snapshot.mail_domains.len(),
            "loaded snapshot"
        );
        Ok(source)
    }

    pub fn from_json_str(text: &str) -> Result<Self, PostureError> {
        let snapshot: Snapshot = serde_json::from_str(text)
            .map_err(|e| PostureError::Connection(format!("invalid snapshot: {e}")))?;
        Ok(Self { snapshot })
    }

    fn host(&self, host: &str) -> Result<&Map<String, Value>, PostureError> {
        let payload = find_ci(&self.snapshot.hosts, host)
            .ok_or_else(|| PostureError::target_fetch(host, "host not in snapshot"))?;
        check_failure(host, payload)?;
        payload.as_object().ok_or_else(|| {
            PostureError::target_fetch(host, format!("expected an object, got {}", kind(payload)))
        })
    }
}

/// The error a collector recorded in place of a payload: an object with an `error` key.
fn recorded_error(value: &Value) -> Option<String> {
    let error = value.as_object()?.get("error")?;
    Some(match error {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn check_failure(target: &str, value: &Value) -> Result<(), PostureError> {
    match recorded_error(value) {
        Some(error) => Err(PostureError::target_fetch(target, error)),
        None => Ok(()),
    }
}

fn warning(target: &str, field: impl Into<String>, message: impl Into<String>) -> ParseWarning {
    ParseWarning {
        target: target.to_string(),
        field: field.into(),
        message: message.into(),
    }
}

fn raw_fact(category: Category, target: &str, attributes: &Map<String, Value>) -> RawFact {
    RawFact {
        category,
        target: target.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    }
}

/// Case-insensitive key lookup, as collectors differ in capitalization. An exact
/// match wins.
fn find_ci<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

fn principal_target(attributes: &Map<String, Value>, index: usize) -> String {
    ["UserPrincipalName", "PrincipalId", "ObjectId", "Id"]
        .iter()
        .find_map(|alias| {
            find_ci(attributes, alias)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        })
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| format!("principal[{index}]"))
}

impl MailSource for SnapshotSource {
    fn mailboxes(&self) -> Result<Vec<String>, PostureError> {
        Ok(self.snapshot.mailboxes.keys().cloned().collect())
    }

    fn mail_rules(&self, mailbox: &str) -> Result<Normalized<Vec<RawFact>>, PostureError> {
        let payload = find_ci(&self.snapshot.mailboxes, mailbox)
            .ok_or_else(|| PostureError::target_fetch(mailbox, "mailbox not in snapshot"))?;
        check_failure(mailbox, payload)?;
        let Value::Array(entries) = payload else {
            return Err(PostureError::target_fetch(
                mailbox,
                format!("expected a list of rules, got {}", kind(payload)),
            ));
        };

        let mut out = Normalized::clean(Vec::with_capacity(entries.len()));
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Value::Object(attrs) => out.value.push(raw_fact(Category::MailRule, mailbox, attrs)),
                other => out.warnings.push(warning(
                    mailbox,
                    format!("rules[{i}]"),
                    format!("skipped {} entry, expected an object", kind(other)),
                )),
            }
        }
        Ok(out)
    }
}

impl DirectorySource for SnapshotSource {
    fn role_members(&self, role: &str) -> Result<Normalized<Vec<String>>, PostureError> {
        // A role nobody holds is simply absent from the export.
        let Some(payload) = find_ci(&self.snapshot.directory.roles, role) else {
            return Ok(Normalized::clean(Vec::new()));
        };
        check_failure(role, payload)?;
        let Value::Array(entries) = payload else {
            return Err(PostureError::target_fetch(
                role,
                format!("expected a list of members, got {}", kind(payload)),
            ));
        };

        let mut out = Normalized::clean(Vec::with_capacity(entries.len()));
        for (i, entry) in entries.iter().enumerate() {
            match entry.as_str().map(str::trim) {
                Some(member) if !member.is_empty() => out.value.push(member.to_string()),
                _ => out.warnings.push(warning(
                    role,
                    format!("members[{i}]"),
                    format!("skipped {} member", kind(entry)),
                )),
            }
        }
        Ok(out)
    }

    fn principals(&self) -> Result<Normalized<Vec<RawFact>>, PostureError> {
        let entries = &self.snapshot.directory.principals;
        let mut out = Normalized::clean(Vec::with_capacity(entries.len()));
        for (i, entry) in entries.iter().enumerate() {
            match entry {
                Value::Object(attrs) => out.value.push(raw_fact(
                    Category::Identity,
                    &principal_target(attrs, i),
                    attrs,
                )),
                other => out.warnings.push(warning(
                    &format!("principal[{i}]"),
                    "principal",
                    format!("skipped {} entry, expected an object", kind(other)),
                )),
            }
        }
        Ok(out)
    }
}

impl HostAuditSource for SnapshotSource {
    fn hosts(&self) -> Result<Vec<String>, PostureError> {
        Ok(self.snapshot.hosts.keys().cloned().collect())
    }

    fn log_metadata(
        &self,
        host: &str,
        log: &str,
    ) -> Result<Normalized<Option<RawFact>>, PostureError> {
        let logs = match find_ci(self.host(host)?, "logs") {
            None | Some(Value::Null) => return Ok(Normalized::clean(None)),
            Some(Value::Object(logs)) => logs,
            Some(other) => {
                return Err(PostureError::target_fetch(
                    host,
                    format!("logs: expected an object, got {}", kind(other)),
                ));
            }
        };

        Ok(match find_ci(logs, log) {
            None | Some(Value::Null) => Normalized::clean(None),
            Some(Value::Object(attrs)) => {
                Normalized::clean(Some(raw_fact(Category::HostAudit, log, attrs)))
            }
            Some(other) => Normalized {
                value: None,
                warnings: vec![warning(
                    host,
                    format!("logs.{log}"),
                    format!("expected an object, got {}", kind(other)),
                )],
            },
        })
    }

    fn audit_policy(&self, host: &str) -> Result<Normalized<BTreeMap<String, String>>, PostureError> {
        let payload = match find_ci(self.host(host)?, "audit_policy") {
            None | Some(Value::Null) => {
                return Err(PostureError::target_fetch(host, "no audit policy output collected"));
            }
            Some(payload) => payload,
        };
        check_failure(host, payload)?;
        let Value::Object(states) = payload else {
            return Err(PostureError::target_fetch(
                host,
                format!("audit_policy: expected an object, got {}", kind(payload)),
            ));
        };

        let mut out = Normalized::clean(BTreeMap::new());
        for (subcategory, state) in states {
            let text = match state {
                Value::String(s) => s.clone(),
                other => {
                    out.warnings.push(warning(
                        host,
                        format!("audit_policy.{subcategory}"),
                        format!("expected state text, got {}", kind(other)),
                    ));
                    String::new()
                }
            };
            out.value.insert(subcategory.clone(), text);
        }
        Ok(out)
    }
}

impl MailDomainSource for SnapshotSource {
    fn domains(&self) -> Result<Vec<String>, PostureError> {
        Ok(self.snapshot.mail_domains.keys().cloned().collect())
    }

    fn txt_records(&self, domain: &str, name: &str) -> Result<Normalized<Vec<String>>, PostureError> {
        let payload = find_ci(&self.snapshot.mail_domains, domain)
            .ok_or_else(|| PostureError::target_fetch(domain, "domain not in snapshot"))?;
        check_failure(domain, payload)?;
        let Value::Object(names) = payload else {
            return Err(PostureError::target_fetch(
                domain,
                format!("expected an object of lookup names, got {}", kind(payload)),
            ));
        };

        let entries = match find_ci(names, name) {
            // The name does not exist.
            None | Some(Value::Null) => return Ok(Normalized::clean(Vec::new())),
            Some(Value::String(record)) => return Ok(Normalized::clean(vec![record.clone()])),
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                if let Some(error) = recorded_error(other) {
                    return Err(PostureError::target_fetch(domain, format!("{name}: {error}")));
                }
                return Err(PostureError::target_fetch(
                    domain,
                    format!("{name}: expected TXT records, got {}", kind(other)),
                ));
            }
        };

        let mut out = Normalized::clean(Vec::with_capacity(entries.len()));
        for (i, entry) in entries.iter().enumerate() {
            match txt_record(entry) {
                Some(record) => out.value.push(record),
                None => out.warnings.push(warning(
                    domain,
                    format!("{name}[{i}]"),
                    format!("skipped {} TXT entry", kind(entry)),
                )),
            }
        }
        Ok(out)
    }
}

/// A TXT record is one string, or a list of character-strings joined without separator.
fn txt_record(entry: &Value) -> Option<String> {
    match entry {
        Value::String(record) => Some(record.clone()),
        Value::Array(chunks) => chunks
            .iter()
            .map(|chunk| chunk.as_str())
            .collect::<Option<Vec<&str>>>()
            .map(|chunks| chunks.concat()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    const SNAPSHOT: &str = r#"{
      "mailboxes": {
        "alice@corp.com": [ { "Name": "fwd", "RedirectTo": ["bob@evil.com"] }, null, 7 ],
        "broken@corp.com": { "error": "mailbox not found" },
        "garbage@corp.com": ["garbage"],
        "odd@corp.com": { "Name": "not a list" }
      },
      "directory": {
        "roles": {
          "Company Administrator": ["svc-admin", 42, " "],
          "Reports Reader": { "error": "access denied" },
          "Helpdesk Administrator": "ann"
        },
        "principals": [
          { "UserPrincipalName": "svc-admin", "DisplayName": "Service Admin" },
          null,
          { "DisplayName": "No Id" }
        ]
      },
      "hosts": {
        "WS01": {
          "logs": {
            "Security": { "IsEnabled": true, "MaximumSizeInBytes": 268435456, "LogMode": "Circular" },
            "System": "enabled"
          },
          "audit_policy": { "Process Creation": "Success and Failure", "Logon": null }
        },
        "WS02": { "logs": {}, "audit_policy": { "error": "auditpol.exe not found" } },
        "WS03": { "error": "host unreachable" },
        "WS04": ["not", "a", "host"],
        "WS05": { "logs": [], "audit_policy": "Success" }
      },
      "mail_domains": {
        "corp.com": {
          "corp.com": ["v=spf1 -all", ["v=DKIM1; ", "p=abc"], 3],
          "_dmarc.corp.com": "v=DMARC1; p=none",
          "selector1._domainkey.corp.com": { "error": "SERVFAIL" }
        },
        "down.com": { "error": "resolver timeout" }
      }
    }"#;

    fn source() -> SnapshotSource {
        SnapshotSource::from_json_str(SNAPSHOT).expect("snapshot")
    }

    #[test]
    fn per_target_errors_are_fetch_errors() {
        let s = source();
        assert_eq!(
            s.mailboxes().expect("list"),
            vec!["alice@corp.com", "broken@corp.com", "garbage@corp.com", "odd@corp.com"]
        );
        let err = s.mail_rules("broken@corp.com").expect_err("fetch error");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("mailbox not found"));

        assert!(s.role_members("Reports Reader").is_err());
        assert!(s.role_members("Billing Administrator").expect("absent").value.is_empty());
    }

    #[test]
    fn malformed_rule_entries_are_dropped_with_warnings() {
        let rules = source().mail_rules("alice@corp.com").expect("rules");
        assert_eq!(rules.value.len(), 1);
        assert_eq!(rules.value[0].target, "alice@corp.com");
        let fields: Vec<&str> = rules.warnings.iter().map(|w| w.field.as_str()).collect();
        assert_eq!(fields, vec!["rules[1]", "rules[2]"]);
        assert!(rules.warnings[0].message.contains("null"));
    }

    #[test]
    fn wrong_payload_shape_costs_only_that_target() {
        let s = source();
        let err = s.mail_rules("odd@corp.com").expect_err("not a list");
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("expected a list of rules, got object"));

        // An array is never a recorded failure.
        let garbage = s.mail_rules("garbage@corp.com").expect("array payload");
        assert!(garbage.value.is_empty());
        assert_eq!(garbage.warnings.len(), 1);
        assert!(garbage.warnings[0].message.contains("string"));

        assert!(s.role_members("Helpdesk Administrator").is_err());
        assert!(s.log_metadata("WS04", "Security").is_err());
        assert!(s.log_metadata("WS05", "Security").is_err());
        assert!(s.audit_policy("WS05").is_err());
    }

    #[test]
    fn non_text_role_members_are_dropped() {
        let members = source().role_members("Company Administrator").expect("members");
        assert_eq!(members.value, vec!["svc-admin"]);
        assert_eq!(members.warnings.len(), 2);
        assert_eq!(members.warnings[0].target, "Company Administrator");
    }

    #[test]
    fn principals_fall_back_to_positional_target() {
        let principals = source().principals().expect("principals");
        let targets: Vec<&str> = principals.value.iter().map(|f| f.target.as_str()).collect();
        assert_eq!(targets, vec!["svc-admin", "principal[2]"]);
        assert_eq!(principals.warnings.len(), 1);
        assert_eq!(principals.warnings[0].target, "principal[1]");
    }

    #[test]
    fn host_audit_policy_failures_are_per_host() {
        let s = source();
        let log = s.log_metadata("WS01", "security").expect("log");
        let log = log.value.expect("present");
        assert_eq!(log.attributes["LogMode"], "Circular");
        assert!(s.log_metadata("WS01", "Application").expect("ok").value.is_none());

        let system = s.log_metadata("WS01", "System").expect("ok");
        assert!(system.value.is_none());
        assert_eq!(system.warnings[0].field, "logs.System");

        assert!(s.audit_policy("WS02").is_err());
        assert!(s.log_metadata("WS03", "Security").is_err());
    }

    #[test]
    fn non_text_audit_state_is_kept_empty_with_warning() {
        let states = source().audit_policy("WS01").expect("states");
        assert_eq!(states.value.len(), 2);
        assert_eq!(states.value["Logon"], "");
        assert_eq!(states.value["Process Creation"], "Success and Failure");
        assert_eq!(states.warnings.len(), 1);
        assert_eq!(states.warnings[0].field, "audit_policy.Logon");
    }

    #[test]
    fn txt_records_accept_strings_and_chunk_lists() {
        let s = source();
        assert_eq!(s.domains().expect("list"), vec!["corp.com", "down.com"]);

        let apex = s.txt_records("corp.com", "corp.com").expect("apex");
        assert_eq!(apex.value, vec!["v=spf1 -all", "v=DKIM1; p=abc"]);
        assert_eq!(apex.warnings.len(), 1);

        let dmarc = s.txt_records("CORP.com", "_dmarc.corp.com").expect("dmarc");
        assert_eq!(dmarc.value, vec!["v=DMARC1; p=none"]);

        assert!(s.txt_records("corp.com", "nope._domainkey.corp.com").expect("nx").value.is_empty());

        let servfail = s
            .txt_records("corp.com", "selector1._domainkey.corp.com")
            .expect_err("lookup failure");
        assert!(servfail.to_string().contains("SERVFAIL"));
        assert!(s.txt_records("down.com", "down.com").is_err());
    }

    #[test]
    fn unreadable_snapshot_is_a_connection_error() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");

        let missing = SnapshotSource::load(&root.join("missing.json")).expect_err("missing");
        assert!(missing.is_fatal());

        let bad = root.join("bad.json");
        std::fs::write(&bad, "{ not json").expect("write");
        assert!(SnapshotSource::load(&bad).expect_err("malformed").is_fatal());

        let wrong_layout = SnapshotSource::from_json_str(r#"{ "mailboxes": [] }"#);
        assert!(wrong_layout.expect_err("layout").is_fatal());
    }

    #[test]
    fn absent_sections_are_empty() {
        let s = SnapshotSource::from_json_str("{}").expect("empty snapshot");
        assert!(s.mailboxes().expect("list").is_empty());
        assert!(s.principals().expect("list").value.is_empty());
        assert!(s.hosts().expect("list").is_empty());
        assert!(s.domains().expect("list").is_empty());
    }
}
