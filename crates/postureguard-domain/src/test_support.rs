use crate::catalog::{Catalogs, LogSpec};
use crate::model::{
    AuditPolicyFacts, HostFacts, LogFacts, LogMode, MailRuleFacts, MailboxFacts, PrincipalFacts,
    RawFact,
};
use crate::normalize::normalize_mail_rule;
use crate::policy::EffectiveConfig;
use postureguard_types::Category;
use serde_json::Value;
use std::collections::BTreeMap;

pub fn catalogs() -> Catalogs {
    Catalogs {
        privileged_roles: vec![
            "Company Administrator".to_string(),
            "Exchange Administrator".to_string(),
            "Reports Reader".to_string(),
        ],
        logs: vec![
            LogSpec::new("Security", 512).expect("spec"),
            LogSpec::new("System", 128).expect("spec"),
        ],
        audit_subcategories: vec!["Logon".to_string(), "Process Creation".to_string()],
        dkim_selectors: vec!["selector1".to_string()],
    }
}

pub fn config() -> EffectiveConfig {
    EffectiveConfig {
        include_all_principals: false,
        catalogs: catalogs(),
        checks: EffectiveConfig::all_checks(),
    }
}

pub fn config_include_all() -> EffectiveConfig {
    EffectiveConfig {
        include_all_principals: true,
        ..config()
    }
}

pub fn mail_rule(attrs: Value) -> MailRuleFacts {
    let Value::Object(map) = attrs else {
        panic!("rule attributes must be an object");
    };
    let fact = RawFact {
        category: Category::MailRule,
        target: "test".to_string(),
        attributes: map.into_iter().collect(),
    };
    normalize_mail_rule(&fact).value
}

pub fn mailbox(address: &str, rules: Vec<MailRuleFacts>) -> MailboxFacts {
    MailboxFacts {
        mailbox: address.to_string(),
        rules,
    }
}

pub fn principal(id: &str, mfa_state: Option<&str>, methods: usize) -> PrincipalFacts {
    PrincipalFacts {
        principal_id: id.to_string(),
        display_name: Some(format!("{id} (display)")),
        mfa_requirement_state: mfa_state.map(str::to_string),
        mfa_methods_registered: methods,
        ..PrincipalFacts::default()
    }
}

/// Role name -> member principal ids.
pub fn memberships(roles: Vec<(&str, Vec<&str>)>) -> BTreeMap<String, Vec<String>> {
    roles
        .into_iter()
        .map(|(role, members)| {
            (
                role.to_string(),
                members.into_iter().map(str::to_string).collect(),
            )
        })
        .collect()
}

pub fn log(name: &str, enabled: Option<bool>, size_mb: Option<u64>, mode: LogMode) -> LogFacts {
    LogFacts {
        name: name.to_string(),
        enabled,
        max_size_bytes: size_mb.map(|mb| mb * crate::catalog::MIB),
        mode,
    }
}

pub fn host(name: &str, logs: Vec<LogFacts>, audit_policy: AuditPolicyFacts) -> HostFacts {
    HostFacts {
        host: name.to_string(),
        logs: logs.into_iter().map(|l| (l.name.clone(), l)).collect(),
        audit_policy,
    }
}

pub fn audit_states(states: &[(&str, &str)]) -> AuditPolicyFacts {
    AuditPolicyFacts::Available(
        states
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    )
}
