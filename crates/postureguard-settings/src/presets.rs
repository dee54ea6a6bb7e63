use postureguard_domain::catalog::{Catalogs, LogSpec, MIB};

pub const DEFAULT_WORKERS: usize = 8;

/// Core event logs and their recommended minimum size in bytes.
const CORE_LOGS: &[(&str, u64)] = &[
    ("Security", 512 * MIB),
    ("System", 128 * MIB),
    ("Application", 128 * MIB),
    ("Microsoft-Windows-PowerShell/Operational", 256 * MIB),
];

/// Built-in catalogs.
///
/// Every listed role counts as privileged, including read-only ones such as
/// "Reports Reader".
pub fn builtin_catalogs() -> Catalogs {
    Catalogs {
        privileged_roles: strings(&[
            "Company Administrator",
            "Privileged Role Administrator",
            "Security Administrator",
            "Exchange Administrator",
            "SharePoint Administrator",
            "User Account Administrator",
            "Helpdesk Administrator",
            "Billing Administrator",
            "Conditional Access Administrator",
            "Application Administrator",
            "Compliance Administrator",
            "Reports Reader",
        ]),
        logs: CORE_LOGS
            .iter()
            .map(|&(name, min_size_bytes)| LogSpec {
                name: name.to_string(),
                min_size_bytes,
            })
            .collect(),
        audit_subcategories: strings(&[
            "Credential Validation",
            "Kerberos Authentication Service",
            "User Account Management",
            "Security Group Management",
            "Process Creation",
            "Logon",
            "Logoff",
            "Account Lockout",
            "Special Logon",
            "Audit Policy Change",
            "Authentication Policy Change",
            "Sensitive Privilege Use",
            "Security System Extension",
        ]),
        // Selectors are tenant specific; none are looked up unless configured.
        dkim_selectors: Vec::new(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
