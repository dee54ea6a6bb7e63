//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to fix findings.
    pub remediation: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    let (title, description, remediation) = match identifier {
        // Check IDs
        ids::CHECK_MAIL_INBOX_RULES => (
            "Mailbox Rule Abuse",
            "\
Inspects every inbox rule of a mailbox for forwarding, redirect, and stealth actions.
Forwarding to a domain other than the mailbox's own is High; internal forwarding is
Medium. Deleting, moving, or marking messages as read hides activity from the owner and
raises an otherwise informational rule to Medium. Rules with no side effects are not
reported.",
            "\
Review each reported rule with the mailbox owner. Remove forwarding to external
recipients unless it is documented and approved, and block automatic external
forwarding at the transport layer.",
        ),
        ids::CHECK_IDENTITY_ADMIN_MFA => (
            "Privileged Account MFA Posture",
            "\
Maps every principal to the privileged roles it holds (from a fixed role catalog) and
resolves its MFA state. Admins without MFA are High, admins with MFA are Medium, and
non-admins are Info. Blocked accounts are annotated but keep their severity.",
            "\
Enforce MFA for every member of a privileged role, preferably through a conditional
access policy rather than per-user enablement.",
        ),
        ids::CHECK_HOST_EVENT_LOGS => (
            "Core Event Log Posture",
            "\
Checks that each core event log is enabled, sized at or above its recommended minimum,
and configured with a retention mode that does not silently overwrite events.",
            "\
Enable the log, raise its maximum size to the recommended minimum, and switch to
AutoBackup (archive when full) or forward events to a central collector.",
        ),
        ids::CHECK_HOST_AUDIT_POLICY => (
            "Advanced Audit Policy",
            "\
Reads the effective audit setting of each subcategory in the catalog. No auditing is
Fail, success-only is Warn, success and failure is Pass. Output that cannot be parsed is
Warn, never fatal.",
            "\
Configure the subcategory for Success and Failure through group policy
(Advanced Audit Policy Configuration).",
        ),

        ids::CHECK_DOMAIN_SPF => (
            "SPF Policy",
            "\
Reads the TXT records at the domain apex and evaluates the SPF record's terminal `all`
mechanism. A missing record or a permissive `+all`/`?all` is High, soft fail `~all` or
no `all` at all is Medium, and hard fail `-all` or a `redirect=` delegation is Info.",
            "\
Publish exactly one SPF record that lists every legitimate sender and ends in `-all`.",
        ),
        ids::CHECK_DOMAIN_DMARC => (
            "DMARC Policy",
            "\
Reads the TXT record at `_dmarc.<domain>` and evaluates its `p=` policy. A missing record
or unrecognized policy is High, `p=none` is Medium, and `quarantine` or `reject` is Info.
A `pct=` below 100 raises an enforcing policy to Medium. A missing `rua=` is noted.",
            "\
Move from `p=none` to `quarantine` and then `reject` once aggregate reports show all
legitimate mail passing, and collect reports with `rua=`.",
        ),
        ids::CHECK_DOMAIN_DKIM => (
            "DKIM Selectors",
            "\
Looks up `<selector>._domainkey.<domain>` for every configured selector and expects a
`v=DKIM1` key record. A selector without a key record is Medium.",
            "\
Publish the signing key for each selector your mail platforms sign with, or remove the
selector from the catalog if it is retired.",
        ),

        // Codes
        ids::CODE_EXTERNAL_FORWARD => (
            "External Forwarding",
            "A rule forwards or redirects mail to a recipient outside the mailbox's domain.",
            "Remove the forwarding action or confirm the recipient is an approved partner.",
        ),
        ids::CODE_INTERNAL_FORWARD => (
            "Internal Forwarding",
            "A rule forwards or redirects mail to a recipient inside the mailbox's domain.",
            "Confirm the forwarding is expected; prefer delegation or shared mailboxes.",
        ),
        ids::CODE_STEALTH_RULE => (
            "Stealth Rule",
            "A rule deletes, moves, or marks messages as read without forwarding them.",
            "Confirm the owner created the rule; attackers use such rules to hide replies.",
        ),
        ids::CODE_ADMIN_WITHOUT_MFA => (
            "Admin Without MFA",
            "A principal holding a privileged role has no MFA requirement and no registered methods.",
            "Require MFA for the account before it next signs in.",
        ),
        ids::CODE_ADMIN_WITH_MFA => (
            "Admin With MFA",
            "A privileged principal with MFA. Still reported because the account is privileged.",
            "Keep role membership minimal and review it periodically.",
        ),
        ids::CODE_NON_ADMIN_WITHOUT_MFA => (
            "Non-Admin Without MFA",
            "A principal without privileged roles and without MFA.",
            "Roll out MFA to all users.",
        ),
        ids::CODE_NON_ADMIN_WITH_MFA => (
            "Non-Admin With MFA",
            "A principal without privileged roles that has MFA.",
            "No action required.",
        ),
        ids::CODE_LOG_DISABLED => (
            "Event Log Disabled",
            "The event log is disabled, so no events are recorded.",
            "Enable the log.",
        ),
        ids::CODE_LOG_ENABLED => (
            "Event Log Enabled",
            "The event log is enabled.",
            "No action required.",
        ),
        ids::CODE_LOG_METADATA_MISSING => (
            "Event Log Metadata Missing",
            "The collector returned no usable metadata for this log.",
            "Confirm the log exists on the host and that the collector can read it.",
        ),
        ids::CODE_LOG_SIZE_BELOW_MINIMUM => (
            "Event Log Too Small",
            "The maximum size is below the recommended minimum for this log.",
            "Raise the maximum log size to at least the recommended value.",
        ),
        ids::CODE_LOG_SIZE_OK => (
            "Event Log Size OK",
            "The maximum size meets the recommended minimum.",
            "No action required.",
        ),
        ids::CODE_LOG_SIZE_UNKNOWN => (
            "Event Log Size Unknown",
            "The maximum size could not be read from the collected metadata.",
            "Re-run collection or check the log size manually.",
        ),
        ids::CODE_LOG_MODE_CIRCULAR => (
            "Circular Retention",
            "Events will be overwritten when the log is full.",
            "Switch to AutoBackup or forward events to a central collector.",
        ),
        ids::CODE_LOG_MODE_AUTO_BACKUP => (
            "Archive Retention",
            "The log is archived when full and a new one is started.",
            "Monitor disk usage of the archive directory.",
        ),
        ids::CODE_LOG_MODE_RETAIN => (
            "Retain Mode",
            "Events are never overwritten; the log stops recording when full.",
            "Monitor log growth or events will stop being recorded.",
        ),
        ids::CODE_LOG_MODE_UNKNOWN => (
            "Unknown Retention Mode",
            "The retention mode is missing or not recognized.",
            "Inspect the log configuration on the host.",
        ),
        ids::CODE_NO_AUDITING => (
            "No Auditing",
            "The subcategory records neither success nor failure events.",
            "Enable Success and Failure auditing for the subcategory.",
        ),
        ids::CODE_SUCCESS_ONLY => (
            "Success Only",
            "Only successful events are audited.",
            "Consider enabling Failure auditing as well.",
        ),
        ids::CODE_FAILURE_ONLY => (
            "Failure Only",
            "Only failed events are audited.",
            "Consider enabling Success auditing as well.",
        ),
        ids::CODE_SUCCESS_AND_FAILURE => (
            "Success and Failure",
            "Both successful and failed events are audited.",
            "No action required.",
        ),
        ids::CODE_UNPARSED_STATE => (
            "Unparsed Audit State",
            "The audit setting text could not be interpreted.",
            "Check the subcategory manually with the audit policy tool.",
        ),
        ids::CODE_AUDIT_TOOL_UNAVAILABLE => (
            "Audit Policy Tool Unavailable",
            "The audit policy could not be queried; subcategory checks were skipped.",
            "Run collection with rights to query the audit policy.",
        ),
        ids::CODE_SPF_MISSING => (
            "SPF Missing",
            "The domain publishes no SPF record, so any host can send as it.",
            "Publish an SPF record ending in `-all`.",
        ),
        ids::CODE_SPF_MULTIPLE_RECORDS => (
            "Multiple SPF Records",
            "More than one SPF record is published; receivers treat this as a permanent error.",
            "Merge the records into a single SPF record.",
        ),
        ids::CODE_SPF_HARD_FAIL => (
            "SPF Hard Fail",
            "The SPF record ends in `-all`; unlisted senders fail.",
            "No action required.",
        ),
        ids::CODE_SPF_SOFT_FAIL => (
            "SPF Soft Fail",
            "The SPF record ends in `~all`; unlisted senders are only marked suspicious.",
            "Switch to `-all` once every legitimate sender is listed.",
        ),
        ids::CODE_SPF_PERMISSIVE => (
            "Permissive SPF",
            "The SPF record ends in `+all` or `?all`, which authorizes or ignores any sender.",
            "Replace the qualifier with `-all`.",
        ),
        ids::CODE_SPF_REDIRECT => (
            "SPF Redirect",
            "The SPF record delegates evaluation to another domain with `redirect=`.",
            "Review the target domain's SPF record.",
        ),
        ids::CODE_SPF_NO_ALL => (
            "SPF Without All",
            "The SPF record has no `all` mechanism, so unmatched senders get a neutral result.",
            "End the record with `-all`.",
        ),
        ids::CODE_DMARC_MISSING => (
            "DMARC Missing",
            "No DMARC record is published at `_dmarc.<domain>`.",
            "Publish a DMARC record, starting with `p=none` and an `rua=` address.",
        ),
        ids::CODE_DMARC_MULTIPLE_RECORDS => (
            "Multiple DMARC Records",
            "More than one DMARC record is published; receivers ignore DMARC for the domain.",
            "Keep a single DMARC record.",
        ),
        ids::CODE_DMARC_REJECT => (
            "DMARC Reject",
            "Mail failing DMARC is rejected.",
            "No action required.",
        ),
        ids::CODE_DMARC_QUARANTINE => (
            "DMARC Quarantine",
            "Mail failing DMARC is delivered to spam or quarantine.",
            "Consider moving to `p=reject`.",
        ),
        ids::CODE_DMARC_MONITOR_ONLY => (
            "DMARC Monitor Only",
            "The policy is `p=none`; failing mail is delivered normally.",
            "Move to `p=quarantine` or `p=reject`.",
        ),
        ids::CODE_DMARC_POLICY_UNKNOWN => (
            "DMARC Policy Unknown",
            "The DMARC record has no `p=` tag or an unrecognized value.",
            "Set `p=` to `none`, `quarantine`, or `reject`.",
        ),
        ids::CODE_DMARC_PARTIAL_PCT => (
            "DMARC Partial Enforcement",
            "The enforcing policy applies to less than 100% of failing mail.",
            "Raise `pct=` to 100 or remove the tag.",
        ),
        ids::CODE_DKIM_PRESENT => (
            "DKIM Key Published",
            "A DKIM key record is published for the selector.",
            "No action required.",
        ),
        ids::CODE_DKIM_MISSING => (
            "DKIM Key Missing",
            "No DKIM key record was found for the selector.",
            "Publish the selector's public key or retire the selector.",
        ),

        _ => return None,
    };

    Some(Explanation {
        title,
        description,
        remediation,
    })
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_MAIL_INBOX_RULES,
        ids::CHECK_IDENTITY_ADMIN_MFA,
        ids::CHECK_HOST_EVENT_LOGS,
        ids::CHECK_HOST_AUDIT_POLICY,
        ids::CHECK_DOMAIN_SPF,
        ids::CHECK_DOMAIN_DMARC,
        ids::CHECK_DOMAIN_DKIM,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_EXTERNAL_FORWARD,
        ids::CODE_INTERNAL_FORWARD,
        ids::CODE_STEALTH_RULE,
        ids::CODE_ADMIN_WITHOUT_MFA,
        ids::CODE_ADMIN_WITH_MFA,
        ids::CODE_NON_ADMIN_WITHOUT_MFA,
        ids::CODE_NON_ADMIN_WITH_MFA,
        ids::CODE_LOG_DISABLED,
        ids::CODE_LOG_ENABLED,
        ids::CODE_LOG_METADATA_MISSING,
        ids::CODE_LOG_SIZE_BELOW_MINIMUM,
        ids::CODE_LOG_SIZE_OK,
        ids::CODE_LOG_SIZE_UNKNOWN,
        ids::CODE_LOG_MODE_CIRCULAR,
        ids::CODE_LOG_MODE_AUTO_BACKUP,
        ids::CODE_LOG_MODE_RETAIN,
        ids::CODE_LOG_MODE_UNKNOWN,
        ids::CODE_NO_AUDITING,
        ids::CODE_SUCCESS_ONLY,
        ids::CODE_FAILURE_ONLY,
        ids::CODE_SUCCESS_AND_FAILURE,
        ids::CODE_UNPARSED_STATE,
        ids::CODE_AUDIT_TOOL_UNAVAILABLE,
        ids::CODE_SPF_MISSING,
        ids::CODE_SPF_MULTIPLE_RECORDS,
        ids::CODE_SPF_HARD_FAIL,
        ids::CODE_SPF_SOFT_FAIL,
        ids::CODE_SPF_PERMISSIVE,
        ids::CODE_SPF_REDIRECT,
        ids::CODE_SPF_NO_ALL,
        ids::CODE_DMARC_MISSING,
        ids::CODE_DMARC_MULTIPLE_RECORDS,
        ids::CODE_DMARC_REJECT,
        ids::CODE_DMARC_QUARANTINE,
        ids::CODE_DMARC_MONITOR_ONLY,
        ids::CODE_DMARC_POLICY_UNKNOWN,
        ids::CODE_DMARC_PARTIAL_PCT,
        ids::CODE_DKIM_PRESENT,
        ids::CODE_DKIM_MISSING,
    ]
}
