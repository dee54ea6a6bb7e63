//! Developer tasks (schema generation, fixture checks, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use schemars::schema_for;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match manifest_dir.parent() {
        Some(parent) if manifest_dir.ends_with("xtask") => parent.to_path_buf(),
        _ => manifest_dir,
    }
}

fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn report_fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures").join("reports")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(postureguard_types::PostureReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(postureguard_settings::PostureguardConfigV1)
}

fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "postureguard.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "postureguard.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Serialize a schema to pretty-printed JSON with trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for spec in schema_specs() {
        let json = serialize_schema(&(spec.generate)())?;
        let path = dir.join(spec.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    println!("\nSchemas emitted successfully.");
    Ok(())
}

/// Validate that schemas in the repo match what would be generated.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    let mut missing = Vec::new();
    let mut mismatched = Vec::new();

    for spec in schema_specs() {
        let path = dir.join(spec.filename);
        if !path.exists() {
            missing.push(spec.filename);
            continue;
        }

        let expected = serialize_schema(&(spec.generate)())?;
        let actual = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if expected != actual {
            mismatched.push(spec.filename);
        }
    }

    if missing.is_empty() && mismatched.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }

    for name in &missing {
        eprintln!("Missing schema: {name}");
    }
    for name in &mismatched {
        eprintln!("Schema out of date: {name}");
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help              Show this message");
    eprintln!("  emit-schemas      Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas  Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids  Print known schema IDs");
    eprintln!("  conform           Validate report fixtures against the report schema");
    eprintln!("  normalize <file>  Print a report with run timings and version normalized");
    eprintln!("  explain-coverage  Validate all check IDs and codes have explanations");
}

/// Token pattern for check ids (dotted) and codes (snake_case).
fn is_valid_token(s: &str, allow_dot: bool) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || (allow_dot && c == '.'))
}

/// Problems in one report beyond what the schema expresses.
fn hygiene_errors(filename: &str, report: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(findings) = report.get("findings").and_then(Value::as_array) else {
        return errors;
    };

    for (i, finding) in findings.iter().enumerate() {
        let field = |name: &str| finding.get(name).and_then(Value::as_str).unwrap_or_default();

        if !is_valid_token(field("check_id"), true) {
            errors.push(format!("{filename}: findings[{i}].check_id is not a valid token"));
        }
        if !is_valid_token(field("code"), false) {
            errors.push(format!("{filename}: findings[{i}].code is not a valid token"));
        }
        if let Some(fp) = finding.get("fingerprint").and_then(Value::as_str)
            && (fp.len() != 64 || !fp.chars().all(|c| c.is_ascii_hexdigit()))
        {
            errors.push(format!("{filename}: findings[{i}].fingerprint is not sha256 hex"));
        }
        let reasons = finding.get("reasons").and_then(Value::as_array);
        if reasons.is_none_or(|r| r.is_empty()) {
            errors.push(format!("{filename}: findings[{i}] has no reasons"));
        }
    }

    let total = report
        .pointer("/data/findings_total")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    if total != findings.len() as u64 {
        errors.push(format!(
            "{filename}: data.findings_total is {total} but {} findings are present",
            findings.len()
        ));
    }
    errors
}

/// Validate every report fixture against the generated report schema.
fn conform() -> anyhow::Result<()> {
    let schema = serde_json::to_value(generate_report_schema()).context("Serialize schema")?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))?;
    println!("✓ postureguard.report.v1 schema compiles");

    let dir = report_fixtures_dir();
    let mut fixture_count = 0;
    let mut errors = Vec::new();

    let mut entries: Vec<PathBuf> = fs::read_dir(&dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    entries.sort();

    for path in entries {
        let filename = file_name(&path);
        let value = read_json(&path)?;

        for err in validator.iter_errors(&value) {
            errors.push(format!("{filename}: schema validation: {err}"));
        }
        errors.extend(hygiene_errors(&filename, &value));

        fixture_count += 1;
        println!("  ✓ {filename} checked");
    }

    if fixture_count == 0 {
        bail!("No JSON fixtures found in {}", dir.display());
    }
    if !errors.is_empty() {
        eprintln!("\nConformance errors:");
        for err in &errors {
            eprintln!("  - {err}");
        }
        bail!("Conformance validation failed with {} errors", errors.len());
    }

    println!("\n✓ All {fixture_count} report fixtures pass conformance checks!");
    Ok(())
}

fn normalize(path: Option<&str>) -> anyhow::Result<()> {
    let Some(path) = path else {
        bail!("usage: cargo xtask normalize <report.json>");
    };
    let value = read_json(Path::new(path))?;
    let normalized = postureguard_test_util::normalize_nondeterministic(value);
    println!(
        "{}",
        serde_json::to_string_pretty(&normalized).context("Serialize report")?
    );
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Validate that all check IDs and codes have explanations.
fn explain_coverage() -> anyhow::Result<()> {
    use postureguard_types::explain;

    let check_ids = explain::all_check_ids();
    let codes = explain::all_codes();
    let mut errors = Vec::new();

    for (kind, id) in check_ids
        .iter()
        .map(|id| ("Check ID", id))
        .chain(codes.iter().map(|code| ("Code", code)))
    {
        match explain::lookup_explanation(id) {
            Some(exp) => {
                if exp.title.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty title"));
                }
                if exp.description.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty description"));
                }
                if exp.remediation.is_empty() {
                    errors.push(format!("{kind} '{id}' has empty remediation"));
                }
            }
            None => errors.push(format!("{kind} '{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!("✓ {} check IDs have explanations", check_ids.len());
        println!("✓ {} codes have explanations", codes.len());
        println!("\n✓ All explain coverage checks passed!");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {error}");
        }
        bail!(
            "Explain coverage validation failed with {} errors",
            errors.len()
        )
    }
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "conform" => conform(),
        "normalize" => normalize(args.get(2).map(String::as_str)),
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for spec in schema_specs() {
                println!("{}", spec.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
