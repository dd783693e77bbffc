//! Developer tasks (schema generation, fixture conformance, module metadata).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use bimqa_app::{BUILTIN_SETS, RunInput, catalog_registry, run_operation_set};
use bimqa_settings::ResolvedSettings;
use bimqa_test_util::normalize_nondeterministic;
use bimqa_types::ModuleKind;
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixture sets with a golden report: (fixture dir, operation set, golden).
const GOLDEN_RUNS: &[(&str, &str, &str)] = &[("clinic", "inventory.opset", "expected.report.json")];

/// Get the project root (parent of xtask directory).
fn project_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    match manifest_dir.parent() {
        Some(parent) if manifest_dir.ends_with("xtask") => parent.to_path_buf(),
        _ => manifest_dir,
    }
}

/// Get the schemas directory path.
fn schemas_dir() -> PathBuf {
    project_root().join("schemas")
}

fn fixtures_dir() -> PathBuf {
    project_root().join("tests").join("fixtures")
}

fn builtin_sets_dir() -> PathBuf {
    project_root().join("crates").join("bimqa-app").join("builtin")
}

/// Schema definition with its target filename.
struct SchemaSpec {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(bimqa_types::QaReport)
}

fn generate_opset_schema() -> schemars::Schema {
    schema_for!(bimqa_types::OperationSetDoc)
}

fn generate_snapshot_schema() -> schemars::Schema {
    schema_for!(bimqa_domain::ModelSnapshot)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(bimqa_settings::BimqaConfigV1)
}

/// List of schemas to generate.
fn schema_specs() -> Vec<SchemaSpec> {
    vec![
        SchemaSpec {
            filename: "bimqa.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaSpec {
            filename: "bimqa.opset.v1.json",
            generate: generate_opset_schema,
        },
        SchemaSpec {
            filename: "bimqa.snapshot.v1.json",
            generate: generate_snapshot_schema,
        },
        SchemaSpec {
            filename: "bimqa.config.v1.json",
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

fn compile(generate: fn() -> schemars::Schema) -> anyhow::Result<jsonschema::Validator> {
    let value = serde_json::to_value(generate()).context("Failed to serialize schema")?;
    jsonschema::validator_for(&value).map_err(|e| anyhow::anyhow!("Failed to compile schema: {e}"))
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))
}

/// Emit schemas to the schemas/ directory.
fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir();
    if !dir.exists() {
        fs::create_dir_all(&dir).context("Failed to create schemas directory")?;
    }

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
    if !missing.is_empty() {
        eprintln!("Missing schemas:");
        for name in &missing {
            eprintln!("  - {}", name);
        }
    }
    if !mismatched.is_empty() {
        eprintln!("Schemas out of date:");
        for name in &mismatched {
            eprintln!("  - {}", name);
        }
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help                   Show this message");
    eprintln!("  emit-schemas           Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas       Check if schemas/ matches generated output (for CI)");
    eprintln!("  print-schema-ids       Print known schema IDs");
    eprintln!("  conform                Validate fixtures and built-in sets against the schemas");
    eprintln!("  conform-full           conform + re-run golden fixtures and compare reports");
    eprintln!("  module-coverage        Check every registered module loads with usable metadata");
    eprintln!("  validate-builtin-sets  Run every built-in operation set; fail on stubbed modules");
}

/// Validate every fixture document against the schema of its kind.
///
/// - `model.json`: model snapshot
/// - `*.opset`: operation-set document (fixtures and built-in sets)
/// - `*.report.json`: report envelope
fn conform() -> anyhow::Result<()> {
    let snapshot = compile(generate_snapshot_schema)?;
    let opset = compile(generate_opset_schema)?;
    let report = compile(generate_report_schema)?;
    println!("✓ schemas compile");

    let mut files = Vec::new();
    for entry in fs::read_dir(fixtures_dir()).context("Failed to read tests/fixtures/")? {
        let dir = entry?.path();
        if !dir.is_dir() {
            continue;
        }
        for file in fs::read_dir(&dir).with_context(|| format!("Failed to read {}", dir.display()))? {
            files.push(file?.path());
        }
    }
    for entry in fs::read_dir(builtin_sets_dir()).context("Failed to read built-in sets")? {
        files.push(entry?.path());
    }
    files.sort();

    let mut checked = 0;
    let mut errors = Vec::new();
    for path in &files {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let validator = if file_name == "model.json" {
            &snapshot
        } else if file_name.ends_with(".report.json") {
            &report
        } else if bimqa_types::has_config_extension(path) {
            &opset
        } else {
            continue;
        };

        let value = read_json(path)?;
        for err in validator.iter_errors(&value) {
            errors.push(format!("{}: schema validation: {}", path.display(), err));
        }
        checked += 1;
    }

    if errors.is_empty() {
        println!("✓ {} documents validate", checked);
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Conformance failed with {} errors", errors.len())
    }
}

/// `conform` plus: run each golden fixture in-process, validate the produced
/// report and compare it to the golden file (normalized).
fn conform_full() -> anyhow::Result<()> {
    conform()?;

    println!("\n--- Full conformance: golden reports ---\n");
    let report_schema = compile(generate_report_schema)?;
    let settings = ResolvedSettings::default();
    let mut errors = Vec::new();

    for (fixture, set, golden) in GOLDEN_RUNS {
        let dir = fixtures_dir().join(fixture);
        let model_json = fs::read_to_string(dir.join("model.json"))
            .with_context(|| format!("Failed to read model of fixture '{}'", fixture))?;
        let set_json = fs::read_to_string(dir.join(set))
            .with_context(|| format!("Failed to read {} of fixture '{}'", set, fixture))?;

        let output = run_operation_set(RunInput {
            model_json: &model_json,
            set_json: &set_json,
            settings: &settings,
        })
        .with_context(|| format!("fixture '{}': run {}", fixture, set))?;

        let produced = serde_json::to_value(&output.report).context("serialize report")?;
        for err in report_schema.iter_errors(&produced) {
            errors.push(format!("fixture '{}': schema validation: {}", fixture, err));
        }

        let expected = normalize_nondeterministic(read_json(&dir.join(golden))?);
        if normalize_nondeterministic(produced) != expected {
            errors.push(format!(
                "fixture '{}': {} output differs from {}",
                fixture, set, golden
            ));
        } else {
            println!("✓ {}/{} matches {}", fixture, set, golden);
        }
    }

    if errors.is_empty() {
        println!("\n✓ All conformance checks passed!");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Full conformance failed with {} errors", errors.len())
    }
}

/// Every registered module must load against both an empty catalog and the
/// clinic fixture, and carry a display name and an author.
fn module_coverage() -> anyhow::Result<()> {
    let model_json = fs::read_to_string(fixtures_dir().join("clinic").join("model.json"))
        .context("Failed to read clinic model")?;
    let catalogs = [("empty catalog", None), ("clinic", Some(model_json.as_str()))];

    let mut errors = Vec::new();
    let mut undocumented = Vec::new();
    let mut checked = 0;

    for (label, model) in catalogs {
        let registry = catalog_registry(model)?;
        for kind in ModuleKind::ALL {
            for name in registry.registered_names(kind) {
                checked += 1;
                let meta = match registry.describe(kind, &name) {
                    Ok(meta) => meta,
                    Err(err) => {
                        errors.push(format!("{} '{}' ({}): {}", kind, name, label, err));
                        continue;
                    }
                };
                if meta.name.trim().is_empty() {
                    errors.push(format!("{} '{}' has an empty name", kind, name));
                }
                if meta.author.trim().is_empty() {
                    errors.push(format!("{} '{}' has an empty author", kind, name));
                }
                if meta.description.trim().is_empty() && model.is_none() && !meta.hidden {
                    undocumented.push(format!("{} '{}'", kind, name));
                }
            }
        }
    }

    for module in &undocumented {
        eprintln!("warning: {} has no description", module);
    }
    if errors.is_empty() {
        println!("✓ {} module loads checked", checked);
        println!("\n✓ All module coverage checks passed!");
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Module coverage failed with {} errors", errors.len())
    }
}

/// Run each built-in set against the clinic model; a set that needs a
/// stubbed module would silently report nothing in the field.
fn validate_builtin_sets() -> anyhow::Result<()> {
    let model_json = fs::read_to_string(fixtures_dir().join("clinic").join("model.json"))
        .context("Failed to read clinic model")?;
    let settings = ResolvedSettings::default();
    let mut errors = Vec::new();

    for (name, text) in BUILTIN_SETS {
        let output = run_operation_set(RunInput {
            model_json: &model_json,
            set_json: text,
            settings: &settings,
        })
        .with_context(|| format!("built-in set '{}'", name))?;

        if output.stubbed_modules.is_empty() {
            println!(
                "✓ {} ({} operation(s))",
                name,
                output.report.sections.len()
            );
        } else {
            errors.push(format!(
                "built-in set '{}' references unknown modules: {}",
                name,
                output.stubbed_modules.join(", ")
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            eprintln!("  - {}", error);
        }
        bail!("Built-in set validation failed with {} errors", errors.len())
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
        "conform-full" => conform_full(),
        "module-coverage" => module_coverage(),
        "validate-builtin-sets" => validate_builtin_sets(),
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
