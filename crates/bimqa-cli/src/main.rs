//! CLI entry point for bimqa.
//!
//! This module is intentionally thin: it handles argument parsing, I/O, logging and exit codes.
//! All business logic lives in the `bimqa-app` crate.

use anyhow::Context;
use bimqa_app::{
    OperationSetStore, ParamPair, RunInput, TransferInput, TransferRequest,
    catalog_registry, describe_module, format_module_list, list_modules, parse_report_json,
    render_report_markdown, run_operation_set, serialize_report, transfer_parameters,
    verdict_exit_code,
};
use bimqa_settings::{Overrides, ResolvedSettings};
use bimqa_types::{ModuleKind, QaReport};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "bimqa",
    version,
    about = "Quality-assurance pipeline for BIM models"
)]
struct Cli {
    /// Path to the bimqa settings TOML. A missing file means defaults.
    #[arg(long, default_value = "bimqa.toml")]
    config: Utf8PathBuf,

    /// Override the log level (error|warn|info|debug|trace). RUST_LOG wins.
    #[arg(long)]
    log_level: Option<String>,

    /// Override the folder holding .opset files.
    #[arg(long)]
    sets_dir: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an operation set against a model snapshot and write the report.
    Run {
        /// Model snapshot JSON.
        #[arg(long)]
        model: Utf8PathBuf,

        /// Operation set: a .opset path, or the name of a set in the sets folder.
        #[arg(long)]
        set: String,

        /// Where to write the JSON report.
        #[arg(long, default_value = "artifacts/bimqa/report.json")]
        report_out: Utf8PathBuf,

        /// Also write the Markdown report here.
        #[arg(long)]
        markdown_out: Option<Utf8PathBuf>,

        /// Exit with 2 when any TEST section has failures.
        #[arg(long)]
        strict: bool,
    },

    /// Render markdown from an existing JSON report.
    Md {
        /// Path to the JSON report file.
        #[arg(long, default_value = "artifacts/bimqa/report.json")]
        report: Utf8PathBuf,

        /// Where to write the Markdown output (if not specified, prints to stdout).
        #[arg(long, short)]
        output: Option<Utf8PathBuf>,
    },

    /// List available modules.
    Modules {
        /// Only list this kind (scope_selector|collector|analyzer).
        #[arg(long)]
        kind: Option<String>,

        /// Include modules hidden from selection lists.
        #[arg(long)]
        include_hidden: bool,

        /// Model snapshot used to fill argument option lists.
        #[arg(long)]
        model: Option<Utf8PathBuf>,
    },

    /// Show metadata, argument types and defaults of one module.
    Describe {
        /// Module kind (scope_selector|collector|analyzer).
        kind: String,
        /// Registered module name (e.g. "sloped_pipes").
        module_name: String,

        /// Model snapshot used to fill argument option lists.
        #[arg(long)]
        model: Option<Utf8PathBuf>,
    },

    /// Copy space parameters onto the family instances located in each space.
    Transfer {
        /// Model snapshot JSON.
        #[arg(long)]
        model: Utf8PathBuf,

        /// Family whose instances receive the values.
        #[arg(long)]
        family: String,

        /// "Space parameter=Instance parameter"; repeat up to four times.
        #[arg(long = "pair", required = true)]
        pairs: Vec<ParamPair>,

        /// Split numeric values between the instances sharing a space.
        #[arg(long)]
        divide: bool,

        /// Where to write the updated model snapshot.
        #[arg(long, default_value = "artifacts/bimqa/model.json")]
        out: Utf8PathBuf,
    },

    /// Manage the operation sets in the sets folder.
    Sets {
        #[command(subcommand)]
        cmd: SetsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SetsCommand {
    /// List operation sets.
    List,
    /// Create an empty operation set.
    New {
        /// Set name; defaults to the first free "New Operation Set N".
        #[arg(long)]
        name: Option<String>,
    },
    /// Rename an operation set.
    Rename { from: String, to: String },
    /// Delete an operation set.
    Delete { name: String },
    /// Install the built-in operation sets (existing files are kept).
    Init,
}

fn main() {
    let cli = Cli::parse();

    let settings = match load_settings(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("bimqa error: {err:#}");
            std::process::exit(1);
        }
    };
    init_logging(&settings);

    match dispatch(cli, &settings) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("bimqa error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn load_settings(cli: &Cli) -> anyhow::Result<ResolvedSettings> {
    // Missing file is allowed (defaults apply).
    let text = std::fs::read_to_string(&cli.config).unwrap_or_default();
    let cfg = if text.trim().is_empty() {
        bimqa_settings::BimqaConfigV1::default()
    } else {
        bimqa_settings::parse_config_toml(&text)
            .with_context(|| format!("parse config: {}", cli.config))?
    };

    let (include_hidden, strict) = match &cli.cmd {
        Commands::Modules { include_hidden, .. } => (include_hidden.then_some(true), None),
        Commands::Run { strict, .. } => (None, strict.then_some(true)),
        _ => (None, None),
    };
    let overrides = Overrides {
        log_level: cli.log_level.clone(),
        sets_dir: cli.sets_dir.clone(),
        include_hidden,
        strict,
    };
    bimqa_settings::resolve_settings(cfg, overrides).context("resolve config")
}

fn init_logging(settings: &ResolvedSettings) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_level.as_str())),
        )
        .init();
}

fn dispatch(cli: Cli, settings: &ResolvedSettings) -> anyhow::Result<i32> {
    let store = OperationSetStore::new(settings.sets_dir.as_str());
    match cli.cmd {
        Commands::Run {
            model,
            set,
            report_out,
            markdown_out,
            strict: _,
        } => cmd_run(
            settings,
            &store,
            &model,
            &set,
            &report_out,
            markdown_out.as_deref(),
        ),
        Commands::Md { report, output } => cmd_md(&report, output.as_deref()).map(|()| 0),
        Commands::Modules { kind, model, .. } => {
            cmd_modules(kind.as_deref(), model.as_deref(), settings.include_hidden).map(|()| 0)
        }
        Commands::Describe {
            kind,
            module_name,
            model,
        } => cmd_describe(&kind, &module_name, model.as_deref()).map(|()| 0),
        Commands::Sets { cmd } => cmd_sets(&store, cmd).map(|()| 0),
        Commands::Transfer {
            model,
            family,
            pairs,
            divide,
            out,
        } => {
            let request = TransferRequest {
                family,
                pairs,
                divide,
            };
            cmd_transfer(&model, &request, &out).map(|()| 0)
        }
    }
}

fn cmd_transfer(model: &Utf8Path, request: &TransferRequest, out: &Utf8Path) -> anyhow::Result<()> {
    let model_json =
        std::fs::read_to_string(model).with_context(|| format!("read model: {model}"))?;
    let output = transfer_parameters(TransferInput {
        model_json: &model_json,
        request,
    })?;
    write_text_file(out, &output.model_json).context("write model snapshot")?;
    println!(
        "{} instance match(es) in {} space(s), {} value(s) written to {out}",
        output.matched, output.spaces, output.written
    );
    Ok(())
}

fn cmd_run(
    settings: &ResolvedSettings,
    store: &OperationSetStore,
    model: &Utf8Path,
    set: &str,
    report_out: &Utf8Path,
    markdown_out: Option<&Utf8Path>,
) -> anyhow::Result<i32> {
    let model_json =
        std::fs::read_to_string(model).with_context(|| format!("read model: {model}"))?;
    let set_json = read_set(store, set)?;

    let output = run_operation_set(RunInput {
        model_json: &model_json,
        set_json: &set_json,
        settings,
    })?;
    let report = output.report;

    write_report_file(report_out, &report).context("write report json")?;
    if let Some(path) = markdown_out {
        write_text_file(path, &render_report_markdown(&report)).context("write markdown")?;
    }

    print_summary(&report);
    for module in &output.stubbed_modules {
        eprintln!("bimqa: module '{module}' is unavailable and was skipped");
    }

    Ok(verdict_exit_code(&report, settings.strict))
}

/// A path that exists wins over a stored set of the same name.
fn read_set(store: &OperationSetStore, set: &str) -> anyhow::Result<String> {
    let path = Utf8Path::new(set);
    if path.is_file() {
        return std::fs::read_to_string(path).with_context(|| format!("read operation set: {path}"));
    }
    store
        .load(set)
        .with_context(|| format!("no operation set file or stored set named '{set}'"))
}

fn print_summary(report: &QaReport) {
    println!("{}", report.name);
    for line in bimqa_render::render_summary(&report.sections) {
        println!("  {line}");
    }
}

fn write_report_file(path: &Utf8Path, report: &QaReport) -> anyhow::Result<()> {
    let data = serialize_report(report)?;
    ensure_parent(path)?;
    std::fs::write(path, data).with_context(|| format!("write report: {}", path))?;
    Ok(())
}

fn write_text_file(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    ensure_parent(path)?;
    std::fs::write(path, text).with_context(|| format!("write text: {}", path))?;
    Ok(())
}

fn ensure_parent(path: &Utf8Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    Ok(())
}

fn cmd_md(report_path: &Utf8Path, output: Option<&Utf8Path>) -> anyhow::Result<()> {
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("read report: {}", report_path))?;
    let report = parse_report_json(&report_text)?;
    let md = render_report_markdown(&report);

    if let Some(out_path) = output {
        write_text_file(out_path, &md).context("write markdown output")?;
    } else {
        print!("{}", md);
    }

    Ok(())
}

fn read_model(model: Option<&Utf8Path>) -> anyhow::Result<Option<String>> {
    model
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("read model: {path}"))
        })
        .transpose()
}

fn parse_kind(kind: &str) -> anyhow::Result<ModuleKind> {
    kind.parse::<ModuleKind>().map_err(anyhow::Error::msg)
}

fn cmd_modules(
    kind: Option<&str>,
    model: Option<&Utf8Path>,
    include_hidden: bool,
) -> anyhow::Result<()> {
    let kind = kind.map(parse_kind).transpose()?;
    let model_json = read_model(model)?;
    let registry = catalog_registry(model_json.as_deref())?;
    print!(
        "{}",
        format_module_list(&list_modules(&registry, kind, include_hidden))
    );
    Ok(())
}

fn cmd_describe(kind: &str, module_name: &str, model: Option<&Utf8Path>) -> anyhow::Result<()> {
    let kind = parse_kind(kind)?;
    let model_json = read_model(model)?;
    let registry = catalog_registry(model_json.as_deref())?;
    print!("{}", describe_module(&registry, kind, module_name)?);
    Ok(())
}

fn cmd_sets(store: &OperationSetStore, cmd: SetsCommand) -> anyhow::Result<()> {
    match cmd {
        SetsCommand::List => {
            let sets = store.list()?;
            if sets.is_empty() {
                println!("No operation sets in {}", store.root());
            }
            for set in sets {
                println!("{}", set.name);
            }
        }
        SetsCommand::New { name } => {
            let set = store.create(name.as_deref())?;
            println!("created {} ({})", set.name, set.path);
        }
        SetsCommand::Rename { from, to } => {
            let set = store.rename(&from, &to)?;
            println!("renamed {from} to {} ({})", set.name, set.path);
        }
        SetsCommand::Delete { name } => {
            store.delete(&name)?;
            println!("deleted {name}");
        }
        SetsCommand::Init => {
            let installed = store.install_builtin()?;
            if installed.is_empty() {
                println!("built-in operation sets already installed in {}", store.root());
            }
            for name in installed {
                println!("installed {name}");
            }
        }
    }
    Ok(())
}
