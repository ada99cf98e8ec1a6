use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use laptop_diagnosis_api::{DiagnoseRequest, DiagnosisApi, RequestDefaults};
use laptop_diagnosis_core::{Category, Severity, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const CLI_CONTRACT_VERSION: &str = "cli.v1";

#[derive(Debug, Parser)]
#[command(name = "diag")]
#[command(about = "Laptop fault diagnosis CLI")]
struct Cli {
    /// Minimum confidence used when a diagnose call omits `--threshold`.
    #[arg(long, global = true, default_value_t = DEFAULT_THRESHOLD)]
    default_threshold: f64,

    /// Result count used when a diagnose call omits `--top-n`.
    #[arg(long, global = true, default_value_t = DEFAULT_TOP_N)]
    default_top_n: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Symptoms {
        #[command(subcommand)]
        command: SymptomsCommand,
    },
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
    Diagnose(DiagnoseArgs),
}

#[derive(Debug, Subcommand)]
enum SymptomsCommand {
    List,
    Show(SymptomShowArgs),
}

#[derive(Debug, Args)]
struct SymptomShowArgs {
    #[arg(long)]
    code: String,
}

#[derive(Debug, Subcommand)]
enum RulesCommand {
    List(RulesListArgs),
    Stats,
}

#[derive(Debug, Args)]
struct RulesListArgs {
    /// `hardware` or `software`.
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,
    /// `ringan`, `sedang` or `berat` (also `low`, `medium`, `high`).
    #[arg(long, value_parser = parse_severity)]
    severity: Option<Severity>,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| format!("unknown category: {value}"))
}

fn parse_severity(value: &str) -> Result<Severity, String> {
    Severity::parse(value).ok_or_else(|| format!("unknown severity: {value}"))
}

#[derive(Debug, Args)]
struct DiagnoseArgs {
    /// Symptom code; repeat the flag or pass a comma separated list.
    #[arg(long = "symptom", value_delimiter = ',')]
    symptoms: Vec<String>,
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    top_n: Option<usize>,
    /// Only report rules whose every condition is present.
    #[arg(long)]
    strict: bool,
    /// Emit the compact result instead of the full explanation.
    #[arg(long)]
    simple: bool,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&with_contract_version(value))?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DIAG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let api = DiagnosisApi::with_defaults(RequestDefaults {
        threshold: cli.default_threshold,
        top_n: cli.default_top_n,
        ..RequestDefaults::default()
    })?;

    match cli.command {
        Command::Symptoms { command } => run_symptoms(command, &api),
        Command::Rules { command } => run_rules(&command, &api),
        Command::Diagnose(args) => run_diagnose(args, &api),
    }
}

fn run_symptoms(command: SymptomsCommand, api: &DiagnosisApi) -> Result<()> {
    match command {
        SymptomsCommand::List => {
            let symptoms = api.symptoms();
            emit_json(serde_json::json!({
                "total": symptoms.len(),
                "symptoms": symptoms
            }))
        }
        SymptomsCommand::Show(args) => {
            let symptom = api.symptom(&args.code)?;
            emit_json(serde_json::json!({ "symptom": symptom }))
        }
    }
}

fn run_rules(command: &RulesCommand, api: &DiagnosisApi) -> Result<()> {
    match command {
        RulesCommand::List(args) => {
            let rules = api.rules_where(args.category, args.severity);
            emit_json(serde_json::json!({
                "total": rules.len(),
                "rules": rules
            }))
        }
        RulesCommand::Stats => emit_json(serde_json::to_value(api.knowledge_base_stats())?),
    }
}

fn run_diagnose(args: DiagnoseArgs, api: &DiagnosisApi) -> Result<()> {
    let request = DiagnoseRequest {
        symptoms: args.symptoms,
        detailed: args.simple.then_some(false),
        threshold: args.threshold,
        top_n: args.top_n,
        strict_mode: args.strict.then_some(true),
    };
    tracing::debug!(symptoms = request.symptoms.len(), strict = args.strict, "running diagnose");
    let report = api.diagnose(request)?;
    emit_json(serde_json::to_value(report)?)
}
