use std::net::SocketAddr;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use laptop_diagnosis_api::{
    DiagnoseRequest, DiagnosisApi, DiagnosisReport, KnowledgeBaseStats, RequestDefaults,
    RuleSummary, SymptomNotFound, API_CONTRACT_VERSION,
};
use laptop_diagnosis_core::{Category, Severity, Symptom, DEFAULT_THRESHOLD, DEFAULT_TOP_N};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const SERVICE_CONTRACT_VERSION: &str = "service.v1";
const OPENAPI_YAML: &str = include_str!("../../../openapi/openapi.yaml");

#[derive(Debug, Clone)]
struct ServiceState {
    api: DiagnosisApi,
}

#[derive(Debug, Clone, Serialize)]
struct ServiceEnvelope<T>
where
    T: Serialize,
{
    service_contract_version: &'static str,
    api_contract_version: &'static str,
    data: T,
}

#[derive(Debug, Clone, Serialize)]
struct ServiceError {
    #[serde(skip)]
    status: StatusCode,
    service_contract_version: &'static str,
    error: String,
}

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    status: &'static str,
    symptoms: usize,
    rules: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RulesQuery {
    category: Option<String>,
    severity: Option<String>,
}

#[derive(Debug, Parser)]
#[command(name = "laptop-diagnosis-service")]
#[command(about = "Local HTTP service for laptop fault diagnosis")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:4020")]
    bind: SocketAddr,
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    default_threshold: f64,
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    default_top_n: usize,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl ServiceError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, service_contract_version: SERVICE_CONTRACT_VERSION, error: message.into() }
    }

    fn from_api(err: &anyhow::Error) -> Self {
        let status = if err.downcast_ref::<SymptomNotFound>().is_some() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_REQUEST
        };
        Self::new(status, format!("{err:#}"))
    }
}

fn envelope<T>(data: T) -> ServiceEnvelope<T>
where
    T: Serialize,
{
    ServiceEnvelope {
        service_contract_version: SERVICE_CONTRACT_VERSION,
        api_contract_version: API_CONTRACT_VERSION,
        data,
    }
}

fn app(state: ServiceState) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/openapi", get(openapi))
        .route("/v1/symptoms", get(symptoms_list))
        .route("/v1/symptoms/:code", get(symptom_show))
        .route("/v1/rules", get(rules_list))
        .route("/v1/stats", get(stats))
        .route("/v1/diagnose", post(diagnose))
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DIAG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let defaults = RequestDefaults {
        threshold: args.default_threshold,
        top_n: args.default_top_n,
        ..RequestDefaults::default()
    };
    let state = ServiceState { api: DiagnosisApi::with_defaults(defaults)? };
    let configured = state.api.defaults();

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!(
        bind = %args.bind,
        default_threshold = configured.threshold,
        default_top_n = configured.top_n,
        default_detailed = configured.detailed,
        symptoms = state.api.symptoms().len(),
        rules = state.api.rules().len(),
        "laptop diagnosis service listening"
    );
    axum::serve(listener, app(state)).await?;
    Ok(())
}

async fn health(State(state): State<ServiceState>) -> Json<ServiceEnvelope<HealthResponse>> {
    let stats = state.api.knowledge_base_stats();
    Json(envelope(HealthResponse {
        status: "ok",
        symptoms: stats.total_symptoms,
        rules: stats.total_rules,
    }))
}

async fn openapi() -> impl IntoResponse {
    (StatusCode::OK, [("content-type", "application/yaml; charset=utf-8")], OPENAPI_YAML)
}

async fn symptoms_list(State(state): State<ServiceState>) -> Json<ServiceEnvelope<Vec<Symptom>>> {
    Json(envelope(state.api.symptoms().to_vec()))
}

async fn symptom_show(
    State(state): State<ServiceState>,
    Path(code): Path<String>,
) -> Result<Json<ServiceEnvelope<Symptom>>, ServiceError> {
    let symptom = state.api.symptom(&code).map_err(|err| ServiceError::from_api(&err))?;
    Ok(Json(envelope(symptom)))
}

fn parse_label<T>(
    label: Option<&str>,
    kind: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, ServiceError> {
    label
        .map(|value| {
            parse(value).ok_or_else(|| {
                ServiceError::new(StatusCode::BAD_REQUEST, format!("unknown {kind}: {value}"))
            })
        })
        .transpose()
}

async fn rules_list(
    State(state): State<ServiceState>,
    Query(query): Query<RulesQuery>,
) -> Result<Json<ServiceEnvelope<Vec<RuleSummary>>>, ServiceError> {
    let category = parse_label(query.category.as_deref(), "category", Category::parse)?;
    let severity = parse_label(query.severity.as_deref(), "severity", Severity::parse)?;
    Ok(Json(envelope(state.api.rules_where(category, severity))))
}

async fn stats(State(state): State<ServiceState>) -> Json<ServiceEnvelope<KnowledgeBaseStats>> {
    Json(envelope(state.api.knowledge_base_stats()))
}

async fn diagnose(
    State(state): State<ServiceState>,
    payload: Result<Json<DiagnoseRequest>, JsonRejection>,
) -> Result<Json<ServiceEnvelope<DiagnosisReport>>, ServiceError> {
    let Json(request) =
        payload.map_err(|err| ServiceError::new(StatusCode::BAD_REQUEST, err.body_text()))?;
    let report = state.api.diagnose(request).map_err(|err| ServiceError::from_api(&err))?;
    Ok(Json(envelope(report)))
}
