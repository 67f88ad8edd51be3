use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};

use crate::{
    models::{
        analysis::{AnalyzeQuery, AnalyzeRequest, AnalyzeResponse, ErrorResponse},
        benchmark::BenchmarkSet,
    },
    presentation::{
        csv_export::CsvReport,
        sort::{sort_rows, SortColumn, SortDirection},
    },
    services::scanner::{normalize_symbols, parse_request_date, scan},
    AppState,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
}

/// Validated analysis request
struct ScanPlan {
    symbols: Vec<String>,
    date: Option<NaiveDate>,
    sort: Option<SortColumn>,
    direction: SortDirection,
}

fn plan_request(
    query: AnalyzeQuery,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
    benchmarks: &BenchmarkSet,
) -> Result<ScanPlan, ApiError> {
    let Json(request) = payload.map_err(|e| {
        bad_request(format!(
            "Invalid request body: {}. Expected {{\"symbols\": [..], \"date\": \"YYYY-MM-DD\"}}",
            e.body_text()
        ))
    })?;

    let symbols = normalize_symbols(&request.symbols).map_err(bad_request)?;
    let date = parse_request_date(request.date.as_deref()).map_err(bad_request)?;

    let sort = query
        .sort
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.parse::<SortColumn>()?.check_against(benchmarks))
        .transpose()
        .map_err(bad_request)?;

    let direction = query
        .direction
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<SortDirection>)
        .transpose()
        .map_err(bad_request)?
        .unwrap_or_default();

    Ok(ScanPlan {
        symbols,
        date,
        sort,
        direction,
    })
}

async fn run_analysis(state: &AppState, plan: ScanPlan) -> Result<AnalyzeResponse, ApiError> {
    let outcome = scan(state.quotes.as_ref(), &state.engine, &plan.symbols, plan.date)
        .await
        .map_err(|e| {
            tracing::error!("Analysis failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to fetch market data: {}", e),
                }),
            )
        })?;

    let data = sort_rows(
        outcome.metrics,
        plan.sort.as_ref(),
        plan.direction,
        state.engine.benchmarks(),
    );

    Ok(AnalyzeResponse {
        success: true,
        data,
        timestamp: Utc::now(),
        request_date: plan
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "latest".to_string()),
        unavailable: outcome.unavailable,
    })
}

/// Handler for POST /api/analyze
/// Fetches the requested symbols plus benchmarks and returns volume/price metrics
pub async fn analyze(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let plan = plan_request(query, payload, state.engine.benchmarks())?;

    tracing::info!(
        "Analyze request: {:?} (sort: {:?} {:?})",
        plan.symbols,
        plan.sort,
        plan.direction
    );

    let response = run_analysis(&state, plan).await?;

    tracing::info!(
        "Returning {} rows ({} unavailable)",
        response.data.len(),
        response.unavailable.len()
    );

    Ok(Json(response))
}

/// Handler for POST /api/analyze/csv
/// Same analysis as /api/analyze, delivered as a downloadable spreadsheet
pub async fn export_csv(
    State(state): State<AppState>,
    Query(query): Query<AnalyzeQuery>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let plan = plan_request(query, payload, state.engine.benchmarks())?;
    let response = run_analysis(&state, plan).await?;

    let report = CsvReport {
        rows: &response.data,
        benchmarks: state.engine.benchmarks(),
        generated_at: response.timestamp,
        request_date: &response.request_date,
    };

    let csv_content = report.to_csv().map_err(|e| {
        tracing::error!("CSV export failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: format!("Failed to generate CSV: {}", e),
            }),
        )
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", report.filename()))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    Ok((headers, csv_content))
}

pub async fn health() -> &'static str {
    "ok"
}
