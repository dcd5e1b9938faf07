//! Endpoints alimentados por los informes de texto: bajo carbono y diagnóstico.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::api_json::envelope;
use crate::error::ApiResult;
use crate::report::{
    diagnosis, extract_ranked, extract_section, lowcarbon, read_report, read_report_opt, DIAGNOSIS_REPORT,
    LOWCARBON_REPORT,
};
use crate::server::AppState;

const RANKING_SECTION: &str = "碳排热点排名";
const RANKING_END: &str = "优化建议";

async fn lowcarbon_text(state: &AppState) -> Option<String> {
    read_report_opt(state.tables.data_dir(), LOWCARBON_REPORT).await
}

/// GET /api/dashboard/lowcarbon
pub async fn lowcarbon_handler(state: web::Data<AppState>) -> HttpResponse {
    let text = lowcarbon_text(&state).await;
    HttpResponse::Ok().json(lowcarbon::dashboard(text.as_deref()))
}

/// GET /api/dashboard/lowcarbon/realtime (siempre datos de demostración)
pub async fn lowcarbon_realtime_handler() -> HttpResponse {
    HttpResponse::Ok().json(lowcarbon::demo_realtime())
}

/// GET /api/dashboard/lowcarbon/strategies
pub async fn lowcarbon_strategies_handler(state: web::Data<AppState>) -> HttpResponse {
    let text = lowcarbon_text(&state).await;
    HttpResponse::Ok().json(lowcarbon::strategies(text.as_deref()))
}

/// GET /api/dashboard/lowcarbon/evaluation
pub async fn lowcarbon_evaluation_handler(state: web::Data<AppState>) -> HttpResponse {
    let text = lowcarbon_text(&state).await;
    HttpResponse::Ok().json(lowcarbon::evaluation(text.as_deref()))
}

/// GET /api/dashboard/diagnosis: el informe tal cual, en texto plano.
pub async fn diagnosis_handler(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let text = read_report(state.tables.data_dir(), DIAGNOSIS_REPORT).await?;
    Ok(HttpResponse::Ok().content_type("text/plain; charset=utf-8").body(text))
}

/// GET /api/dashboard/diagnosis_page
pub async fn diagnosis_page_handler(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let text = read_report(state.tables.data_dir(), DIAGNOSIS_REPORT).await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(diagnosis::render_html(&text)))
}

/// GET /api/dashboard/diagnosis/ranking
///
/// Estricto: sin la sección o sin líneas `第N名` se responde 500.
pub async fn diagnosis_ranking_handler(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let text = read_report(state.tables.data_dir(), DIAGNOSIS_REPORT).await?;
    let section = extract_section(&text, RANKING_SECTION, Some(RANKING_END))?;
    let ranked = extract_ranked(section)?;
    Ok(envelope(json!(ranked)))
}
