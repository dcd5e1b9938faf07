use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

use crate::server::AppState;

/// GET /api/_health
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({ "code": 0, "msg": "ok" }))
}

/// GET /api/_cache/stats: aciertos, fallos y hojas ya cargadas.
pub async fn cache_stats_handler(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.tables.stats())
}
