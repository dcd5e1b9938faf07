//! Estado compartido, tabla de rutas y arranque del servidor HTTP.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use crate::config::AppConfig;
use crate::error::{json_error_handler, query_error_handler, ApiResult};
use crate::excel::{Table, TableCache, TableSource};
use crate::server_handlers::*;

/// Estado de la aplicación: configuración y caché de hojas.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub tables: TableCache,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let tables = TableCache::new(config.data_dir.clone(), config.header_scan_rows);
        AppState { config, tables }
    }

    pub async fn table(&self, source: &TableSource) -> ApiResult<Arc<Table>> {
        self.tables.get_or_load(source).await
    }
}

/// Registra todas las rutas bajo `/api`, junto con los manejadores de error
/// de los extractores JSON y query.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(
            web::scope("/api")
                .route("/_health", web::get().to(health_handler))
                .route("/_cache/stats", web::get().to(cache_stats_handler))
                .route("/help", web::get().to(help_handler))
                // 首页
                .route("/dashboard/overview", web::post().to(overview_handler))
                .route("/dashboard/scope_summary", web::post().to(scope_summary_handler))
                .route("/dashboard/unit_intensity", web::post().to(unit_intensity_handler))
                .route("/dashboard/scope_share", web::post().to(scope_share_handler))
                .route("/dashboard/lowcarbon", web::get().to(lowcarbon_handler))
                .route("/dashboard/lowcarbon/realtime", web::get().to(lowcarbon_realtime_handler))
                .route("/dashboard/lowcarbon/strategies", web::get().to(lowcarbon_strategies_handler))
                .route("/dashboard/lowcarbon/evaluation", web::get().to(lowcarbon_evaluation_handler))
                .route("/dashboard/diagnosis", web::get().to(diagnosis_handler))
                .route("/dashboard/diagnosis_page", web::get().to(diagnosis_page_handler))
                .route("/dashboard/diagnosis/ranking", web::get().to(diagnosis_ranking_handler))
                // 工艺段
                .route("/process/section_total", web::post().to(section_total_handler))
                .route("/process/section_share", web::post().to(section_share_handler))
                .route("/process/device_top10", web::get().to(device_top10_handler))
                .route("/process/{plant}/{segment}/info", web::get().to(segment_info_handler))
                .route("/process/{plant}/{segment}/trend", web::post().to(segment_trend_handler))
                .route("/process/{plant}/{segment}/share", web::get().to(segment_share_handler))
                // 管网
                .route("/network/points-carbon", web::post().to(network_points_handler))
                // 范围
                .route("/scope/scope_1", web::post().to(scope_1_handler))
                .route("/scope/scope_2", web::post().to(scope_2_handler))
                .route("/scope/scope_3", web::post().to(scope_3_handler))
                .route("/scope/scope_3/chem", web::post().to(scope_3_chem_handler))
                .route("/scope/scope_3/sludge", web::post().to(scope_3_sludge_handler)),
        );
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind = config.bind.clone();
    log::info!("directorio de datos: {}", config.data_dir.display());
    if !config.data_dir.is_dir() {
        log::warn!("el directorio de datos no existe; los endpoints responderán 404");
    }

    let state = web::Data::new(AppState::new(config));
    log::info!("escuchando en http://{}", bind);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .configure(configure)
    })
    .bind(bind)?
    .run()
    .await
}
