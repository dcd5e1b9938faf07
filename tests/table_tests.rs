use std::path::Path;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::json;

use carbon_dashboard::algorithm::{period_row, Period};
use carbon_dashboard::config::AppConfig;
use carbon_dashboard::error::ApiError;
use carbon_dashboard::excel::{
    cell_number, load_table, TableCache, OVERVIEW, SCOPE3_SUMMARY, SCOPE_SUMMARY, SCOPE3_FILE, SUMMARY_FILE,
};
use carbon_dashboard::server::{configure, AppState};

enum V {
    S(&'static str),
    N(f64),
    Blank,
}

/// Escribe un libro con las hojas indicadas; la primera reutiliza `Sheet1`.
fn write_book(path: &Path, sheets: &[(&str, Vec<Vec<V>>)]) {
    let mut book = umya_spreadsheet::new_file();
    for (i, (name, rows)) in sheets.iter().enumerate() {
        let ws = if i == 0 {
            let ws = book.get_sheet_by_name_mut("Sheet1").unwrap();
            ws.set_name(*name);
            ws
        } else {
            book.new_sheet(*name).unwrap()
        };
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                let cell = ws.get_cell_mut(((c + 1) as u32, (r + 1) as u32));
                match v {
                    V::S(s) => {
                        cell.set_value(*s);
                    }
                    V::N(n) => {
                        cell.set_value_number(*n);
                    }
                    V::Blank => {}
                }
            }
        }
    }
    umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
}

fn scope_summary_sheet() -> Vec<Vec<V>> {
    vec![
        vec![V::S("碳排总汇总报表")],
        vec![V::Blank],
        vec![V::S("周期"), V::S("范围1（kgCO2e）"), V::S("范围 2 (kgCO2e)"), V::S("Scope3")],
        vec![V::S("日"), V::N(1.0), V::N(2.0), V::N(3.0)],
        vec![V::S("年"), V::N(100.0), V::N(200.0), V::N(300.0)],
    ]
}

#[::core::prelude::v1::test]
fn detecta_encabezado_bajo_titulo_desde_disco() {
    let dir = tempfile::tempdir().unwrap();
    write_book(&dir.path().join(SUMMARY_FILE), &[("总汇总", scope_summary_sheet())]);

    let table = load_table(dir.path(), &SCOPE_SUMMARY, 50).unwrap();
    assert_eq!(table.columns(), &["周期", "范围1", "范围2", "Scope3"]);
    assert_eq!(table.len(), 2);
    let row = period_row(&table, Period::Year).unwrap();
    assert_eq!(cell_number(&row[3]), 300.0);
}

#[::core::prelude::v1::test]
fn encabezado_fuera_del_rango_de_busqueda() {
    let dir = tempfile::tempdir().unwrap();
    write_book(&dir.path().join(SUMMARY_FILE), &[("总汇总", scope_summary_sheet())]);
    let err = load_table(dir.path(), &SCOPE_SUMMARY, 2).unwrap_err();
    assert!(matches!(err, ApiError::DataSource(_)));
}

#[::core::prelude::v1::test]
fn hoja_por_nombre_normalizado() {
    let dir = tempfile::tempdir().unwrap();
    write_book(
        &dir.path().join(SCOPE3_FILE),
        &[
            ("说明", vec![vec![V::S("readme")]]),
            (
                "Scope3_汇总（日周月年）",
                vec![
                    vec![V::S("周期"), V::S("范围3总碳排放量(kgCO2e)")],
                    vec![V::S("月"), V::N(42.0)],
                ],
            ),
        ],
    );
    let table = load_table(dir.path(), &SCOPE3_SUMMARY, 50).unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.columns()[1], "范围3总碳排放量");
}

#[::core::prelude::v1::test]
fn hoja_ausente_es_error_de_origen() {
    let dir = tempfile::tempdir().unwrap();
    write_book(&dir.path().join(SCOPE3_FILE), &[("其他", vec![vec![V::S("x")]])]);
    let err = load_table(dir.path(), &SCOPE3_SUMMARY, 50).unwrap_err();
    assert!(matches!(err, ApiError::DataSource(_)));
    assert!(err.to_string().contains("其他"));
}

#[::core::prelude::v1::test]
fn nombre_alternativo_del_libro() {
    let dir = tempfile::tempdir().unwrap();
    write_book(
        &dir.path().join("碳排_总汇总_含强度与减排 .xlsx"),
        &[(
            "总汇总_含强度",
            vec![
                vec![V::S("周期"), V::S("总碳排_kgCO2e")],
                vec![V::S("年"), V::N(1000.0)],
            ],
        )],
    );
    let table = load_table(dir.path(), &OVERVIEW, 50).unwrap();
    assert_eq!(table.len(), 1);
}

#[actix_web::test]
async fn cache_lee_una_sola_vez() {
    let dir = tempfile::tempdir().unwrap();
    write_book(&dir.path().join(SUMMARY_FILE), &[("总汇总", scope_summary_sheet())]);

    let cache = TableCache::new(dir.path(), 50);
    let first = cache.get_or_load(&SCOPE_SUMMARY).await.unwrap();
    let second = cache.get_or_load(&SCOPE_SUMMARY).await.unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
}

#[actix_web::test]
async fn errores_no_se_cachean() {
    let dir = tempfile::tempdir().unwrap();
    let cache = TableCache::new(dir.path(), 50);
    assert!(matches!(cache.get_or_load(&SCOPE_SUMMARY).await, Err(ApiError::FileMissing(_))));

    write_book(&dir.path().join(SUMMARY_FILE), &[("总汇总", scope_summary_sheet())]);
    assert!(cache.get_or_load(&SCOPE_SUMMARY).await.is_ok());
}

#[actix_web::test]
async fn scope_summary_de_extremo_a_extremo() {
    let dir = tempfile::tempdir().unwrap();
    write_book(&dir.path().join(SUMMARY_FILE), &[("总汇总", scope_summary_sheet())]);

    let state = web::Data::new(AppState::new(AppConfig::with_data_dir(dir.path())));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let req = test::TestRequest::post()
        .uri("/api/dashboard/scope_summary")
        .set_json(json!({"timeType": 4}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["data1"], json!([100.0, 0.0]));
    assert_eq!(body["data"]["data2"], json!([0.0, 200.0]));
    assert_eq!(body["data"]["data3"], json!([0.0, 300.0]));
}
