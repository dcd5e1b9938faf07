use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use carbon_dashboard::config::AppConfig;
use carbon_dashboard::report::{lowcarbon, DIAGNOSIS_REPORT, LOWCARBON_REPORT};
use carbon_dashboard::server::{configure, AppState};

const DIAGNOSIS_TEXT: &str = "\
诊断时间: 2025-08-20 20:35
标准限值: 0.4 mg/L
计算O3投加浓度: 0.31 mg/L
✅ O3投加浓度未超标
❌ 能耗热点: 取水泵站
== 碳排热点排名 ==
第2名: 加药间 - 12,345.67 kgCO2e/天
第1名: 取水泵站 - 41,532.84 kgCO2e/天
== 优化建议 ==
第3名: 不应出现 - 1 kg/天
";

const LOWCARBON_TEXT: &str = "\
策略1: 方法: 清水池调蓄提升
预计降碳: 80,000 kgCO2e/年
策略2: 泵站频率优化
预计降碳: 50,000 kgCO2e/年
策略3: 提升光伏自用率
预计降碳: 30,000 kgCO2e/年
绿电碳减排: 150,000 kgCO2e
总降碳潜力: 300,000 kgCO2e/年
绿色低碳等级: 良
";

async fn get(dir: &std::path::Path, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let state = web::Data::new(AppState::new(AppConfig::with_data_dir(dir)));
    let app = test::init_service(App::new().app_data(state).configure(configure)).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = test::read_body(resp).await.to_vec();
    (status, content_type, body)
}

fn json_of(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[actix_web::test]
async fn diagnostico_en_texto_plano() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DIAGNOSIS_REPORT), DIAGNOSIS_TEXT).unwrap();

    let (status, content_type, body) = get(dir.path(), "/api/dashboard/diagnosis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(String::from_utf8(body).unwrap(), DIAGNOSIS_TEXT);
}

#[actix_web::test]
async fn diagnostico_ausente_es_404() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _, body) = get(dir.path(), "/api/dashboard/diagnosis").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json_of(&body)["detail"].as_str().unwrap().contains(DIAGNOSIS_REPORT));

    let (status, _, _) = get(dir.path(), "/api/dashboard/diagnosis_page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn pagina_html_de_diagnostico() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DIAGNOSIS_REPORT), DIAGNOSIS_TEXT).unwrap();

    let (status, content_type, body) = get(dir.path(), "/api/dashboard/diagnosis_page").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("<title>优化策略</title>"));
    assert!(html.contains("能耗热点：取水泵站"));
}

#[actix_web::test]
async fn ranking_ordenado_dentro_de_la_seccion() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DIAGNOSIS_REPORT), DIAGNOSIS_TEXT).unwrap();

    let (status, _, body) = get(dir.path(), "/api/dashboard/diagnosis/ranking").await;
    assert_eq!(status, StatusCode::OK);
    let data = json_of(&body)["data"].clone();
    let entries = data.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["rank"], json!(1));
    assert_eq!(entries[0]["value"].as_f64(), Some(41532.84));
    assert_eq!(entries[1]["value"].as_f64(), Some(12345.67));
    assert_eq!(entries[1]["unit"], json!("kgCO2e/天"));
}

#[actix_web::test]
async fn ranking_sin_seccion_es_500() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DIAGNOSIS_REPORT), "诊断时间: 2025-08-20\n无排名").unwrap();

    let (status, _, body) = get(dir.path(), "/api/dashboard/diagnosis/ranking").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = json_of(&body)["detail"].as_str().unwrap().to_string();
    assert!(detail.contains("碳排热点排名"));
    assert!(detail.contains("诊断时间"));
}

#[actix_web::test]
async fn bajo_carbono_sin_informe_usa_demo() {
    let dir = tempfile::tempdir().unwrap();

    let (status, _, body) = get(dir.path(), "/api/dashboard/lowcarbon").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), serde_json::to_value(lowcarbon::demo_dashboard()).unwrap());

    let (_, _, body) = get(dir.path(), "/api/dashboard/lowcarbon/realtime").await;
    assert_eq!(json_of(&body).as_array().map(|a| a.len()), Some(3));
}

#[actix_web::test]
async fn bajo_carbono_desde_informe() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(LOWCARBON_REPORT), LOWCARBON_TEXT).unwrap();

    let (_, _, body) = get(dir.path(), "/api/dashboard/lowcarbon").await;
    let dash = json_of(&body);
    assert_eq!(dash["hint"], json!(lowcarbon::PARSED_HINT));
    assert_eq!(dash["strategies"][0]["title"], json!("清水池调蓄提升"));
    assert_eq!(dash["strategies"][1]["reduction_tco2e_per_year"].as_f64(), Some(50.0));
    assert_eq!(dash["evaluation"]["grade"], json!("良"));
    assert_eq!(dash["evaluation"]["green_power_contrib_tco2e"].as_f64(), Some(150.0));

    let (_, _, body) = get(dir.path(), "/api/dashboard/lowcarbon/evaluation").await;
    assert_eq!(json_of(&body)["reduction_potential_tco2e_per_year"].as_f64(), Some(300.0));

    let (_, _, body) = get(dir.path(), "/api/dashboard/lowcarbon/strategies").await;
    assert_eq!(json_of(&body).as_array().map(|a| a.len()), Some(3));
}
