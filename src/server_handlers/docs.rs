use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Value};

use crate::algorithm::SEGMENTS;
use crate::api_json::{TimeBody, TrendBody};
use crate::server::AppState;

fn endpoint(method: &str, path: &str, description: &str) -> Value {
    json!({ "method": method, "path": path, "description": description })
}

/// GET /api/help: listado de endpoints con ejemplos de cuerpo.
pub async fn help_handler(state: web::Data<AppState>) -> impl Responder {
    let time_example = TimeBody { time_type: 4 };
    let trend_example = TrendBody { qtype: 1, time_type: 4 };

    let mut endpoints = vec![
        endpoint("POST", "/api/dashboard/overview", "总碳排(吨)、处理水量、单位水处理强度、预计减排量(吨)"),
        endpoint("POST", "/api/dashboard/scope_summary", "范围1/2/3 碳排（直接/间接）"),
        endpoint("POST", "/api/dashboard/unit_intensity", "各周期总处理水量与单位处理强度"),
        endpoint("POST", "/api/dashboard/scope_share", "范围1/2/3 占比"),
        endpoint("GET", "/api/dashboard/lowcarbon", "绿色低碳评估面板（无数据时返回示例）"),
        endpoint("GET", "/api/dashboard/lowcarbon/realtime", "实时工艺碳排（示例数据）"),
        endpoint("GET", "/api/dashboard/lowcarbon/strategies", "低碳策略"),
        endpoint("GET", "/api/dashboard/lowcarbon/evaluation", "低碳评估"),
        endpoint("GET", "/api/dashboard/diagnosis", "诊断报告原文（text/plain）"),
        endpoint("GET", "/api/dashboard/diagnosis_page", "优化策略页面（HTML）"),
        endpoint("GET", "/api/dashboard/diagnosis/ranking", "碳排热点排名"),
        endpoint("POST", "/api/process/section_total", "各工艺段碳排量"),
        endpoint("POST", "/api/process/section_share", "各工艺段碳排占比"),
        endpoint("GET", "/api/process/device_top10", "关键设备日碳排 Top10"),
        endpoint("POST", "/api/network/points-carbon", "管网压力监测点最新碳排"),
        endpoint("POST", "/api/scope/scope_1", "范围1 O3 泄漏"),
        endpoint("POST", "/api/scope/scope_2", "范围2 电耗碳排"),
        endpoint("POST", "/api/scope/scope_3", "范围3 汇总"),
        endpoint("POST", "/api/scope/scope_3/chem", "范围3 药剂分项"),
        endpoint("POST", "/api/scope/scope_3/sludge", "范围3 污泥运输"),
        endpoint("GET", "/api/_health", "健康检查"),
        endpoint("GET", "/api/_cache/stats", "表缓存统计"),
    ];
    for seg in SEGMENTS {
        let base = format!("/api/process/{}/{}", seg.plant.route(), seg.route);
        endpoints.push(endpoint("GET", &format!("{}/info", base), seg.segment));
        endpoints.push(endpoint("POST", &format!("{}/trend", base), seg.segment));
        endpoints.push(endpoint("GET", &format!("{}/share", base), seg.segment));
    }

    let segments: Vec<Value> = SEGMENTS
        .iter()
        .map(|s| json!({ "plant": s.plant.route(), "route": s.route, "alias": s.alias, "segment": s.segment }))
        .collect();

    HttpResponse::Ok().json(json!({
        "description": "水厂碳排放看板 API。timeType: 1=日, 2=周, 3=月, 4=年；GET 接口的 timeType 默认为 4。",
        "data_dir": state.config.data_dir.display().to_string(),
        "post_example": time_example,
        "trend_example": trend_example,
        "segments": segments,
        "endpoints": endpoints,
    }))
}
