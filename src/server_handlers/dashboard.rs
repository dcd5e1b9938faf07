//! Widgets de la portada: resumen, ámbitos, intensidad y ranking de equipos.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::algorithm::period_row;
use crate::api_json::{envelope, TimeBody};
use crate::error::{ApiError, ApiResult};
use crate::excel::io::{PERIOD_ALIASES, SCOPE1_ALIASES, SCOPE2_ALIASES, SCOPE3_ALIASES};
use crate::excel::{cell_number, cell_to_string, Table, DEVICE_TOP10, INTENSITY, OVERVIEW, SCOPE_SHARE, SCOPE_SUMMARY};
use crate::server::AppState;
use crate::server_handlers::number_at;

const DEVICE_VALUE_COLUMNS: &[&str] = &["日", "日碳排", "日碳排量", "碳排日", "电耗_日"];
const TOP_N: usize = 10;

/// POST /api/dashboard/overview
///
/// Total en toneladas, agua tratada, intensidad por m³ y reducción prevista (t).
pub async fn overview_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&OVERVIEW).await?;
    let row = period_row(&table, period)?;

    let total_kg = number_at(&table, row, "总碳排_kgCO2e")?;
    let water_m3 = number_at(&table, row, "水处理量_m3")?;
    let intensity = number_at(&table, row, "单位水处理强度_kgCO2e_per_m3")?;
    let reduction_kg = number_at(&table, row, "预计减排量_kgCO2e")?;

    Ok(envelope(json!({
        "monthTotalTp": total_kg / 1000.0,
        "proWaterVolume": water_m3,
        "proUnitWater": intensity,
        "emissionReduction": reduction_kg / 1000.0,
    })))
}

/// POST /api/dashboard/scope_summary
///
/// La hoja tiene títulos encima del encabezado real, así que se carga con
/// detección de encabezado y las columnas se localizan por alias.
pub async fn scope_summary_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SCOPE_SUMMARY).await?;

    table.require_pick(&PERIOD_ALIASES)?;
    let s1 = table.require_pick(&SCOPE1_ALIASES)?;
    let s2 = table.require_pick(&SCOPE2_ALIASES)?;
    let s3 = table.require_pick(&SCOPE3_ALIASES)?;

    let row = period_row(&table, period)?;
    let v1 = cell_number(Table::cell(row, s1));
    let v2 = cell_number(Table::cell(row, s2));
    let v3 = cell_number(Table::cell(row, s3));

    Ok(envelope(json!({
        "xAxis": ["范围1", "范围2", "范围3"],
        "yAxis": ["直接排放", "间接排放"],
        "data1": [v1, 0.0],
        "data2": [0.0, v2],
        "data3": [0.0, v3],
    })))
}

/// POST /api/dashboard/unit_intensity
///
/// Devuelve todas las filas; `timeType` solo se valida.
pub async fn unit_intensity_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    body.period()?;
    let table = state.table(&INTENSITY).await?;
    table.require_column("周期")?;
    let water = table.require_column("水处理量_m3")?;
    let intensity = table.require_column("单位水处理强度_kgCO2e_per_m3")?;

    let source: Vec<_> = table
        .rows()
        .map(|row| {
            json!({
                "总处理水量": cell_number(Table::cell(row, water)),
                "单位处理强度": cell_number(Table::cell(row, intensity)),
            })
        })
        .collect();

    Ok(envelope(json!({
        "dimensions": ["总处理水量", "单位处理强度"],
        "source": source,
        "dimensionsMapping": ["总处理水量", "单位处理强度"],
    })))
}

/// POST /api/dashboard/scope_share
pub async fn scope_share_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SCOPE_SHARE).await?;
    let row = period_row(&table, period)?;

    let mut source = Vec::with_capacity(3);
    for n in 1..=3 {
        let share = number_at(&table, row, &format!("范围{}占比(%)", n))?;
        source.push(json!({ "name": format!("范围{}", n), "data": share }));
    }

    Ok(envelope(json!({
        "dimensions": ["name", "data"],
        "source": source,
        "dimensionsMapping": ["name", "data"],
    })))
}

/// GET /api/process/device_top10
///
/// Las primeras diez filas con nombre de equipo, en el orden de la hoja.
/// Si varias columnas encajan como nombre o valor se usa la última.
pub async fn device_top10_handler(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let table = state.table(&DEVICE_TOP10).await?;
    let name_col = table
        .find_last_column(|c| c.contains("设备") && c.contains('名'))
        .ok_or_else(|| ApiError::schema(table.name(), "设备名称"))?;
    let value_col = table
        .find_last_column(|c| DEVICE_VALUE_COLUMNS.contains(&c))
        .ok_or_else(|| ApiError::schema(table.name(), "日"))?;

    let data: Vec<_> = table
        .rows()
        .filter_map(|row| {
            let name = cell_to_string(Table::cell(row, name_col)).trim().to_string();
            if name.is_empty() || name.eq_ignore_ascii_case("nan") {
                return None;
            }
            Some(json!({ "name": name, "value": cell_number(Table::cell(row, value_col)) }))
        })
        .take(TOP_N)
        .collect();

    Ok(envelope(json!(data)))
}
