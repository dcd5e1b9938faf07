//! Carbono de la red de tuberías por punto de presión (ventana del mapa).

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::algorithm::Period;
use crate::api_json::TimeBody;
use crate::error::{ApiError, ApiResult};
use crate::excel::io::cell_datetime;
use crate::excel::{
    cell_number, cell_to_string, SheetSelector, Table, TableSource, NETWORK_DAILY, NETWORK_MONTHLY, NETWORK_WEEKLY,
    NETWORK_YEARLY,
};
use crate::server::AppState;

const MONITOR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointCarbon {
    pub name: String,
    pub carbon_kg: f64,
    pub monitor_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsResponse {
    pub time_type: i64,
    pub sheet: &'static str,
    pub count: usize,
    pub data: Vec<PointCarbon>,
}

pub fn network_source(period: Period) -> TableSource {
    match period {
        Period::Day => NETWORK_DAILY,
        Period::Week => NETWORK_WEEKLY,
        Period::Month => NETWORK_MONTHLY,
        Period::Year => NETWORK_YEARLY,
    }
}

/// Último registro de cada punto, ordenado por nombre de punto.
///
/// La columna de tiempo es `period` o, en su defecto, `ts`. Las filas sin
/// punto o con fecha ilegible se descartan; a igual fecha gana la fila posterior.
pub fn latest_per_point(table: &Table) -> ApiResult<Vec<PointCarbon>> {
    let point = table.require_column("point")?;
    let carbon = table.require_column("CO2e_kg")?;
    let time = table
        .column_index("period")
        .or_else(|| table.column_index("ts"))
        .ok_or_else(|| ApiError::schema(table.name(), "period/ts"))?;

    let mut latest: BTreeMap<String, (NaiveDateTime, f64)> = BTreeMap::new();
    for row in table.rows() {
        let name = cell_to_string(Table::cell(row, point)).trim().to_string();
        if name.is_empty() {
            continue;
        }
        let Some(ts) = cell_datetime(Table::cell(row, time)) else {
            continue;
        };
        let value = cell_number(Table::cell(row, carbon));
        match latest.get(&name) {
            Some((seen, _)) if *seen > ts => {}
            _ => {
                latest.insert(name, (ts, value));
            }
        }
    }

    Ok(latest
        .into_iter()
        .map(|(name, (ts, carbon_kg))| PointCarbon {
            name,
            carbon_kg,
            monitor_time: ts.format(MONITOR_TIME_FORMAT).to_string(),
        })
        .collect())
}

/// POST /api/network/points-carbon
///
/// Respuesta sin sobre `{code,msg,data}`: el mapa consume el objeto tal cual.
pub async fn network_points_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let source = network_source(period);
    let table = state.table(&source).await?;
    let data = latest_per_point(&table)?;

    let sheet = match source.sheet {
        SheetSelector::Name(name) => name,
        SheetSelector::Index(_) => "",
    };
    Ok(HttpResponse::Ok().json(PointsResponse { time_type: body.time_type, sheet, count: data.len(), data }))
}
