//! Totales y porcentajes por tramo, uniendo las hojas de dentro y fuera de la planta.

use std::collections::BTreeMap;

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::algorithm::segment::SEGMENT_COL;
use crate::algorithm::Period;
use crate::api_json::{envelope, TimeBody};
use crate::error::ApiResult;
use crate::excel::{cell_number, cell_to_string, Table, INNER_SECTIONS, OUTER_SECTIONS};
use crate::server::AppState;

/// Suma `column` por tramo sobre ambas hojas; el resultado sale ordenado por nombre.
pub fn merge_sections(tables: &[&Table], column: &str) -> ApiResult<BTreeMap<String, f64>> {
    let mut merged = BTreeMap::new();
    for table in tables {
        let seg = table.require_column(SEGMENT_COL)?;
        let col = table.require_column(column)?;
        for row in table.rows() {
            let name = cell_to_string(Table::cell(row, seg)).trim().to_string();
            if name.is_empty() {
                continue;
            }
            *merged.entry(name).or_insert(0.0) += cell_number(Table::cell(row, col));
        }
    }
    Ok(merged)
}

async fn section_dataset(state: &AppState, period: Period, prefix: &str) -> ApiResult<HttpResponse> {
    let inner = state.table(&INNER_SECTIONS).await?;
    let outer = state.table(&OUTER_SECTIONS).await?;
    let merged = merge_sections(&[&inner, &outer], &period.column(prefix))?;

    let source: Vec<_> = merged.into_iter().map(|(name, data)| json!({ "name": name, "data": data })).collect();
    Ok(envelope(json!({
        "dimensions": ["name", "data"],
        "source": source,
        "dimensionsMapping": ["name", "data"],
    })))
}

/// POST /api/process/section_total
pub async fn section_total_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    section_dataset(&state, period, "合计").await
}

/// POST /api/process/section_share
pub async fn section_share_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    section_dataset(&state, period, "占比").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    #[test]
    fn union_ordenada_y_sumada() {
        let inner = Table::from_rows(
            "水厂内_分段",
            &["工艺段", "合计_年"],
            vec![
                vec![Data::String("过滤段".into()), Data::Float(10.0)],
                vec![Data::String("预处理段".into()), Data::Float(5.0)],
            ],
        );
        let outer = Table::from_rows(
            "水厂外_分段",
            &["工艺段", "合计_年"],
            vec![
                vec![Data::String("供水段".into()), Data::Float(7.0)],
                vec![Data::String("过滤段".into()), Data::Float(1.5)],
            ],
        );
        let merged = merge_sections(&[&inner, &outer], "合计_年").unwrap();
        let names: Vec<&str> = merged.keys().map(String::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(merged["过滤段"], 11.5);
        assert_eq!(merged.len(), 3);
    }
}
