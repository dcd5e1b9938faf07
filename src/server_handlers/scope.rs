//! Desglose por ámbito: O3 (范围1), electricidad (范围2), químicos y lodos (范围3).

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::algorithm::{period_row, period_row_in, select, sum, Filter, Matcher, Period};
use crate::api_json::{envelope, TimeBody};
use crate::error::{ApiError, ApiResult};
use crate::excel::{
    cell_number, cell_to_string, Table, ELECTRICITY_KWH, INNER_SECTIONS, OUTER_SECTIONS, SCOPE1_O3, SCOPE3_ITEMS, SCOPE3_SUMMARY,
    SLUDGE, TOTAL_SUMMARY,
};
use crate::server::AppState;
use crate::server_handlers::number_at;

const CHEMICALS: [&str; 4] = ["O3", "次氯酸钠", "PAC", "PAM"];
const RAW_WATER_SEGMENT: &str = "原水取水段";
const SUPPLY_SEGMENT: &str = "供水段";
const SLUDGE_LABEL_STYLE: &str = "color:#F9DA68";

/// Texto con la representación corta de un flotante, conservando `.0` en enteros (`12.0`).
///
/// Fuera de `1e-4 <= |x| < 1e16` se usa notación exponencial con signo y al
/// menos dos dígitos de exponente (`1e-05`, `1.5e+16`), como el frontend
/// recibía antes.
pub fn float_text(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    let sci = format!("{:e}", x);
    if let Some((mantissa, exp)) = sci.split_once('e') {
        if let Ok(exp) = exp.parse::<i32>() {
            if x != 0.0 && (exp < -4 || exp >= 16) {
                let sign = if exp < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exp.abs());
            }
        }
    }
    if x.fract() == 0.0 { format!("{:.1}", x) } else { format!("{}", x) }
}

/// POST /api/scope/scope_1
///
/// Los tres valores se devuelven como texto, tal como los pinta el frontend.
pub async fn scope_1_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SCOPE1_O3).await?;
    let row = period_row_in(&table, Some("period"), period)?;

    Ok(envelope(json!({
        "leakageCarbonEmissions": float_text(number_at(&table, row, "O3泄漏碳排放量_kgCO2e")?),
        "dosage": float_text(number_at(&table, row, "O3投加量_kg")?),
        "leakageAmount": float_text(number_at(&table, row, "O3泄漏量_kg")?),
    })))
}

/// POST /api/scope/scope_2
///
/// Filas ausentes cuentan como 0; solo las columnas ausentes son error.
pub async fn scope_2_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let elec_col = period.column("电耗");
    let kwh_col = period.column("kWh");

    let summary = state.table(&TOTAL_SUMMARY).await?;
    let total = sum(&summary, &Filter::new().period(Some("周期"), period), "范围2(kgCO2e)")?;

    let inner = state.table(&INNER_SECTIONS).await?;
    let plant_elec_ce = sum(&inner, &Filter::new(), &elec_col)?;

    let total_kwh = state.config.total_electricity_kwh_year / period.per_year();

    let outer = state.table(&OUTER_SECTIONS).await?;
    let qsd_ce = sum(&outer, &Filter::new().exact("工艺段", RAW_WATER_SEGMENT), &elec_col)?;
    let ssd_ce = sum(&outer, &Filter::new().exact("工艺段", SUPPLY_SEGMENT), &elec_col)?;

    let kwh = state.table(&ELECTRICITY_KWH).await?;
    let by_segment = |segment: &'static str| Filter::new().exact("层级", "分段").exact("工艺段", segment);
    let qsd_kwh = sum(&kwh, &by_segment(RAW_WATER_SEGMENT), &kwh_col)?;
    let ssd_kwh = sum(&kwh, &by_segment(SUPPLY_SEGMENT), &kwh_col)?;

    Ok(envelope(json!({
        "totalCarbonEmissions": total,
        "totalPlantElectricityConsumptionCarbonEmissions": plant_elec_ce,
        "totalElectricityConsumption": total_kwh,
        "offSiteElectricityConsumptionCarbonEmissions": qsd_ce + ssd_ce,
        "qsdElectricityConsumption": qsd_kwh,
        "qsdElectricityConsumptionCarbonEmissions": qsd_ce,
        "ssdElectricityConsumption": ssd_kwh,
        "ssdElectricityConsumptionCarbonEmissions": ssd_ce,
    })))
}

/// POST /api/scope/scope_3
pub async fn scope_3_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SCOPE3_SUMMARY).await?;
    let row = period_row(&table, period)?;

    let total = number_at(&table, row, "范围3总碳排放量(kgCO2e)")?;
    let chem = number_at(&table, row, "药剂碳排总量(kgCO2e)")?;
    let sludge = number_at(&table, row, "污泥运输碳排放量(kgCO2e)")?;
    let share_chem = number_at(&table, row, "药剂碳排占比")?;
    let share_sludge = number_at(&table, row, "污泥运输占比")?;

    Ok(envelope(json!({
        "totalCarbonEmissions": total,
        "carbonEmissionsChemicalAgents": chem,
        "carbonEmissionsSludgeTransportation": sludge,
        "shareChemicalAgents": share_chem,
        "shareSludgeTransportation": share_sludge,
        "chart": {
            "dimensions": ["name", "data"],
            "source": [
                { "name": "药剂碳排", "data": chem },
                { "name": "污泥运输", "data": sludge },
            ],
        },
    })))
}

/// Dosis y emisión de cada químico en el orden fijo O3, 次氯酸钠, PAC, PAM.
///
/// La dosis sale de la primera columna que contiene "投加量"; sin ella es 0.
/// Un químico sin fila cuenta 0 en ambas series.
pub fn chem_breakdown(table: &Table, period: Period) -> ApiResult<(Vec<f64>, Vec<f64>)> {
    let kind = table.require_column("药剂或污泥运输")?;
    let carbon = table.require_column("碳排放量(kgCO2e)")?;
    let dose = table.find_column(|c| c.contains("投加量"));

    let rows = select(table, &Filter::new().period(Some("周期"), period))?;
    if rows.is_empty() {
        return Err(ApiError::NotFound(format!("未找到周期={}的数据", period.label())));
    }

    let mut doses = Vec::with_capacity(CHEMICALS.len());
    let mut emissions = Vec::with_capacity(CHEMICALS.len());
    for name in CHEMICALS {
        let found = rows.iter().find(|row| Matcher::Exact(name).matches(&cell_to_string(Table::cell(row, kind))));
        match found {
            Some(row) => {
                emissions.push(cell_number(Table::cell(row, carbon)));
                doses.push(dose.map(|d| cell_number(Table::cell(row, d))).unwrap_or(0.0));
            }
            None => {
                emissions.push(0.0);
                doses.push(0.0);
            }
        }
    }
    Ok((doses, emissions))
}

/// POST /api/scope/scope_3/chem
pub async fn scope_3_chem_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SCOPE3_ITEMS).await?;
    let (doses, emissions) = chem_breakdown(&table, period)?;
    let total: f64 = emissions.iter().sum();

    Ok(envelope(json!({
        "totalCarbonEmissionsChemicalAgents": total,
        "chart": {
            "xAxis": ["投加量", "碳排放量"],
            "yAxis": CHEMICALS,
            "data1": doses,
            "data2": emissions,
        },
    })))
}

fn sludge_label(name: &str) -> String {
    format!("<div style='{}'>{}</div>", SLUDGE_LABEL_STYLE, name)
}

/// POST /api/scope/scope_3/sludge
pub async fn scope_3_sludge_handler(state: web::Data<AppState>, body: web::Json<TimeBody>) -> ApiResult<HttpResponse> {
    let period = body.period()?;
    let table = state.table(&SLUDGE).await?;
    let row = period_row_in(&table, Some("period"), period)?;

    let carbon = number_at(&table, row, "污泥运输碳排放量_kgCO2e")?;
    let sludge_t = number_at(&table, row, "污泥量_吨")?;
    let solids_pct = number_at(&table, row, "含固率_%")?;
    let distance_km = number_at(&table, row, "运输距离_km")?;

    Ok(envelope(json!({
        "carbonEmissionsSludgeTransportation": format!("{:.6}", carbon),
        "chart": [
            [sludge_label("污泥量"), format!("{:.2} 吨", sludge_t)],
            [sludge_label("含固率"), format!("{:.2}%", solids_pct)],
            [sludge_label("运输距离"), format!("{:.2} km", distance_km)],
        ],
    })))
}
