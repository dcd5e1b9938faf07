//! Panel "绿色低碳评估": datos en tiempo real, estrategias y evaluación.
//!
//! Se alimenta de `绿色低碳评估.txt`. Es la única familia de endpoints que
//! degrada: si el informe falta o no contiene nada reconocible se devuelve
//! el payload de demostración que usa el frontend.

use serde::Serialize;

use crate::report::parser::{
    extract_evaluation, extract_strategies, scan_evaluation, scan_strategies, EvaluationScan, Strategy,
};

pub const PARSED_HINT: &str = "已根据最新诊断结果生成低碳策略与等级";
const DEMO_TS: &str = "2025-08-20 20:35:00";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RealtimeProcessItem {
    pub name: String,
    pub carbon_kgco2e_per_h: f64,
    pub energy_kwh: f64,
    pub green_power_pct: f64,
    pub ts: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyItem {
    pub code: String,
    pub title: String,
    pub reduction_tco2e_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowCarbonEvaluation {
    pub yoy_change_pct: f64,
    pub green_power_contrib_tco2e: f64,
    pub carbon_sink_contrib: Vec<String>,
    pub reduction_potential_tco2e_per_year: f64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowCarbonDashboard {
    pub realtime: Vec<RealtimeProcessItem>,
    pub strategies: Vec<StrategyItem>,
    pub evaluation: LowCarbonEvaluation,
    pub hint: String,
}

fn realtime(name: &str, carbon: f64, energy: f64, green: f64) -> RealtimeProcessItem {
    RealtimeProcessItem {
        name: name.to_string(),
        carbon_kgco2e_per_h: carbon,
        energy_kwh: energy,
        green_power_pct: green,
        ts: DEMO_TS.to_string(),
    }
}

fn strategy(code: &str, title: &str, t: f64) -> StrategyItem {
    StrategyItem { code: code.to_string(), title: title.to_string(), reduction_tco2e_per_year: t }
}

pub fn demo_realtime() -> Vec<RealtimeProcessItem> {
    vec![
        realtime("预处理", 120.0, 500.0, 30.0),
        realtime("过滤", 90.0, 350.0, 25.0),
        realtime("清水池", 60.0, 200.0, 40.0),
    ]
}

pub fn demo_strategies() -> Vec<StrategyItem> {
    vec![
        strategy("策略一", "清水池调蓄提升", 80.0),
        strategy("策略二", "泵站频率优化", 50.0),
        strategy("策略三", "提升光伏自用率", 30.0),
    ]
}

pub fn demo_evaluation() -> LowCarbonEvaluation {
    LowCarbonEvaluation {
        yoy_change_pct: 90.0,
        green_power_contrib_tco2e: 150.0,
        carbon_sink_contrib: vec!["光伏".to_string(), "冷热能".to_string(), "中水回用".to_string()],
        reduction_potential_tco2e_per_year: 300.0,
        grade: "低".to_string(),
    }
}

pub fn demo_dashboard() -> LowCarbonDashboard {
    LowCarbonDashboard {
        realtime: demo_realtime(),
        strategies: demo_strategies(),
        evaluation: demo_evaluation(),
        hint: "预处理碳排较高，建议优化投药与能耗".to_string(),
    }
}

/// Lectura estricta del informe; si está incompleto se registra el motivo y
/// se recurre a la lectura tolerante campo a campo.
fn read_strategies(text: &str) -> Vec<Strategy> {
    extract_strategies(text).unwrap_or_else(|e| {
        log::warn!("estrategias incompletas en el informe ({}), lectura tolerante", e);
        scan_strategies(text)
    })
}

fn read_evaluation(text: &str) -> EvaluationScan {
    match extract_evaluation(text) {
        Ok(complete) => complete.into(),
        Err(e) => {
            log::warn!("evaluación incompleta en el informe ({}), lectura tolerante", e);
            scan_evaluation(text)
        }
    }
}

/// Estrategias del informe convertidas a tCO2e/año (vacío si no hay ninguna legible).
pub fn parse_strategies(text: &str) -> Vec<StrategyItem> {
    read_strategies(text)
        .into_iter()
        .map(|s| StrategyItem {
            code: s.code,
            title: s.title,
            reduction_tco2e_per_year: s.reduction_kg_per_year / 1000.0,
        })
        .collect()
}

/// Construye el panel desde el informe. `None` cuando no se reconoce ningún campo.
///
/// El informe no trae datos horarios ni variación interanual: `realtime`
/// sigue siendo el de demostración, `yoy_change_pct` es 0 y el aporte de
/// sumideros se limita a "光伏".
pub fn build_from_text(text: &str) -> Option<LowCarbonDashboard> {
    let strategies = parse_strategies(text);
    let eval = read_evaluation(text);
    if strategies.is_empty() && eval.is_empty() {
        return None;
    }

    let evaluation = LowCarbonEvaluation {
        yoy_change_pct: 0.0,
        green_power_contrib_tco2e: eval.green_power_kg.unwrap_or(0.0) / 1000.0,
        carbon_sink_contrib: vec!["光伏".to_string()],
        reduction_potential_tco2e_per_year: eval.total_potential_kg_per_year.unwrap_or(0.0) / 1000.0,
        grade: eval.grade.unwrap_or_else(|| "—".to_string()),
    };

    Some(LowCarbonDashboard {
        realtime: demo_realtime(),
        strategies: if strategies.is_empty() { demo_strategies() } else { strategies },
        evaluation,
        hint: PARSED_HINT.to_string(),
    })
}

pub fn dashboard(text: Option<&str>) -> LowCarbonDashboard {
    match text.and_then(build_from_text) {
        Some(built) => built,
        None => {
            log::warn!("informe de bajo carbono sin datos reconocibles, se usa demo");
            demo_dashboard()
        }
    }
}

pub fn strategies(text: Option<&str>) -> Vec<StrategyItem> {
    let parsed = text.map(parse_strategies).unwrap_or_default();
    if parsed.is_empty() { demo_strategies() } else { parsed }
}

pub fn evaluation(text: Option<&str>) -> LowCarbonEvaluation {
    dashboard(text).evaluation
}
