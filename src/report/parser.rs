//! Extracción por expresiones regulares sobre los informes de diagnóstico.
//!
//! Las funciones `extract_*` son estrictas: si falta lo esperado devuelven
//! `ApiError::Parse` y nunca resultados parciales. Las funciones `scan_*`
//! devuelven cada campo por separado (`Option`) para los endpoints que
//! degradan a valores de demostración.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// Caracteres que se examinan tras la cabecera de una estrategia.
pub const STRATEGY_WINDOW_CHARS: usize = 600;

pub const STRATEGY_CODES: [(u32, &str); 3] = [(1, "策略一"), (2, "策略二"), (3, "策略三")];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: u32,
    pub label: String,
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strategy {
    pub code: String,
    pub title: String,
    pub reduction_kg_per_year: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub green_power_kg: f64,
    pub total_potential_kg_per_year: f64,
    pub grade: String,
}

/// Resultado campo a campo de `scan_evaluation`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationScan {
    pub green_power_kg: Option<f64>,
    pub total_potential_kg_per_year: Option<f64>,
    pub grade: Option<String>,
}

impl From<Evaluation> for EvaluationScan {
    fn from(e: Evaluation) -> Self {
        EvaluationScan {
            green_power_kg: Some(e.green_power_kg),
            total_potential_kg_per_year: Some(e.total_potential_kg_per_year),
            grade: Some(e.grade),
        }
    }
}

impl EvaluationScan {
    pub fn is_empty(&self) -> bool {
        self.green_power_kg.is_none() && self.total_potential_kg_per_year.is_none() && self.grade.is_none()
    }
}

fn re_ranked() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"第\s*(\d+)\s*名\s*[:：]\s*(.+?)\s*[-－—]\s*([\d,]+(?:\.\d+)?)\s*(\S+/\S+)")
            .expect("regex de ranking")
    })
}

fn re_strategy_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"策略\s*(\d)\s*[:：][ \t　]*([^\r\n]*)").expect("regex de estrategia"))
}

fn re_reduction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"预计降碳\s*[:：]\s*([\d,\.]+)\s*kgCO2e/年").expect("regex de reducción"))
}

fn re_yearly_reduction() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"年[^\r\n]*?([\d,]+(?:\.\d+)?)\s*kgCO2e/年").expect("regex de reducción anual"))
}

fn re_green_power() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"绿电碳减排\s*[:：]\s*([\d,\.]+)\s*kg").expect("regex de energía verde"))
}

fn re_total_potential() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"总降碳潜力\s*[:：]\s*([\d,\.]+)\s*kgCO2e/年").expect("regex de potencial"))
}

fn re_grade() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"绿色低碳等级\s*[:：]\s*(\S+)").expect("regex de grado"))
}

/// Convierte un literal numérico quitando separadores de miles.
pub fn parse_number(literal: &str) -> ApiResult<f64> {
    let cleaned: String = literal.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| ApiError::Parse(format!("无法解析数值：{:?}", literal)))
}

/// Líneas `第N名: etiqueta - NÚMERO unidad/periodo`, ordenadas por N.
pub fn extract_ranked(section: &str) -> ApiResult<Vec<RankedEntry>> {
    let mut entries = Vec::new();
    for line in section.lines() {
        let Some(caps) = re_ranked().captures(line) else { continue };
        let rank = caps[1]
            .parse::<u32>()
            .map_err(|_| ApiError::Parse(format!("无法解析名次：{:?}", &caps[1])))?;
        entries.push(RankedEntry {
            rank,
            label: caps[2].trim().to_string(),
            value: parse_number(&caps[3])?,
            unit: caps[4].to_string(),
        });
    }
    if entries.is_empty() {
        return Err(ApiError::Parse("未找到任何排名条目（第N名: 名称 - 数值 单位）".to_string()));
    }
    entries.sort_by_key(|e| e.rank);
    Ok(entries)
}

fn clean_title(raw: &str) -> String {
    raw.replace("方法:", "").replace("方法：", "").trim().to_string()
}

/// Sección de texto de hasta `STRATEGY_WINDOW_CHARS` caracteres a partir de `from`.
fn window(text: &str, from: usize) -> &str {
    let rest = &text[from..];
    match rest.char_indices().nth(STRATEGY_WINDOW_CHARS) {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}

/// Cabecera `策略N: título` y el texto que la sigue.
struct StrategyBlock<'a> {
    /// Vacío cuando la cabecera no trae título.
    title: String,
    body: &'a str,
}

fn strategy_block(section: &str, id: u32) -> Option<StrategyBlock<'_>> {
    let caps = re_strategy_header()
        .captures_iter(section)
        .find(|c| c[1].parse::<u32>().ok() == Some(id))?;
    let title = clean_title(&caps[2]);
    let (start, header_end) = caps.get(0).map(|m| (m.start(), m.end()))?;
    // la ventana no cruza la cabecera de la siguiente estrategia
    let mut body = window(section, start);
    if let Some(next) = re_strategy_header().find_at(section, header_end) {
        let limit = next.start() - start;
        if limit < body.len() {
            body = &body[..limit];
        }
    }
    Some(StrategyBlock { title, body })
}

/// Las tres estrategias con título y reducción prevista; falta cualquiera → error.
pub fn extract_strategies(section: &str) -> ApiResult<Vec<Strategy>> {
    let mut out = Vec::with_capacity(STRATEGY_CODES.len());
    for (id, code) in STRATEGY_CODES {
        let block = strategy_block(section, id)
            .filter(|b| !b.title.is_empty())
            .ok_or_else(|| ApiError::Parse(format!("缺少策略{}的标题", id)))?;
        let caps = re_reduction()
            .captures(block.body)
            .ok_or_else(|| ApiError::Parse(format!("策略{}缺少“预计降碳”", id)))?;
        out.push(Strategy {
            code: code.to_string(),
            title: block.title,
            reduction_kg_per_year: parse_number(&caps[1])?,
        });
    }
    Ok(out)
}

/// Estrategias legibles una a una; las que no tienen reducción se omiten.
///
/// Una cabecera sin título se llama `策略N`, y sin `预计降碳` se acepta
/// cualquier línea con `年 … NÚMERO kgCO2e/年` (年降碳量, 年减排…).
pub fn scan_strategies(section: &str) -> Vec<Strategy> {
    STRATEGY_CODES
        .iter()
        .filter_map(|(id, code)| {
            let block = strategy_block(section, *id)?;
            let value = first_number(re_reduction(), block.body)
                .or_else(|| first_number(re_yearly_reduction(), block.body))?;
            let title = if block.title.is_empty() { format!("策略{}", id) } else { block.title };
            Some(Strategy { code: code.to_string(), title, reduction_kg_per_year: value })
        })
        .collect()
}

fn first_number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text).and_then(|c| parse_number(&c[1]).ok())
}

/// Busca los tres indicadores de evaluación de forma independiente.
/// Si el grado aparece varias veces gana la última aparición.
pub fn scan_evaluation(section: &str) -> EvaluationScan {
    EvaluationScan {
        green_power_kg: first_number(re_green_power(), section),
        total_potential_kg_per_year: first_number(re_total_potential(), section),
        grade: re_grade()
            .captures_iter(section)
            .last()
            .map(|c| c[1].trim().to_string()),
    }
}

pub fn extract_evaluation(section: &str) -> ApiResult<Evaluation> {
    let scan = scan_evaluation(section);
    let missing: Vec<&str> = [
        ("绿电碳减排", scan.green_power_kg.is_none()),
        ("总降碳潜力", scan.total_potential_kg_per_year.is_none()),
        ("绿色低碳等级", scan.grade.is_none()),
    ]
    .into_iter()
    .filter(|(_, absent)| *absent)
    .map(|(name, _)| name)
    .collect();

    match (scan.green_power_kg, scan.total_potential_kg_per_year, scan.grade) {
        (Some(green), Some(total), Some(grade)) => Ok(Evaluation {
            green_power_kg: green,
            total_potential_kg_per_year: total,
            grade,
        }),
        _ => Err(ApiError::Parse(format!("评估缺少字段：{}", missing.join("、")))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
策略1: 方法: 清水池调蓄优化
  说明: 夜间低谷蓄水
  预计降碳: 2,273,923 kgCO2e/年
策略2：泵站频率优化
  预计降碳：1,000.5 kgCO2e/年
策略3: 提升光伏自用率
  预计降碳: 300 kgCO2e/年
绿电碳减排: 39,520 kgCO2e
绿色低碳等级: 中
总降碳潜力: 7,922,454 kgCO2e/年
绿色低碳等级: 高
";

    #[test]
    fn ranking_ordenado_por_puesto() {
        let text = "第2名: 取水泵站 - 12345.67 kgCO2e/天\n说明\n第1名: 原水提升泵房 - 41532.84 kgCO2e/天";
        let r = extract_ranked(text).unwrap();
        assert_eq!(r.len(), 2);
        assert_eq!((r[0].rank, r[0].label.as_str(), r[0].value), (1, "原水提升泵房", 41532.84));
        assert_eq!((r[1].rank, r[1].label.as_str(), r[1].value), (2, "取水泵站", 12345.67));
        assert_eq!(r[0].unit, "kgCO2e/天");
    }

    #[test]
    fn ranking_con_separadores_y_dos_puntos_anchos() {
        let r = extract_ranked("第1名：臭氧车间 - 1,234.5 kgCO2e/月").unwrap();
        assert_eq!(r[0].value, 1234.5);
        assert_eq!(r[0].label, "臭氧车间");
    }

    #[test]
    fn ranking_sin_coincidencias_es_error() {
        assert!(matches!(extract_ranked("没有排名\n第一名 无"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn estrategias_completas() {
        let s = extract_strategies(REPORT).unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s[0].code, "策略一");
        assert_eq!(s[0].title, "清水池调蓄优化");
        assert_eq!(s[0].reduction_kg_per_year, 2_273_923.0);
        assert_eq!(s[1].title, "泵站频率优化");
        assert_eq!(s[1].reduction_kg_per_year, 1000.5);
    }

    #[test]
    fn estrategia_sin_valor_falla_todo() {
        let text = "策略1: A\n预计降碳: 1 kgCO2e/年\n策略2: B\n策略3: C\n预计降碳: 3 kgCO2e/年";
        assert!(matches!(extract_strategies(text), Err(ApiError::Parse(_))));
        let partial = scan_strategies(text);
        assert_eq!(partial.iter().map(|s| s.code.as_str()).collect::<Vec<_>>(), ["策略一", "策略三"]);
    }

    #[test]
    fn titulo_vacio_y_reduccion_anual_en_lectura_tolerante() {
        let text = "策略1:   \n预计降碳: 10 kgCO2e/年\n策略2: 泵站优化\n年降碳量约 2,500 kgCO2e/年";
        let s = scan_strategies(text);
        assert_eq!(s.len(), 2);
        assert_eq!((s[0].code.as_str(), s[0].title.as_str()), ("策略一", "策略1"));
        assert_eq!(s[0].reduction_kg_per_year, 10.0);
        assert_eq!(s[1].title, "泵站优化");
        assert_eq!(s[1].reduction_kg_per_year, 2500.0);
        // la lectura estricta sigue exigiendo título y 预计降碳
        assert!(matches!(extract_strategies(text), Err(ApiError::Parse(_))));
    }

    #[test]
    fn valor_fuera_de_ventana_no_cuenta() {
        let text = format!("策略1: A\n{}\n预计降碳: 1 kgCO2e/年", "x".repeat(700));
        assert!(scan_strategies(&text).is_empty());
    }

    #[test]
    fn evaluacion_ultimo_grado_gana() {
        let e = extract_evaluation(REPORT).unwrap();
        assert_eq!(e.green_power_kg, 39_520.0);
        assert_eq!(e.total_potential_kg_per_year, 7_922_454.0);
        assert_eq!(e.grade, "高");
    }

    #[test]
    fn evaluacion_incompleta() {
        let err = extract_evaluation("绿色低碳等级: 低").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("绿电碳减排") && msg.contains("总降碳潜力"));
        let scan = scan_evaluation("绿色低碳等级: 低");
        assert_eq!(scan.grade.as_deref(), Some("低"));
        assert!(!scan.is_empty());
    }

    #[test]
    fn numero_invalido_nombra_el_literal() {
        let err = parse_number("1.2.3").unwrap_err();
        assert!(err.to_string().contains("1.2.3"));
    }
}
