//! Utilidades de celdas y encabezados sobre los tipos de calamine.

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Convierte una celda a String. Los flotantes enteros se imprimen sin decimales.
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.is_finite() && (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
    }
}

/// Valor numérico de una celda; vacíos, textos no numéricos y errores cuentan como 0.0.
pub fn cell_number(c: &Data) -> f64 {
    cell_number_opt(c).unwrap_or(0.0)
}

/// Igual que `cell_number` pero distingue "sin número" de cero.
pub fn cell_number_opt(c: &Data) -> Option<f64> {
    match c {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => parse_loose_number(s),
        Data::DateTime(d) => Some(d.as_f64()),
        _ => None,
    }
}

/// Lee un número escrito a mano: admite separadores de miles, `%` final y
/// trata "", "-", "--", "—" y "nan" como ausentes.
pub fn parse_loose_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || matches!(s, "-" | "--" | "—" | "nan" | "NaN") {
        return None;
    }
    let cleaned: String = s.trim_end_matches('%').chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normaliza un encabezado para compararlo:
/// `：（）` pasan a ASCII, se borra todo `(...)`, se quitan espacios y los `:` finales.
pub fn normalize_header(raw: &str) -> String {
    let ascii: String = raw
        .chars()
        .map(|c| match c {
            '：' => ':',
            '（' => '(',
            '）' => ')',
            other => other,
        })
        .collect();

    let mut without_parens = String::with_capacity(ascii.len());
    let mut rest = ascii.as_str();
    while let Some(open) = rest.find('(') {
        match rest[open..].find(')') {
            Some(close) => {
                without_parens.push_str(&rest[..open]);
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    without_parens.push_str(rest);

    let compact: String = without_parens.chars().filter(|c| !c.is_whitespace()).collect();
    compact.trim_end_matches(':').to_string()
}

/// Conjunto ordenado de alias que identifican una misma columna lógica.
#[derive(Debug, Clone, Copy)]
pub struct AliasSet {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

pub const PERIOD_ALIASES: AliasSet = AliasSet {
    canonical: "周期",
    aliases: &["周期", "Period", "period", "频率", "时间", "timeType", "TimeType"],
};
pub const SCOPE1_ALIASES: AliasSet = AliasSet {
    canonical: "范围1",
    aliases: &["范围1", "Scope1", "scope1", "S1", "scope 1"],
};
pub const SCOPE2_ALIASES: AliasSet = AliasSet {
    canonical: "范围2",
    aliases: &["范围2", "Scope2", "scope2", "S2", "scope 2"],
};
pub const SCOPE3_ALIASES: AliasSet = AliasSet {
    canonical: "范围3",
    aliases: &["范围3", "Scope3", "scope3", "S3", "scope 3"],
};

/// Tokens de ámbito que, junto con un alias de periodo, delatan la fila de encabezado.
pub const SCOPE_TOKENS: &[&str] = &["范围", "Scope", "scope"];

/// Busca la columna de un `AliasSet` entre encabezados ya normalizados.
///
/// Primero se prueba igualdad exacta con cada alias (en orden); si ninguno
/// coincide se recorre de nuevo la lista buscando contención. Gana la primera
/// coincidencia, de modo que el resultado es determinista.
pub fn pick_column(columns: &[String], set: &AliasSet) -> Option<usize> {
    let aliases: Vec<String> = set.aliases.iter().map(|a| normalize_header(a)).collect();
    for alias in &aliases {
        if let Some(idx) = columns.iter().position(|c| c == alias) {
            return Some(idx);
        }
    }
    for alias in &aliases {
        if let Some(idx) = columns.iter().position(|c| c.contains(alias.as_str())) {
            return Some(idx);
        }
    }
    None
}

/// Número de serie de Excel (base 1899-12-30) a fecha-hora.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(Duration::milliseconds(millis))
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y年%m月%d日"];
/// Periodos mensuales; se interpretan como el día 1 del mes.
const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%Y年%m月"];

/// Años que una celda numérica entera puede representar por sí sola.
const YEAR_RANGE: std::ops::RangeInclusive<i64> = 1900..=2200;

fn year_start(year: i64) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, 1, 1)?.and_hms_opt(0, 0, 0)
}

/// Interpreta una celda como instante: fechas de Excel, seriales o texto.
///
/// Un entero entre 1900 y 2200 es un año (hojas anuales), no un serial.
pub fn cell_datetime(c: &Data) -> Option<NaiveDateTime> {
    match c {
        Data::DateTime(d) => excel_serial_to_datetime(d.as_f64()),
        Data::Float(f) if f.fract() == 0.0 && YEAR_RANGE.contains(&(*f as i64)) => year_start(*f as i64),
        Data::Int(i) if YEAR_RANGE.contains(i) => year_start(*i),
        Data::Float(f) => excel_serial_to_datetime(*f),
        Data::Int(i) => excel_serial_to_datetime(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_datetime_text(s),
        _ => None,
    }
}

fn parse_datetime_text(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    // fracciones de segundo que algunas exportaciones añaden
    let s = match s.find('.') {
        Some(dot) if s[..dot].contains(':') => &s[..dot],
        _ => s,
    };
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    // chrono no acepta fechas sin día: se completa con el día 1
    for fmt in MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{}|01", s), &format!("{}|%d", fmt)) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    let year = s.strip_suffix('年').unwrap_or(s);
    if year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()) {
        return year.parse::<i64>().ok().and_then(year_start);
    }
    None
}
