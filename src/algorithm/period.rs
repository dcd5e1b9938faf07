//! Periodos de agregación (día, semana, mes, año) y su código externo 1..4.

use calamine::Data;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::excel::io::cell_to_string;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    /// 1 → día, 2 → semana, 3 → mes, 4 → año; cualquier otro código es inválido.
    pub fn from_code(code: i64) -> ApiResult<Period> {
        match code {
            1 => Ok(Period::Day),
            2 => Ok(Period::Week),
            3 => Ok(Period::Month),
            4 => Ok(Period::Year),
            other => Err(ApiError::InvalidArgument(format!("timeType 必须为 1/2/3/4，收到 {}", other))),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Period::Day => 1,
            Period::Week => 2,
            Period::Month => 3,
            Period::Year => 4,
        }
    }

    /// Etiqueta canónica, también usada como sufijo de columna (`合计_日`).
    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "日",
            Period::Week => "周",
            Period::Month => "月",
            Period::Year => "年",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Nombre de la columna por periodo: `column("合计")` → `合计_年`.
    pub fn column(self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.label())
    }

    /// Periodos por año; usado para repartir magnitudes anuales.
    pub fn per_year(self) -> f64 {
        match self {
            Period::Day => 365.0,
            Period::Week => 52.0,
            Period::Month => 12.0,
            Period::Year => 1.0,
        }
    }

    /// Normaliza el valor de periodo escrito en una hoja ("1", "日", "day", "Day"...).
    pub fn standardize(raw: &str) -> Option<Period> {
        match raw.trim() {
            "1" | "日" | "day" | "Day" => Some(Period::Day),
            "2" | "周" | "week" | "Week" => Some(Period::Week),
            "3" | "月" | "month" | "Month" => Some(Period::Month),
            "4" | "年" | "year" | "Year" => Some(Period::Year),
            _ => None,
        }
    }

    pub fn standardize_cell(cell: &Data) -> Option<Period> {
        Period::standardize(&cell_to_string(cell))
    }
}

pub fn resolve(code: i64) -> ApiResult<Period> {
    Period::from_code(code)
}

pub fn suffix(code: i64) -> ApiResult<&'static str> {
    Ok(Period::from_code(code)?.label())
}
