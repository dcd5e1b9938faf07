//! Cuerpos de petición y sobre de respuesta compartidos por los handlers.
//!
//! # Cuerpos aceptados
//! ```json
//! { "timeType": 4 }                 // POST con selección de periodo
//! { "qtype": 1, "timeType": 4 }     // POST de tendencia por tramo
//! ```
//! Las consultas GET aceptan `?timeType=1..4` (por defecto 4 = año).

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::algorithm::{round2, Period};
use crate::error::ApiResult;

/// Año, el periodo que usan los GET cuando no se indica `timeType`.
pub const DEFAULT_TIME_TYPE: i64 = 4;

fn default_time_type() -> i64 {
    DEFAULT_TIME_TYPE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBody {
    #[serde(rename = "timeType")]
    pub time_type: i64,
}

impl TimeBody {
    pub fn period(&self) -> ApiResult<Period> {
        Period::from_code(self.time_type)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeQuery {
    #[serde(rename = "timeType", default = "default_time_type")]
    pub time_type: i64,
}

impl TimeQuery {
    pub fn period(&self) -> ApiResult<Period> {
        Period::from_code(self.time_type)
    }
}

impl Default for TimeQuery {
    fn default() -> Self {
        TimeQuery { time_type: DEFAULT_TIME_TYPE }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendBody {
    pub qtype: i64,
    #[serde(rename = "timeType")]
    pub time_type: i64,
}

impl TrendBody {
    pub fn period(&self) -> ApiResult<Period> {
        Period::from_code(self.time_type)
    }
}

/// `{code: 0, msg: "", data}` con los flotantes de `data` redondeados a 2 decimales.
pub fn envelope(data: Value) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "code": 0, "msg": "", "data": round2(data) }))
}
