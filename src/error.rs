//! Errores del servicio y su traducción a respuestas HTTP.
//!
//! Todas las funciones falibles del crate devuelven `ApiResult<T>`; el error
//! se propaga sin modificar hasta actix, que lo serializa como
//! `{"detail": "..."}` con el código HTTP correspondiente.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

/// Número de caracteres del texto buscado que se incluyen en `SectionNotFound`.
const SNIPPET_CHARS: usize = 80;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Parámetro fuera de rango (timeType, qtype) o cuerpo mal formado.
    #[error("{0}")]
    InvalidArgument(String),

    /// El archivo de datos no existe en el directorio configurado.
    #[error("未找到数据文件：{0}")]
    FileMissing(String),

    /// El archivo existe pero no se pudo leer (hoja ausente, libro corrupto, sin encabezado).
    #[error("{0}")]
    DataSource(String),

    #[error("{table} 缺少列：{column}")]
    Schema { table: String, column: String },

    /// Ninguna fila para el periodo o categoría solicitada.
    #[error("{0}")]
    NotFound(String),

    /// Faltan filas que la hoja debería contener siempre.
    #[error("{0}")]
    DataIntegrity(String),

    #[error("未找到段落「{marker}」，文本开头：{snippet}")]
    SectionNotFound { marker: String, snippet: String },

    #[error("{0}")]
    Parse(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn schema(table: impl Into<String>, column: impl Into<String>) -> Self {
        ApiError::Schema { table: table.into(), column: column.into() }
    }

    /// Construye `SectionNotFound` con un prefijo corto del texto donde se buscó.
    pub fn section_not_found(marker: &str, text: &str) -> Self {
        let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
        ApiError::SectionNotFound {
            marker: marker.to_string(),
            snippet: snippet.replace(['\r', '\n'], " "),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            ApiError::FileMissing(_) | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DataSource(_)
            | ApiError::Schema { .. }
            | ApiError::DataIntegrity(_)
            | ApiError::SectionNotFound { .. }
            | ApiError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{} {}", status.as_u16(), self);
        } else {
            log::warn!("{} {}", status.as_u16(), self);
        }
        HttpResponse::build(status).json(json!({ "detail": self.to_string() }))
    }
}

/// Cuerpos JSON inválidos se reportan como 400 con el mismo formato `detail`.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidArgument(format!("请求体格式错误：{}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::InvalidArgument(format!("查询参数错误：{}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_por_variante() {
        assert_eq!(ApiError::InvalidArgument("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::FileMissing("a.xlsx".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::DataSource("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::schema("t", "c").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::Parse("x".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn snippet_recortado_a_80_caracteres() {
        let text = "诊".repeat(200);
        match ApiError::section_not_found("碳排热点排名", &text) {
            ApiError::SectionNotFound { marker, snippet } => {
                assert_eq!(marker, "碳排热点排名");
                assert_eq!(snippet.chars().count(), 80);
            }
            other => panic!("variante inesperada: {:?}", other),
        }
    }

    #[test]
    fn schema_nombra_la_columna() {
        let msg = ApiError::schema("水厂内_分段", "合计_年").to_string();
        assert!(msg.contains("合计_年"));
    }
}
