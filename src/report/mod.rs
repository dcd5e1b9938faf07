//! Informes de texto libre del directorio de datos.

pub mod diagnosis;
pub mod lowcarbon;
pub mod parser;
pub mod section;

use std::path::Path;

use crate::error::{ApiError, ApiResult};

pub const LOWCARBON_REPORT: &str = "绿色低碳评估.txt";
pub const DIAGNOSIS_REPORT: &str = "碳排诊断输出.txt";

pub use parser::{extract_evaluation, extract_ranked, extract_strategies, Evaluation, RankedEntry, Strategy};
pub use section::extract_section;

/// Lee un informe UTF-8. Ausente → 404, ilegible → 500.
pub async fn read_report(data_dir: &Path, file: &str) -> ApiResult<String> {
    let path = data_dir.join(file);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(ApiError::FileMissing(path.display().to_string()));
    }
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        log::error!("no se pudo leer {}: {}", path.display(), e);
        ApiError::DataSource("读取失败".to_string())
    })
}

/// Variante tolerante: cualquier fallo se registra y devuelve `None`.
pub async fn read_report_opt(data_dir: &Path, file: &str) -> Option<String> {
    match read_report(data_dir, file).await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => None,
        Err(e) => {
            log::warn!("informe {} no disponible: {}", file, e);
            None
        }
    }
}
