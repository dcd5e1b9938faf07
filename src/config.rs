//! Configuración del servicio leída desde variables de entorno (`.env` opcional).

use std::path::PathBuf;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Consumo eléctrico anual de la planta (kWh) usado por scope_2.
pub const DEFAULT_TOTAL_ELEC_KWH_YEAR: f64 = 3_272_523.0;
pub const DEFAULT_HEADER_SCAN_ROWS: usize = 50;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    pub total_electricity_kwh_year: f64,
    pub header_scan_rows: usize,
}

impl AppConfig {
    /// Configuración con valores por defecto y el directorio de datos indicado.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        AppConfig {
            bind: DEFAULT_BIND.to_string(),
            data_dir: data_dir.into(),
            total_electricity_kwh_year: DEFAULT_TOTAL_ELEC_KWH_YEAR,
            header_scan_rows: DEFAULT_HEADER_SCAN_ROWS,
        }
    }

    pub fn from_env() -> Self {
        let bind = std::env::var("CARBON_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        AppConfig {
            bind,
            data_dir: resolve_data_dir(),
            total_electricity_kwh_year: env_number("CARBON_TOTAL_ELEC_KWH_YEAR", DEFAULT_TOTAL_ELEC_KWH_YEAR),
            header_scan_rows: env_number("CARBON_HEADER_SCAN_ROWS", DEFAULT_HEADER_SCAN_ROWS),
        }
    }
}

fn env_number<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                log::warn!("{}={:?} no es un número válido, se usa {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

/// Localiza el directorio `data`:
/// 1. `CARBON_DATA_DIR` si existe
/// 2. `./data` desde el directorio de trabajo
/// 3. relativo al ejecutable (`data`, `../data`, `../../data`)
/// Si nada existe se devuelve `./data` y los handlers responderán 404.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("CARBON_DATA_DIR") {
        let p = PathBuf::from(path);
        if p.exists() {
            log::info!("usando CARBON_DATA_DIR: {:?}", p);
            return p;
        }
        log::warn!("CARBON_DATA_DIR={:?} no existe, buscando alternativas", p);
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let from_cwd = cwd.join("data");
    if from_cwd.exists() {
        log::info!("directorio de datos (cwd): {:?}", from_cwd);
        return from_cwd;
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let candidates = [
                exe_dir.join("data"),
                exe_dir.join("../data"),
                exe_dir.join("../../data"),
            ];
            for candidate in candidates {
                if candidate.exists() {
                    log::info!("directorio de datos (exe): {:?}", candidate);
                    return candidate;
                }
            }
        }
    }

    log::warn!("no se encontró directorio de datos, se usa {:?}", from_cwd);
    from_cwd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valores_por_defecto() {
        let cfg = AppConfig::with_data_dir("/tmp/carbon");
        assert_eq!(cfg.bind, DEFAULT_BIND);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/carbon"));
        assert_eq!(cfg.total_electricity_kwh_year, 3_272_523.0);
        assert_eq!(cfg.header_scan_rows, 50);
    }

    #[test]
    fn numero_invalido_usa_default() {
        // clave exclusiva de este test para no interferir con otros
        unsafe { std::env::set_var("CARBON_TEST_BAD_NUMBER", "abc") };
        assert_eq!(env_number("CARBON_TEST_BAD_NUMBER", 7usize), 7);
        unsafe { std::env::set_var("CARBON_TEST_BAD_NUMBER", " 12 ") };
        assert_eq!(env_number("CARBON_TEST_BAD_NUMBER", 7usize), 12);
    }
}
