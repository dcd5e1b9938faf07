//! Acceso a los libros Excel del directorio de datos.
//!
//! Cada hoja que consume el servicio se declara como un `TableSource`
//! constante; `TableCache` las carga una sola vez por proceso.

pub mod cache;
pub mod io;
pub mod table;

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{ApiError, ApiResult};
pub use cache::{CacheStats, TableCache};
pub use io::{cell_number, cell_to_string, normalize_header};
pub use table::{HeaderMode, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetSelector {
    Index(usize),
    Name(&'static str),
}

/// Hoja concreta de un libro, junto con el modo de encabezado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableSource {
    pub file: &'static str,
    /// Nombres alternativos del mismo libro (se prueban en orden si `file` no existe).
    pub fallbacks: &'static [&'static str],
    pub sheet: SheetSelector,
    pub header: HeaderMode,
}

impl TableSource {
    pub const fn new(file: &'static str, sheet: SheetSelector) -> Self {
        TableSource { file, fallbacks: &[], sheet, header: HeaderMode::FirstRow }
    }

    pub const fn with_fallbacks(mut self, fallbacks: &'static [&'static str]) -> Self {
        self.fallbacks = fallbacks;
        self
    }

    pub const fn detect_header(mut self) -> Self {
        self.header = HeaderMode::Detect;
        self
    }

    pub fn label(&self) -> String {
        match self.sheet {
            SheetSelector::Index(i) => format!("{}#{}", self.file, i),
            SheetSelector::Name(n) => format!("{}/{}", self.file, n),
        }
    }

    /// Primera ruta existente entre `file` y sus alternativas.
    pub fn resolve_path(&self, data_dir: &Path) -> ApiResult<PathBuf> {
        std::iter::once(self.file)
            .chain(self.fallbacks.iter().copied())
            .map(|f| data_dir.join(f))
            .find(|p| p.is_file())
            .ok_or_else(|| ApiError::FileMissing(data_dir.join(self.file).display().to_string()))
    }
}

pub const OVERVIEW_FILE: &str = "碳排_总汇总_含强度与减排.xlsx";
const OVERVIEW_FALLBACKS: &[&str] = &["碳排_总汇总_含强度与减排 .xlsx"];
pub const SUMMARY_FILE: &str = "碳排总汇总.xlsx";
pub const SCOPE2_FILE: &str = "范围2_水厂内外_分段与单元.xlsx";
pub const SCOPE1_SLUDGE_FILE: &str = "范围1_O3与范围3_污泥运输.xlsx";
pub const SCOPE3_FILE: &str = "Scope3_含分项.xlsx";
pub const DEVICE_TOP10_FILE: &str = "设备Top10_日_仅排序.xlsx";
pub const NETWORK_FILE: &str = "管网碳排_按压力监测点_坐标匹配.xlsx";

pub const OVERVIEW: TableSource =
    TableSource::new(OVERVIEW_FILE, SheetSelector::Index(0)).with_fallbacks(OVERVIEW_FALLBACKS);
pub const INTENSITY: TableSource =
    TableSource::new(OVERVIEW_FILE, SheetSelector::Name("总汇总_含强度")).with_fallbacks(OVERVIEW_FALLBACKS);

pub const SCOPE_SUMMARY: TableSource = TableSource::new(SUMMARY_FILE, SheetSelector::Index(0)).detect_header();
pub const SCOPE_SHARE: TableSource = TableSource::new(SUMMARY_FILE, SheetSelector::Index(0));
pub const TOTAL_SUMMARY: TableSource = TableSource::new(SUMMARY_FILE, SheetSelector::Name("总汇总"));

pub const INNER_SECTIONS: TableSource = TableSource::new(SCOPE2_FILE, SheetSelector::Name("水厂内_分段"));
pub const OUTER_SECTIONS: TableSource = TableSource::new(SCOPE2_FILE, SheetSelector::Name("水厂外_分段"));
pub const INNER_UNITS: TableSource = TableSource::new(SCOPE2_FILE, SheetSelector::Name("水厂内_分单元"));
pub const OUTER_UNITS: TableSource = TableSource::new(SCOPE2_FILE, SheetSelector::Name("水厂外_分单元"));
pub const ELECTRICITY_KWH: TableSource = TableSource::new(SCOPE2_FILE, SheetSelector::Name("用电量_kWh"));

pub const SCOPE1_O3: TableSource = TableSource::new(SCOPE1_SLUDGE_FILE, SheetSelector::Name("Scope1_O3泄漏"));
pub const SLUDGE: TableSource = TableSource::new(SCOPE1_SLUDGE_FILE, SheetSelector::Name("Scope3_污泥运输"));

pub const SCOPE3_SUMMARY: TableSource = TableSource::new(SCOPE3_FILE, SheetSelector::Name("Scope3_汇总(日周月年)"));
pub const SCOPE3_ITEMS: TableSource = TableSource::new(SCOPE3_FILE, SheetSelector::Name("Scope3_分项(日周月年)"));

pub const DEVICE_TOP10: TableSource = TableSource::new(DEVICE_TOP10_FILE, SheetSelector::Index(0));

pub const NETWORK_DAILY: TableSource = TableSource::new(NETWORK_FILE, SheetSelector::Name("Daily_PressurePoint"));
pub const NETWORK_WEEKLY: TableSource = TableSource::new(NETWORK_FILE, SheetSelector::Name("Weekly_PressurePoint"));
pub const NETWORK_MONTHLY: TableSource = TableSource::new(NETWORK_FILE, SheetSelector::Name("Monthly_PressurePoint"));
pub const NETWORK_YEARLY: TableSource = TableSource::new(NETWORK_FILE, SheetSelector::Name("Yearly_PressurePoint"));

/// Lee una hoja del disco y la convierte en `Table`.
pub fn load_table(data_dir: &Path, source: &TableSource, scan_rows: usize) -> ApiResult<Table> {
    let path = source.resolve_path(data_dir)?;
    let mut workbook = open_workbook_auto(&path)
        .map_err(|e| ApiError::DataSource(format!("无法打开 {}：{}", path.display(), e)))?;

    let names = workbook.sheet_names().to_owned();
    let sheet_name = match source.sheet {
        SheetSelector::Index(i) => names.get(i).cloned(),
        SheetSelector::Name(wanted) => names.iter().find(|n| n.as_str() == wanted).cloned().or_else(|| {
            let wanted_n = normalize_header(wanted);
            names.iter().find(|n| normalize_header(n) == wanted_n).cloned()
        }),
    }
    .ok_or_else(|| {
        ApiError::DataSource(format!("{} 中未找到工作表 {:?}（现有：{}）", source.file, source.sheet, names.join(", ")))
    })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ApiError::DataSource(format!("读取 {}/{} 失败：{}", source.file, sheet_name, e)))?;

    let grid: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    let table = Table::from_grid(&source.label(), grid, source.header, scan_rows)?;
    log::info!("cargada {} ({} filas)", source.label(), table.len());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archivo_ausente_es_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(dir.path(), &SCOPE_SUMMARY, 50).unwrap_err();
        assert!(matches!(err, ApiError::FileMissing(_)));
    }

    #[test]
    fn usa_nombre_alternativo_si_existe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("碳排_总汇总_含强度与减排 .xlsx"), b"x").unwrap();
        let p = OVERVIEW.resolve_path(dir.path()).unwrap();
        assert!(p.ends_with("碳排_总汇总_含强度与减排 .xlsx"));
    }

    #[test]
    fn libro_corrupto_es_error_de_origen() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEVICE_TOP10_FILE), b"no es un xlsx").unwrap();
        let err = load_table(dir.path(), &DEVICE_TOP10, 50).unwrap_err();
        assert!(matches!(err, ApiError::DataSource(_)));
    }

    #[test]
    fn fuentes_del_mismo_libro_son_claves_distintas() {
        assert_ne!(SCOPE_SUMMARY, SCOPE_SHARE);
        assert_eq!(SCOPE_SUMMARY.label(), "碳排总汇总.xlsx#0");
    }
}
