//! Tabla en memoria: encabezados normalizados y filas de celdas de calamine.

use calamine::Data;

use crate::error::{ApiError, ApiResult};
use crate::excel::io::{cell_to_string, normalize_header, pick_column, AliasSet, PERIOD_ALIASES, SCOPE_TOKENS};

/// Cómo se obtiene la fila de encabezado de una hoja.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderMode {
    /// La primera fila es el encabezado.
    FirstRow,
    /// Se busca en las primeras filas una que tenga alias de periodo y de ámbito
    /// (exportaciones con fila de título encima).
    Detect,
}

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Data>>,
}

static EMPTY: Data = Data::Empty;

impl Table {
    /// Construye la tabla a partir de la rejilla cruda de la hoja.
    pub fn from_grid(name: &str, grid: Vec<Vec<Data>>, mode: HeaderMode, scan_rows: usize) -> ApiResult<Table> {
        let header_idx = match mode {
            HeaderMode::FirstRow => {
                if grid.is_empty() {
                    return Err(ApiError::DataSource(format!("{} 为空表", name)));
                }
                0
            }
            HeaderMode::Detect => detect_header_row(&grid, scan_rows).ok_or_else(|| {
                ApiError::DataSource(format!("{} 前 {} 行内未找到表头", name, scan_rows))
            })?,
        };

        let mut grid = grid;
        let body = grid.split_off(header_idx + 1);
        let header = grid.pop().unwrap_or_default();
        Ok(Table::build(name, &header, body))
    }

    /// Tabla construida en código; los encabezados se normalizan igual que al leer.
    pub fn from_rows(name: &str, headers: &[&str], rows: Vec<Vec<Data>>) -> Table {
        let header: Vec<Data> = headers.iter().map(|h| Data::String(h.to_string())).collect();
        Table::build(name, &header, rows)
    }

    fn build(name: &str, header: &[Data], body: Vec<Vec<Data>>) -> Table {
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let n = normalize_header(&cell_to_string(c));
                if n.is_empty() { format!("Unnamed: {}", i) } else { n }
            })
            .collect();

        let width = columns.len();
        let rows: Vec<Vec<Data>> = body
            .into_iter()
            .filter(|r| !is_blank_row(r))
            .map(|mut r| {
                r.resize(width, Data::Empty);
                r
            })
            .collect();

        log::debug!("tabla {}: {} columnas, {} filas", name, width, rows.len());
        Table { name: name.to_string(), columns, rows }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Data]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Índice de la columna cuyo nombre normalizado coincide exactamente.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = normalize_header(name);
        self.columns.iter().position(|c| *c == wanted)
    }

    pub fn require_column(&self, name: &str) -> ApiResult<usize> {
        self.column_index(name).ok_or_else(|| ApiError::schema(&self.name, name))
    }

    pub fn pick(&self, set: &AliasSet) -> Option<usize> {
        pick_column(&self.columns, set)
    }

    pub fn require_pick(&self, set: &AliasSet) -> ApiResult<usize> {
        self.pick(set).ok_or_else(|| {
            ApiError::schema(&self.name, format!("{}（实际列：{}）", set.canonical, self.columns.join(", ")))
        })
    }

    /// Primera columna cuyo nombre cumple el predicado.
    pub fn find_column(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.columns.iter().position(|c| pred(c))
    }

    /// Última columna cuyo nombre cumple el predicado.
    pub fn find_last_column(&self, pred: impl Fn(&str) -> bool) -> Option<usize> {
        self.columns.iter().rposition(|c| pred(c))
    }

    pub fn cell<'a>(row: &'a [Data], col: usize) -> &'a Data {
        row.get(col).unwrap_or(&EMPTY)
    }
}

fn is_blank_row(row: &[Data]) -> bool {
    row.iter().all(|c| match c {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    })
}

fn detect_header_row(grid: &[Vec<Data>], scan_rows: usize) -> Option<usize> {
    let period_tokens: Vec<String> = PERIOD_ALIASES.aliases.iter().map(|a| normalize_header(a)).collect();
    grid.iter().take(scan_rows).position(|row| {
        let joined = row
            .iter()
            .map(|c| normalize_header(&cell_to_string(c)))
            .collect::<Vec<_>>()
            .join("|");
        period_tokens.iter().any(|t| joined.contains(t.as_str()))
            && SCOPE_TOKENS.iter().any(|t| joined.contains(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn detecta_encabezado_bajo_titulo() {
        let grid = vec![
            vec![s("碳排总汇总报表"), Data::Empty, Data::Empty, Data::Empty],
            vec![Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            vec![s("周期"), s("范围1 (kgCO2e)"), s("范围2（kgCO2e）"), s("范围3")],
            vec![s("年"), Data::Float(100.0), Data::Float(200.0), Data::Float(300.0)],
        ];
        let t = Table::from_grid("demo", grid, HeaderMode::Detect, 50).unwrap();
        assert_eq!(t.columns(), &["周期", "范围1", "范围2", "范围3"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn sin_encabezado_en_rango_es_error_de_origen() {
        let grid = vec![vec![s("a"), s("b")], vec![s("周期"), s("范围1")]];
        let err = Table::from_grid("demo", grid, HeaderMode::Detect, 1).unwrap_err();
        assert!(matches!(err, ApiError::DataSource(_)));
    }

    #[test]
    fn encabezados_vacios_y_filas_en_blanco() {
        let grid = vec![
            vec![s("工艺段"), Data::Empty],
            vec![s(""), Data::Empty],
            vec![s("预处理段"), Data::Float(1.0)],
        ];
        let t = Table::from_grid("demo", grid, HeaderMode::FirstRow, 0).unwrap();
        assert_eq!(t.columns(), &["工艺段", "Unnamed: 1"]);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn tabla_en_codigo_conserva_encabezados_sin_filas() {
        let t = Table::from_rows("水厂外_分段", &["工艺段", "合计（年）", ""], vec![]);
        assert_eq!(t.columns(), &["工艺段", "合计", "Unnamed: 2"]);
        assert!(t.is_empty());

        let t = Table::from_rows("t", &["a", "b", "c"], vec![vec![s("x")], vec![Data::Empty]]);
        assert_eq!(t.len(), 1);
        assert_eq!(t.rows().next().map(|r| r.len()), Some(3));
    }

    #[test]
    fn columna_requerida_ausente() {
        let t = Table::from_rows("水厂内_分段", &["工艺段", "合计_年"], vec![]);
        assert_eq!(t.require_column("合计（年）").ok(), None);
        assert!(t.require_column("合计_年").is_ok());
        match t.require_column("电耗_年") {
            Err(ApiError::Schema { column, .. }) => assert_eq!(column, "电耗_年"),
            other => panic!("esperaba Schema, obtuve {:?}", other),
        }
    }
}
