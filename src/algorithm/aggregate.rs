//! Selección de filas por categoría y suma de una columna por periodo.
//!
//! Cada llamada declara cómo emparejar etiquetas (`Matcher`) y qué hacer si
//! la selección queda vacía (`EmptyPolicy`), porque los widgets no se
//! comportan igual ante la ausencia de filas.

use calamine::Data;

use crate::algorithm::period::Period;
use crate::error::{ApiError, ApiResult};
use crate::excel::io::{cell_number, cell_to_string, PERIOD_ALIASES};
use crate::excel::Table;

/// Forma de comparar una celda de etiqueta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher<'a> {
    Exact(&'a str),
    Contains(&'a str),
    /// Contiene cualquiera de las subcadenas (une variantes de un mismo equipo).
    AnyOf(&'a [&'a str]),
}

impl Matcher<'_> {
    pub fn matches(&self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Matcher::Exact(s) => value == s.trim(),
            Matcher::Contains(s) => value.contains(s),
            Matcher::AnyOf(list) => list.iter().any(|s| value.contains(s)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Matcher::Exact(s) | Matcher::Contains(s) => s.to_string(),
            Matcher::AnyOf(list) => list.join("/"),
        }
    }
}

/// Qué devuelve una agregación cuya selección no tiene filas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// 0.0 en silencio.
    Zero,
    /// 404: el cliente pidió algo que no existe.
    NotFound,
    /// 500: la hoja debería contener la fila.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduce {
    Sum,
    /// Valor de la primera fila seleccionada.
    First,
}

#[derive(Debug, Clone, Copy)]
enum Condition<'a> {
    Label { column: &'a str, matcher: Matcher<'a> },
    Period { column: Option<&'a str>, period: Period },
}

/// Conjunción de condiciones sobre columnas de una tabla.
#[derive(Debug, Clone, Default)]
pub struct Filter<'a> {
    conditions: Vec<Condition<'a>>,
}

impl<'a> Filter<'a> {
    pub fn new() -> Self {
        Filter { conditions: Vec::new() }
    }

    pub fn label(mut self, column: &'a str, matcher: Matcher<'a>) -> Self {
        self.conditions.push(Condition::Label { column, matcher });
        self
    }

    pub fn exact(self, column: &'a str, value: &'a str) -> Self {
        self.label(column, Matcher::Exact(value))
    }

    /// Filas cuyo periodo (columna indicada o detectada por alias) es `period`.
    pub fn period(mut self, column: Option<&'a str>, period: Period) -> Self {
        self.conditions.push(Condition::Period { column, period });
        self
    }

    fn describe(&self) -> String {
        self.conditions
            .iter()
            .map(|c| match c {
                Condition::Label { column, matcher } => format!("{}={}", column, matcher.describe()),
                Condition::Period { period, .. } => format!("周期={}", period.label()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

enum Resolved<'a> {
    Label(usize, Matcher<'a>),
    Period(usize, Period),
}

/// Filas de `table` que cumplen todas las condiciones del filtro.
pub fn select<'t>(table: &'t Table, filter: &Filter<'_>) -> ApiResult<Vec<&'t [Data]>> {
    let mut resolved = Vec::with_capacity(filter.conditions.len());
    for cond in &filter.conditions {
        resolved.push(match cond {
            Condition::Label { column, matcher } => Resolved::Label(table.require_column(column)?, *matcher),
            Condition::Period { column: Some(column), period } => Resolved::Period(table.require_column(column)?, *period),
            Condition::Period { column: None, period } => Resolved::Period(table.require_pick(&PERIOD_ALIASES)?, *period),
        });
    }

    Ok(table
        .rows()
        .filter(|row| {
            resolved.iter().all(|r| match r {
                Resolved::Label(idx, matcher) => matcher.matches(&cell_to_string(Table::cell(row, *idx))),
                Resolved::Period(idx, period) => Period::standardize_cell(Table::cell(row, *idx)) == Some(*period),
            })
        })
        .collect())
}

/// Suma de `column` sobre las filas seleccionadas; sin filas la suma es 0.0.
pub fn sum(table: &Table, filter: &Filter<'_>, column: &str) -> ApiResult<f64> {
    let col = table.require_column(column)?;
    Ok(select(table, filter)?.iter().map(|row| cell_number(Table::cell(row, col))).sum())
}

/// Agregación con política explícita para selecciones vacías.
pub fn aggregate(table: &Table, filter: &Filter<'_>, column: &str, reduce: Reduce, policy: EmptyPolicy) -> ApiResult<f64> {
    let col = table.require_column(column)?;
    let rows = select(table, filter)?;
    if rows.is_empty() {
        let msg = format!("{} 中未找到数据（{}）", table.name(), filter.describe());
        return match policy {
            EmptyPolicy::Zero => Ok(0.0),
            EmptyPolicy::NotFound => Err(ApiError::NotFound(msg)),
            EmptyPolicy::Internal => Err(ApiError::DataIntegrity(msg)),
        };
    }
    Ok(match reduce {
        Reduce::Sum => rows.iter().map(|row| cell_number(Table::cell(row, col))).sum(),
        Reduce::First => cell_number(Table::cell(rows[0], col)),
    })
}

/// Primera fila del periodo indicado, detectando la columna de periodo por alias.
pub fn period_row<'t>(table: &'t Table, period: Period) -> ApiResult<&'t [Data]> {
    period_row_in(table, None, period)
}

/// Como `period_row`, pero con la columna de periodo explícita (`period` en las hojas de O3 y lodos).
pub fn period_row_in<'t>(table: &'t Table, column: Option<&str>, period: Period) -> ApiResult<&'t [Data]> {
    let filter = Filter::new().period(column, period);
    select(table, &filter)?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound(format!("未找到周期={}的数据", period.label())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn units() -> Table {
        Table::from_rows(
            "水厂内_分单元",
            &["工艺段", "工艺单元", "total_year"],
            vec![
                vec![s("预处理段"), s("加药间"), Data::Float(120.0)],
                vec![s("预处理段"), s("配水井和预臭氧接触池"), Data::Float(80.0)],
                vec![s("深度处理段"), s("臭氧车间"), Data::Float(10.0)],
                vec![s("深度处理段"), s("臭氧溶解/混合"), Data::Float(5.5)],
                vec![s("深度处理段"), s("主臭氧接触池"), s("-")],
            ],
        )
    }

    #[test]
    fn suma_por_segmento() {
        let t = units();
        let f = Filter::new().exact("工艺段", "预处理段");
        assert_eq!(sum(&t, &f, "total_year").unwrap(), 200.0);
    }

    #[test]
    fn any_of_une_variantes() {
        let t = units();
        let f = Filter::new()
            .exact("工艺段", "深度处理段")
            .label("工艺单元", Matcher::AnyOf(&["臭氧车间", "臭氧溶解/混合"]));
        assert_eq!(sum(&t, &f, "total_year").unwrap(), 15.5);
    }

    #[test]
    fn exacta_y_contencion_no_son_intercambiables() {
        let t = units();
        let exact = Filter::new().exact("工艺单元", "臭氧接触池");
        let contains = Filter::new().label("工艺单元", Matcher::Contains("臭氧接触池"));
        assert_eq!(select(&t, &exact).unwrap().len(), 0);
        assert_eq!(select(&t, &contains).unwrap().len(), 2);
    }

    #[test]
    fn celdas_no_numericas_cuentan_cero() {
        let t = units();
        let f = Filter::new().label("工艺单元", Matcher::Exact("主臭氧接触池"));
        assert_eq!(aggregate(&t, &f, "total_year", Reduce::Sum, EmptyPolicy::NotFound).unwrap(), 0.0);
    }

    #[test]
    fn politica_de_seleccion_vacia() {
        let t = units();
        let f = Filter::new().exact("工艺段", "过滤段");
        assert_eq!(aggregate(&t, &f, "total_year", Reduce::Sum, EmptyPolicy::Zero).unwrap(), 0.0);
        assert!(matches!(
            aggregate(&t, &f, "total_year", Reduce::Sum, EmptyPolicy::NotFound),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            aggregate(&t, &f, "total_year", Reduce::Sum, EmptyPolicy::Internal),
            Err(ApiError::DataIntegrity(_))
        ));
    }

    #[test]
    fn primera_fila() {
        let t = units();
        let f = Filter::new().exact("工艺段", "预处理段");
        assert_eq!(aggregate(&t, &f, "total_year", Reduce::First, EmptyPolicy::Zero).unwrap(), 120.0);
    }

    #[test]
    fn columna_ausente_es_schema() {
        let t = units();
        let f = Filter::new().exact("工艺段", "预处理段");
        assert!(matches!(sum(&t, &f, "合计_年"), Err(ApiError::Schema { .. })));
    }

    #[test]
    fn fila_por_periodo() {
        let t = Table::from_rows(
            "总汇总",
            &["周期", "范围1"],
            vec![vec![s("Day"), Data::Float(1.0)], vec![Data::Float(4.0), Data::Float(9.0)]],
        );
        let row = period_row(&t, Period::Year).unwrap();
        assert_eq!(cell_number(&row[1]), 9.0);
        assert!(matches!(period_row(&t, Period::Month), Err(ApiError::NotFound(_))));
    }
}
