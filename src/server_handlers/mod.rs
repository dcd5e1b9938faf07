pub mod cache;
pub mod dashboard;
pub mod docs;
pub mod network;
pub mod process;
pub mod reports;
pub mod scope;
pub mod section;

pub use cache::*;
pub use dashboard::*;
pub use docs::*;
pub use network::*;
pub use process::*;
pub use reports::*;
pub use scope::*;
pub use section::*;

use calamine::Data;

use crate::error::ApiResult;
use crate::excel::{cell_number, Table};

/// Valor numérico de `column` en una fila ya seleccionada (0.0 si no es número).
pub(crate) fn number_at(table: &Table, row: &[Data], column: &str) -> ApiResult<f64> {
    let col = table.require_column(column)?;
    Ok(cell_number(Table::cell(row, col)))
}
