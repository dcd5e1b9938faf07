//! Resolución de periodos, agregación por categoría, catálogo de tramos y
//! formateo numérico.

pub mod aggregate;
pub mod period;
pub mod round;
pub mod segment;

pub use aggregate::{aggregate, period_row, period_row_in, select, sum, EmptyPolicy, Filter, Matcher, Reduce};
pub use period::Period;
pub use round::round2;
pub use segment::{find_segment, SegmentSpec, SEGMENTS};
