pub mod filter;
pub mod marker;
pub mod pipeline;
pub mod reassemble;

pub use filter::{FilteredLine, LineFilter, LineKind};
pub use marker::MarkerReorderer;
pub use pipeline::{join_pages, ConversionStats, Converter};
pub use reassemble::{is_column_break, probe_column_break, BreakProbe, ColumnReassembler};
