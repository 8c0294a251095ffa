// Library exports for use in scripts and other binaries

pub mod batch;
pub mod config;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use batch::{BatchConverter, BatchOptions, BatchReport, DocumentStatus};
pub use config::{ConverterConfig, JoinRule, Preset};
pub use text::{is_column_break, Converter};
