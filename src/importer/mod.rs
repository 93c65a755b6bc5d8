// ==========================================
// 采购申请跟踪 - 导入层
// ==========================================
// 职责: 采购申请表格 → 内部记录 → 整表替换写入
// 支持: Excel (.xlsx/.xls), CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod header_reconciler;
pub mod importer_trait;
pub mod indicators;
pub mod load_state;
pub mod record_transformer;
pub mod request_loader;
pub mod value_normalizer;

// 重导出核心类型
pub use error::{ImportError, ImportResult, RowError};
pub use file_parser::{CsvParser, ExcelParser, RawRow, RawSheet, UniversalFileParser};
pub use header_reconciler::{ColumnMapping, HeaderReconciler};
pub use indicators::IndicatorCalculator;
pub use load_state::{LoadState, LoadTracker};
pub use record_transformer::RecordTransformer;
pub use request_loader::{LoadSummary, RequestLoader, SkippedRow};
pub use value_normalizer::DateNormalizer;

// 重导出 Trait 接口
pub use importer_trait::{FileParser, IndicatorService};
