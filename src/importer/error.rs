// ==========================================
// 采购申请跟踪 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 结构性错误（整体中止）/ 行级错误（跳过该行）/ 存储错误（回滚）
// ==========================================

use crate::domain::InternalField;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (only .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("failed to read file: {0}")]
    FileReadError(String),

    #[error("failed to parse Excel workbook: {0}")]
    ExcelParseError(String),

    #[error("failed to parse CSV file: {0}")]
    CsvParseError(String),

    #[error("spreadsheet has no header row")]
    MissingHeaderRow,

    // ===== 结构性错误 =====
    #[error("missing required columns: {}", join_fields(.0))]
    MissingColumns(Vec<InternalField>),

    // ===== 状态机错误 =====
    #[error("invalid load state transition: from={from} to={to}")]
    InvalidStateTransition { from: String, to: String },

    // ===== 存储错误 =====
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_fields(fields: &[InternalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

// ==========================================
// RowError - 行级错误
// ==========================================
// 行号为表格行号（表头 = 第 1 行）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("row {row}: request id (Solicitacao) is empty")]
    MissingRequestId { row: usize },

    #[error("row {row}, field {field}: spreadsheet error value {value}")]
    ErrorCell {
        row: usize,
        field: InternalField,
        value: String,
    },

    #[error("row {row}, field {field}: cannot convert '{value}' to a number")]
    TypeConversion {
        row: usize,
        field: InternalField,
        value: String,
    },

    #[error("row {row}: rejected by store: {message}")]
    Rejected { row: usize, message: String },
}

impl RowError {
    pub fn row(&self) -> usize {
        match self {
            RowError::MissingRequestId { row }
            | RowError::ErrorCell { row, .. }
            | RowError::TypeConversion { row, .. }
            | RowError::Rejected { row, .. } => *row,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_names_every_field() {
        let err = ImportError::MissingColumns(vec![
            InternalField::PrecoUnitario,
            InternalField::Etapa,
        ]);
        let msg = err.to_string();
        assert!(msg.contains("PrecoUnitario"));
        assert!(msg.contains("Etapa"));
    }

    #[test]
    fn test_row_error_row_number() {
        let err = RowError::TypeConversion {
            row: 7,
            field: InternalField::Qtde,
            value: "dez".to_string(),
        };
        assert_eq!(err.row(), 7);
        assert!(err.to_string().contains("Qtde"));
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: ImportError = RepositoryError::TableMissing("solicitacoes".into()).into();
        assert!(matches!(err, ImportError::Storage(_)));
    }
}
