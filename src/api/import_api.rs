// ==========================================
// 采购申请导入API
// ==========================================
// 职责: 封装整表导入，返回 (成功标志, 可读消息)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AppConfig;
use crate::i18n::t_with_args;
use crate::importer::{ImportError, LoadSummary, RequestLoader};
use crate::repository::{PurchaseRequestStore, SqlitePurchaseRequestRepository};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info};

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadReport {
    /// 是否已提交
    pub success: bool,
    /// 面向用户的消息（行数或失败原因）
    pub message: String,
    /// 导入明细（失败时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<LoadSummary>,
}

pub struct ImportApi<S: PurchaseRequestStore = SqlitePurchaseRequestRepository> {
    loader: RequestLoader<S>,
}

impl ImportApi<SqlitePurchaseRequestRepository> {
    /// 以应用配置创建（SQLite 存储）
    pub fn new(config: &AppConfig) -> Self {
        let store = SqlitePurchaseRequestRepository::new(&config.db_path);
        Self::from_loader(RequestLoader::new(store, &config.import))
    }
}

impl<S: PurchaseRequestStore> ImportApi<S> {
    pub fn from_loader(loader: RequestLoader<S>) -> Self {
        Self { loader }
    }

    /// 导入文件（不返回 Err，失败信息放在 LoadReport.message）
    pub fn load(&self, file_path: &Path) -> LoadReport {
        match self.loader.load_file(file_path) {
            Ok(summary) => {
                let message = success_message(&summary);
                info!(load_id = %summary.load_id, "{}", message);
                LoadReport {
                    success: true,
                    message,
                    summary: Some(summary),
                }
            }
            Err(err) => {
                error!(file = %file_path.display(), error = %err, "load rejected");
                LoadReport {
                    success: false,
                    message: failure_message(&err),
                    summary: None,
                }
            }
        }
    }

    /// 幂等建表
    pub fn init_db(&self) -> ApiResult<()> {
        self.loader.store().ensure_schema().map_err(ApiError::from)
    }
}

fn success_message(summary: &LoadSummary) -> String {
    let count = summary.rows_loaded.to_string();
    if summary.skipped.is_empty() {
        t_with_args("load.success", &[("count", count.as_str())])
    } else {
        let skipped = summary.skipped.len().to_string();
        t_with_args(
            "load.success_with_skipped",
            &[("count", count.as_str()), ("skipped", skipped.as_str())],
        )
    }
}

/// 失败原因 → 用户消息
fn failure_message(err: &ImportError) -> String {
    match err {
        ImportError::MissingColumns(fields) => {
            let columns = fields
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            t_with_args("load.missing_columns", &[("columns", columns.as_str())])
        }
        ImportError::FileNotFound(path) => {
            t_with_args("load.file_not_found", &[("path", path.as_str())])
        }
        ImportError::UnsupportedFormat(ext) => {
            t_with_args("load.unsupported_format", &[("ext", ext.as_str())])
        }
        ImportError::FileReadError(reason)
        | ImportError::ExcelParseError(reason)
        | ImportError::CsvParseError(reason) => {
            t_with_args("load.read_failed", &[("reason", reason.as_str())])
        }
        ImportError::MissingHeaderRow => {
            t_with_args("load.read_failed", &[("reason", err.to_string().as_str())])
        }
        ImportError::Storage(_) => t_with_args("load.storage_failed", &[]),
        other => t_with_args("load.unexpected", &[("reason", other.to_string().as_str())]),
    }
}
