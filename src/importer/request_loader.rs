// ==========================================
// 采购申请跟踪 - 整表导入管道
// ==========================================
// 流程: 表头对齐 → 确保建表 → [事务: 清空 → 逐行转换写入] → 提交
// 错误: 对齐/建表阶段失败不改动数据；事务内存储错误整体回滚
// 行级错误: 记录并跳过，不中止事务
// ==========================================

use crate::config::ImportConfig;
use crate::importer::error::{ImportResult, RowError};
use crate::importer::file_parser::{RawSheet, UniversalFileParser};
use crate::importer::header_reconciler::HeaderReconciler;
use crate::importer::importer_trait::FileParser;
use crate::importer::load_state::{LoadState, LoadTracker};
use crate::importer::record_transformer::RecordTransformer;
use crate::importer::value_normalizer::DateNormalizer;
use crate::repository::error::RepositoryError;
use crate::repository::request_repo::PurchaseRequestStore;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{info, info_span, instrument, warn};
use uuid::Uuid;

// ==========================================
// LoadSummary - 导入结果
// ==========================================

/// 被跳过的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

impl From<&RowError> for SkippedRow {
    fn from(err: &RowError) -> Self {
        Self {
            row: err.row(),
            reason: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub load_id: String,
    pub file_name: String,
    pub rows_loaded: usize,
    /// 替换前表中的行数
    pub rows_replaced: usize,
    pub skipped: Vec<SkippedRow>,
    pub elapsed_ms: u64,
}

// ==========================================
// RequestLoader - 导入管道
// ==========================================
pub struct RequestLoader<S: PurchaseRequestStore> {
    store: S,
    parser: Box<dyn FileParser>,
    reconciler: HeaderReconciler,
    transformer: RecordTransformer,
}

impl<S: PurchaseRequestStore> RequestLoader<S> {
    /// 创建导入管道
    ///
    /// # 参数
    /// - store: 采购申请存储
    /// - config: 导入配置（日期解析模式）
    pub fn new(store: S, config: &ImportConfig) -> Self {
        Self {
            store,
            parser: Box::new(UniversalFileParser),
            reconciler: HeaderReconciler::new(),
            transformer: RecordTransformer::new(DateNormalizer::new(config.date_mode)),
        }
    }

    /// 替换文件解析器
    pub fn with_parser(mut self, parser: Box<dyn FileParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 解析并导入文件
    #[instrument(skip(self), fields(file = %file_path.display()))]
    pub fn load_file(&self, file_path: &Path) -> ImportResult<LoadSummary> {
        let sheet = self.parser.parse(file_path)?;
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.display().to_string());
        self.load_sheet(&sheet, &file_name)
    }

    /// 导入已解析的表
    ///
    /// # 返回
    /// - Ok(LoadSummary): 已提交（可能含被跳过的行）
    /// - Err(MissingColumns): 表头缺失，未改动数据
    /// - Err(Storage): 存储失败，已回滚
    pub fn load_sheet(&self, sheet: &RawSheet, file_name: &str) -> ImportResult<LoadSummary> {
        let load_id = Uuid::new_v4().to_string();
        let span = info_span!("load", load_id = %load_id, file = %file_name);
        let _guard = span.enter();

        let started = Instant::now();
        let mut tracker = LoadTracker::new();

        info!(rows = sheet.rows.len(), "load started");
        let outcome = self.run(sheet, &mut tracker);

        match outcome {
            Ok((rows_replaced, rows_loaded, skipped)) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    rows_loaded,
                    rows_replaced,
                    skipped = skipped.len(),
                    elapsed_ms,
                    "load committed"
                );
                Ok(LoadSummary {
                    load_id,
                    file_name: file_name.to_string(),
                    rows_loaded,
                    rows_replaced,
                    skipped: skipped.iter().map(SkippedRow::from).collect(),
                    elapsed_ms,
                })
            }
            Err(err) => {
                tracker.fail();
                warn!(error = %err, state_history = ?tracker.history(), "load failed");
                Err(err)
            }
        }
    }

    fn run(
        &self,
        sheet: &RawSheet,
        tracker: &mut LoadTracker,
    ) -> ImportResult<(usize, usize, Vec<RowError>)> {
        // (a) 表头对齐（失败即中止，未触碰存储）
        let mapping = self.reconciler.reconcile(&sheet.headers)?;
        tracker.advance(LoadState::HeaderValidated)?;

        // (b) 幂等建表
        self.store.ensure_schema()?;

        // (c)(d) 事务内清空 + 逐行写入
        let transformer = &self.transformer;
        let result = self.store.replace_all(|sink| {
            let replaced = sink.clear()?;
            advance_in_tx(tracker, LoadState::TableCleared)?;

            let mut loaded = 0usize;
            let mut skipped = Vec::new();
            for row in &sheet.rows {
                let record = match transformer.transform(row, &mapping) {
                    Ok(record) => record,
                    Err(row_err) => {
                        warn!(row = row.row_number, error = %row_err, "row skipped");
                        skipped.push(row_err);
                        continue;
                    }
                };

                match sink.insert(&record) {
                    Ok(_) => loaded += 1,
                    Err(err) if err.is_constraint_violation() => {
                        warn!(row = row.row_number, error = %err, "row rejected by store");
                        skipped.push(RowError::Rejected {
                            row: row.row_number,
                            message: err.to_string(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }

            advance_in_tx(tracker, LoadState::RowsInserted)?;
            Ok((replaced, loaded, skipped))
        })?;

        // (e) 已提交
        tracker.advance(LoadState::Committed)?;
        Ok(result)
    }
}

/// 事务内推进状态（非法转换视为内部错误，触发回滚）
fn advance_in_tx(tracker: &mut LoadTracker, next: LoadState) -> Result<(), RepositoryError> {
    tracker
        .advance(next)
        .map_err(|e| RepositoryError::InternalError(e.to_string()))
}
