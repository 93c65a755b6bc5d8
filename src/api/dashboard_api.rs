// ==========================================
// 采购申请看板API
// ==========================================
// 职责: 聚合只读查询，生成可序列化的看板快照
// 约定: 表不存在 → ApiError::NoData（展示“请上传表格”提示）
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AppConfig, QueryConfig};
use crate::domain::{BuyerCount, BuyerTotal, IndicatorAverages, OverdueRequest, StageCount};
use crate::i18n::t;
use crate::repository::PurchaseQueryRepository;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

/// 看板快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    // ===== 总计 =====
    pub total_records: i64,
    pub total_approved_value: f64,

    // ===== 分布 =====
    pub by_buyer: Vec<BuyerCount>,
    pub by_stage: Vec<StageCount>,

    /// 报价阶段内的延迟申请（按延迟天数降序）
    pub overdue_in_quotation: Vec<OverdueRequest>,

    /// 派生指标平均值（无数据为 null）
    pub indicators: IndicatorAverages,

    /// 采购员已审批金额
    pub buyer_performance: Vec<BuyerTotal>,

    pub generated_at: String,
}

pub struct DashboardApi {
    queries: PurchaseQueryRepository,
    config: QueryConfig,
}

impl DashboardApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            queries: PurchaseQueryRepository::new(&config.db_path),
            config: config.query.clone(),
        }
    }

    /// 生成看板快照
    #[instrument(skip(self))]
    pub fn snapshot(&self) -> ApiResult<DashboardSnapshot> {
        let approved = self.config.approved_status.as_str();
        Ok(DashboardSnapshot {
            total_records: self.queries.count_records()?,
            total_approved_value: self.queries.total_approved_value(approved)?,
            by_buyer: self.queries.buyer_counts()?,
            by_stage: self.queries.stage_counts()?,
            overdue_in_quotation: self.queries.overdue_in_stages(&self.config.quotation_stages)?,
            indicators: self.queries.indicator_averages()?,
            buyer_performance: self.queries.buyer_approved_totals(approved)?,
            generated_at: Utc::now().to_rfc3339(),
        })
    }

    /// 快照失败时展示给用户的消息
    ///
    /// # 返回
    /// - NoData → “请上传表格”提示
    /// - 其他错误 → 记录日志，返回通用的读取失败提示
    pub fn error_message(err: &ApiError) -> String {
        match err {
            ApiError::NoData => t("dashboard.no_data"),
            other => {
                error!(error = %other, "dashboard query failed");
                t("dashboard.storage_failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{set_locale, tests::LOCALE_TEST_LOCK, DEFAULT_LOCALE};

    #[test]
    fn test_snapshot_without_table_is_no_data() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = DashboardApi::new(&AppConfig::with_db_path(dir.path().join("fresh.db")));
        assert!(matches!(api.snapshot(), Err(ApiError::NoData)));
    }

    #[test]
    fn test_snapshot_on_empty_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.db");
        let conn = crate::db::open_sqlite_connection(&path).unwrap();
        conn.execute_batch(crate::db::CREATE_REQUESTS_TABLE_SQL).unwrap();
        drop(conn);

        let snapshot = DashboardApi::new(&AppConfig::with_db_path(path))
            .snapshot()
            .unwrap();
        assert_eq!(snapshot.total_records, 0);
        assert_eq!(snapshot.total_approved_value, 0.0);
        assert_eq!(snapshot.indicators, IndicatorAverages::default());
        assert!(snapshot.by_buyer.is_empty());
    }

    #[test]
    fn test_storage_failure_uses_dashboard_message() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(DEFAULT_LOCALE);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legacy.db");
        let conn = crate::db::open_sqlite_connection(&path).unwrap();
        // 旧版表结构: 表存在但缺少查询所需列
        conn.execute_batch("CREATE TABLE solicitacoes (Solicitacao TEXT)").unwrap();
        drop(conn);

        let err = DashboardApi::new(&AppConfig::with_db_path(path))
            .snapshot()
            .unwrap_err();
        assert!(matches!(err, ApiError::DatabaseError(_)));
        assert_eq!(
            DashboardApi::error_message(&err),
            "Erro ao buscar dados do dashboard."
        );
        assert_eq!(
            DashboardApi::error_message(&ApiError::NoData),
            "A base de dados ainda não foi carregada. Faça o upload da planilha."
        );
    }
}
