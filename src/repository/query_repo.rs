// ==========================================
// 采购申请跟踪 - 只读查询仓储
// ==========================================
// 职责: 看板 / 问答的只读查询（参数化，不接受自由 SQL）
// 约定: 表不存在 → RepositoryError::TableMissing，由调用方转成“尚无数据”提示
// ==========================================

use crate::db::{open_sqlite_read_only, table_exists, REQUESTS_TABLE};
use crate::domain::{
    Buyer, BuyerCount, BuyerTotal, IndicatorAverages, OverdueRequest, RequestStatus, StageCount,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, params_from_iter, Connection, Row};
use std::path::{Path, PathBuf};

const OVERDUE_COLUMNS: &str = "Solicitacao, Etapa, Comprador, DiasAtrSol";

#[derive(Debug, Clone)]
pub struct PurchaseQueryRepository {
    db_path: PathBuf,
}

impl PurchaseQueryRepository {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    /// 只读打开并确认表存在（数据库文件不存在同样视为尚未导入）
    fn open_existing(&self) -> RepositoryResult<Connection> {
        if !self.db_path.exists() {
            return Err(RepositoryError::TableMissing(REQUESTS_TABLE.to_string()));
        }
        let conn = open_sqlite_read_only(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        if !table_exists(&conn, REQUESTS_TABLE)? {
            return Err(RepositoryError::TableMissing(REQUESTS_TABLE.to_string()));
        }
        Ok(conn)
    }

    // ==========================================
    // 汇总
    // ==========================================

    pub fn count_records(&self) -> RepositoryResult<i64> {
        let conn = self.open_existing()?;
        let count = conn.query_row("SELECT COUNT(*) FROM solicitacoes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// 已审批金额合计（无记录时为 0）
    pub fn total_approved_value(&self, approved_status: &str) -> RepositoryResult<f64> {
        let conn = self.open_existing()?;
        let total = conn.query_row(
            "SELECT COALESCE(SUM(VlrTotal), 0.0) FROM solicitacoes WHERE Status = ?1",
            params![approved_status],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// 两位采购员的申请数（降序）
    pub fn buyer_counts(&self) -> RepositoryResult<Vec<BuyerCount>> {
        let conn = self.open_existing()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT Comprador, COUNT(*) AS total
            FROM solicitacoes
            WHERE Comprador IN (?1, ?2)
            GROUP BY Comprador
            ORDER BY total DESC, Comprador
            "#,
        )?;
        let [first, second] = named_buyers();
        let rows = stmt.query_map(params![first, second], |row| {
            Ok(BuyerCount {
                buyer: Buyer::from_db(&row.get::<_, String>(0)?),
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 两位采购员的已审批金额（降序）
    pub fn buyer_approved_totals(
        &self,
        approved_status: &str,
    ) -> RepositoryResult<Vec<BuyerTotal>> {
        let conn = self.open_existing()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT Comprador, COALESCE(SUM(VlrTotal), 0.0) AS total
            FROM solicitacoes
            WHERE Status = ?1 AND Comprador IN (?2, ?3)
            GROUP BY Comprador
            ORDER BY total DESC, Comprador
            "#,
        )?;
        let [first, second] = named_buyers();
        let rows = stmt.query_map(
            params![approved_status, first, second],
            |row| {
                Ok(BuyerTotal {
                    buyer: Buyer::from_db(&row.get::<_, String>(0)?),
                    total: row.get(1)?,
                })
            },
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 各流程阶段的申请数（按阶段排序）
    pub fn stage_counts(&self) -> RepositoryResult<Vec<StageCount>> {
        let conn = self.open_existing()?;
        let mut stmt = conn.prepare(
            "SELECT Etapa, COUNT(*) FROM solicitacoes GROUP BY Etapa ORDER BY Etapa",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StageCount {
                stage: row.get(0)?,
                count: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 指定阶段内的申请（按审批延迟降序）
    pub fn overdue_in_stages(&self, stages: &[String]) -> RepositoryResult<Vec<OverdueRequest>> {
        if stages.is_empty() {
            // 仍需校验表是否存在
            self.open_existing()?;
            return Ok(Vec::new());
        }
        let conn = self.open_existing()?;
        let sql = format!(
            "SELECT {} FROM solicitacoes WHERE Etapa IN ({}) ORDER BY DiasAtrSol DESC, id",
            OVERDUE_COLUMNS,
            placeholders(stages.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(stages.iter()), map_overdue)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 三个派生指标的平均值（保留两位小数）
    ///
    /// LeadTimeCompra 只统计数值文本，"contract" 与 NULL 不参与
    pub fn indicator_averages(&self) -> RepositoryResult<IndicatorAverages> {
        let conn = self.open_existing()?;
        let averages = conn.query_row(
            r#"
            SELECT
                (SELECT ROUND(AVG(CAST(LeadTimeCompra AS REAL)), 2)
                   FROM solicitacoes
                  WHERE LeadTimeCompra IS NOT NULL
                    AND LeadTimeCompra <> 'contract'
                    AND LeadTimeCompra GLOB '[0-9]*'),
                (SELECT ROUND(AVG(LeadTimeEntrega), 2) FROM solicitacoes),
                (SELECT ROUND(AVG(AtrasoEntrega), 2) FROM solicitacoes)
            "#,
            [],
            |row| {
                Ok(IndicatorAverages {
                    purchase_lead_time: row.get(0)?,
                    delivery_lead_time: row.get(1)?,
                    delivery_delay: row.get(2)?,
                })
            },
        )?;
        Ok(averages)
    }

    // ==========================================
    // 问答查询
    // ==========================================

    /// 按申请号精确查找（一个申请可能有多行）
    pub fn find_by_request_id(&self, request_id: &str) -> RepositoryResult<Vec<RequestStatus>> {
        let conn = self.open_existing()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT Solicitacao, Status, Etapa, Comprador
            FROM solicitacoes
            WHERE Solicitacao = ?1
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map(params![request_id], |row| {
            Ok(RequestStatus {
                request_id: row.get(0)?,
                status: row.get(1)?,
                stage: row.get(2)?,
                buyer: Buyer::from_db(&row.get::<_, String>(3)?),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 审批延迟超过阈值的申请（降序）
    pub fn overdue_above(&self, threshold_days: i64) -> RepositoryResult<Vec<OverdueRequest>> {
        let conn = self.open_existing()?;
        let sql = format!(
            "SELECT {} FROM solicitacoes WHERE DiasAtrSol > ?1 ORDER BY DiasAtrSol DESC, id",
            OVERDUE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![threshold_days], map_overdue)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// 待处理数量: 状态非空且不在排除集合中
    pub fn count_pending(&self, excluded_statuses: &[String]) -> RepositoryResult<i64> {
        let conn = self.open_existing()?;
        let count = if excluded_statuses.is_empty() {
            conn.query_row(
                "SELECT COUNT(*) FROM solicitacoes WHERE Status IS NOT NULL",
                [],
                |row| row.get(0),
            )?
        } else {
            let sql = format!(
                "SELECT COUNT(*) FROM solicitacoes WHERE Status IS NOT NULL AND Status NOT IN ({})",
                placeholders(excluded_statuses.len())
            );
            conn.query_row(&sql, params_from_iter(excluded_statuses.iter()), |row| {
                row.get(0)
            })?
        };
        Ok(count)
    }
}

fn named_buyers() -> [&'static str; 2] {
    let [first, second] = Buyer::NAMED;
    [first.as_str(), second.as_str()]
}

fn placeholders(n: usize) -> String {
    (1..=n).map(|i| format!("?{}", i)).collect::<Vec<_>>().join(", ")
}

fn map_overdue(row: &Row<'_>) -> rusqlite::Result<OverdueRequest> {
    Ok(OverdueRequest {
        request_id: row.get(0)?,
        stage: row.get(1)?,
        buyer: Buyer::from_db(&row.get::<_, String>(2)?),
        days_late: row.get(3)?,
    })
}
