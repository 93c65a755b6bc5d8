// ==========================================
// 采购申请跟踪 - 采购申请存储
// ==========================================
// 职责: 建表 / 事务内整表替换 / 计数（使用 rusqlite）
// 红线: Repository 不含业务规则，只做数据 CRUD
// 红线: 连接按操作获取，返回前释放（含错误路径）
// ==========================================

use crate::db::{open_sqlite_connection, table_exists, CREATE_REQUESTS_TABLE_SQL, REQUESTS_TABLE};
use crate::domain::PurchaseRequest;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Transaction};
use std::path::{Path, PathBuf};
use tracing::{debug, error, instrument};

// ==========================================
// ReplaceSink - 替换事务内的写入接口
// ==========================================
pub trait ReplaceSink {
    /// 删除全部记录，返回删除行数
    fn clear(&mut self) -> RepositoryResult<usize>;

    /// 插入一条记录，返回新行 id
    fn insert(&mut self, request: &PurchaseRequest) -> RepositoryResult<i64>;
}

// ==========================================
// PurchaseRequestStore Trait
// ==========================================
pub trait PurchaseRequestStore {
    /// 幂等建表
    fn ensure_schema(&self) -> RepositoryResult<()>;

    /// 在单个事务中执行 f
    ///
    /// # 返回
    /// - f 返回 Ok → 提交
    /// - f 返回 Err → 回滚，原有数据保持不变
    fn replace_all<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut dyn ReplaceSink) -> RepositoryResult<T>;

    /// 当前记录数（表不存在 → TableMissing）
    fn count(&self) -> RepositoryResult<i64>;
}

// ==========================================
// SqlitePurchaseRequestRepository
// ==========================================
#[derive(Debug, Clone)]
pub struct SqlitePurchaseRequestRepository {
    db_path: PathBuf,
}

impl SqlitePurchaseRequestRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（连接在每次操作时打开）
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> RepositoryResult<Connection> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RepositoryError::DatabaseConnectionError(format!(
                        "cannot create {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }
        open_sqlite_connection(&self.db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))
    }
}

impl PurchaseRequestStore for SqlitePurchaseRequestRepository {
    #[instrument(skip(self), fields(db = %self.db_path.display()))]
    fn ensure_schema(&self) -> RepositoryResult<()> {
        let conn = self.open()?;
        conn.execute_batch(CREATE_REQUESTS_TABLE_SQL)?;
        debug!("schema ensured");
        Ok(())
    }

    fn replace_all<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut dyn ReplaceSink) -> RepositoryResult<T>,
    {
        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let outcome = {
            let mut sink = SqliteReplaceSink { tx: &tx };
            f(&mut sink)
        };

        match outcome {
            Ok(value) => {
                tx.commit()
                    .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    fn count(&self) -> RepositoryResult<i64> {
        let conn = self.open()?;
        if !table_exists(&conn, REQUESTS_TABLE)? {
            return Err(RepositoryError::TableMissing(REQUESTS_TABLE.to_string()));
        }
        let count = conn.query_row("SELECT COUNT(*) FROM solicitacoes", [], |row| row.get(0))?;
        Ok(count)
    }
}

// ==========================================
// SqliteReplaceSink - 事务内写入
// ==========================================
struct SqliteReplaceSink<'a> {
    tx: &'a Transaction<'a>,
}

impl ReplaceSink for SqliteReplaceSink<'_> {
    fn clear(&mut self) -> RepositoryResult<usize> {
        let deleted = self.tx.execute("DELETE FROM solicitacoes", [])?;
        Ok(deleted)
    }

    fn insert(&mut self, r: &PurchaseRequest) -> RepositoryResult<i64> {
        let mut stmt = self.tx.prepare_cached(
            r#"
            INSERT INTO solicitacoes (
                Solicitacao, DtAbertura, DtAprovSol, Comprador, Fornecedor, Produto,
                Qtde, PrecoUnitario, PrecoUnitarioOrig, Moeda, VlrTotal,
                DtAprovPedido, DtPedido, Pedido, DtEntregaOrig, DtEntregaAtual, DtReceb,
                Status, Etapa, DiasAtrSol, LeadTimeCompra, LeadTimeEntrega, AtrasoEntrega
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
                ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
            )
            "#,
        )?;

        stmt.execute(params![
            r.request_id,
            r.opened_on,
            r.request_approved_on,
            r.buyer.as_str(),
            r.supplier,
            r.product,
            r.quantity,
            r.unit_price,
            r.unit_price_raw,
            r.currency,
            r.total_value,
            r.order_approved_on,
            r.ordered_on,
            r.order_number,
            r.promised_delivery_on,
            r.current_delivery_on,
            r.received_on,
            r.status,
            r.stage,
            r.days_late,
            r.purchase_lead_time.map(|lt| lt.to_db_text()),
            r.delivery_lead_time,
            r.delivery_delay,
        ])?;

        Ok(self.tx.last_insert_rowid())
    }
}
