// ==========================================
// 采购申请跟踪 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 连接按“每次逻辑操作”获取，操作结束（含错误路径）随作用域释放
// ==========================================

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 采购申请表名
pub const REQUESTS_TABLE: &str = "solicitacoes";

/// 采购申请表结构（幂等创建）
///
/// 说明：id 为自增代理键，Solicitacao 不唯一
pub const CREATE_REQUESTS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS solicitacoes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    Solicitacao TEXT NOT NULL,
    DtAbertura TEXT,
    DtAprovSol TEXT,
    Comprador TEXT NOT NULL CHECK (Comprador IN ('Miriam', 'Irineu', 'Other')),
    Fornecedor TEXT,
    Produto TEXT,
    Qtde REAL,
    PrecoUnitario REAL,
    PrecoUnitarioOrig TEXT,
    Moeda TEXT,
    VlrTotal REAL,
    DtAprovPedido TEXT,
    DtPedido TEXT,
    Pedido TEXT,
    DtEntregaOrig TEXT,
    DtEntregaAtual TEXT,
    DtReceb TEXT,
    Status TEXT,
    Etapa TEXT,
    DiasAtrSol INTEGER NOT NULL DEFAULT 0,
    LeadTimeCompra TEXT,
    LeadTimeEntrega INTEGER,
    AtrasoEntrega INTEGER
)
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 以只读方式打开已存在的数据库（文件不存在时报错，不会创建）
pub fn open_sqlite_read_only<P: AsRef<Path>>(db_path: P) -> rusqlite::Result<Connection> {
    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 判断表是否存在
pub fn table_exists(conn: &Connection, table: &str) -> rusqlite::Result<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1 LIMIT 1",
            [table],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_table_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!table_exists(&conn, REQUESTS_TABLE).unwrap());

        conn.execute_batch(CREATE_REQUESTS_TABLE_SQL).unwrap();
        conn.execute_batch(CREATE_REQUESTS_TABLE_SQL).unwrap();

        assert!(table_exists(&conn, REQUESTS_TABLE).unwrap());
    }

    #[test]
    fn test_read_only_open_never_creates_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("ausente.db");
        assert!(open_sqlite_read_only(&path).is_err());
        assert!(!path.exists());

        open_sqlite_connection(&path)
            .unwrap()
            .execute_batch(CREATE_REQUESTS_TABLE_SQL)
            .unwrap();
        let conn = open_sqlite_read_only(&path).unwrap();
        assert!(table_exists(&conn, REQUESTS_TABLE).unwrap());
        assert!(conn.execute("DELETE FROM solicitacoes", []).is_err());
    }

    #[test]
    fn test_buyer_check_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_REQUESTS_TABLE_SQL).unwrap();

        let ok = conn.execute(
            "INSERT INTO solicitacoes (Solicitacao, Comprador) VALUES ('1', 'Miriam')",
            [],
        );
        assert!(ok.is_ok());

        let rejected = conn.execute(
            "INSERT INTO solicitacoes (Solicitacao, Comprador) VALUES ('2', 'Outro')",
            [],
        );
        assert!(rejected.is_err());
    }
}
