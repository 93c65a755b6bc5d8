// ==========================================
// 采购申请跟踪 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod error;
pub mod query_repo;
pub mod request_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use query_repo::PurchaseQueryRepository;
pub use request_repo::{PurchaseRequestStore, ReplaceSink, SqlitePurchaseRequestRepository};
