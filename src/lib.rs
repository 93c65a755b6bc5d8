// ==========================================
// 采购申请跟踪 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 采购申请表格导入 + 看板 + 问答
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "pt-BR");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 导入层 - 外部表格
pub mod importer;

// 配置层 - 应用配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/表结构）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{Buyer, CellValue, DateParseMode, InternalField, PurchaseLeadTime, PurchaseRequest};

// 配置
pub use config::{AppConfig, ImportConfig, QueryConfig};

// 导入
pub use importer::{HeaderReconciler, ImportError, RequestLoader, RowError};

// 仓储
pub use repository::{
    PurchaseQueryRepository, PurchaseRequestStore, SqlitePurchaseRequestRepository,
};

// API
pub use api::{ChatApi, DashboardApi, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "Purchase Tracker";
