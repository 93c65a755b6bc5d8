// ==========================================
// 采购申请跟踪 - 配置层
// ==========================================
// 职责: 应用配置（默认值 + 环境变量覆写），构造时注入
// ==========================================

pub mod app_config;

pub use app_config::{default_db_path, env_keys, AppConfig, ImportConfig, QueryConfig};
