// ==========================================
// 采购申请跟踪 - 应用配置
// ==========================================
// 职责: 显式配置值，构造时注入各组件（不使用进程级全局可变状态）
// 来源: 默认值 → 环境变量覆写
// ==========================================

use crate::domain::DateParseMode;
use crate::i18n::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// 环境变量键
pub mod env_keys {
    pub const DB_PATH: &str = "PURCHASE_TRACKER_DB";
    pub const DATE_MODE: &str = "PURCHASE_TRACKER_DATE_MODE";
    pub const PENDING_EXCLUDED: &str = "PURCHASE_TRACKER_PENDING_EXCLUDED";
    pub const LOCALE: &str = "PURCHASE_TRACKER_LOCALE";
}

// ==========================================
// ImportConfig - 导入配置
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// 文本日期解析偏好（默认日在前）
    pub date_mode: DateParseMode,
}

// ==========================================
// QueryConfig - 看板/问答查询配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// 计入“已采购金额”的状态
    pub approved_status: String,
    /// 不算作“待处理”的状态集合
    pub pending_excluded_statuses: Vec<String>,
    /// 报价阶段（看板“报价延迟”列表）
    pub quotation_stages: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            approved_status: "aprovado".to_string(),
            pending_excluded_statuses: vec![
                "aprovado".to_string(),
                "finalizado".to_string(),
                "cancelado".to_string(),
                "não aprovado".to_string(),
            ],
            quotation_stages: vec!["02_COTAR".to_string(), "05_COTADA".to_string()],
        }
    }
}

// ==========================================
// AppConfig - 应用配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// 用户消息语言（"pt-BR" / "en"）
    pub locale: String,
    pub import: ImportConfig,
    pub query: QueryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            locale: DEFAULT_LOCALE.to_string(),
            import: ImportConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl AppConfig {
    /// 以指定数据库路径构造（其余取默认值）
    pub fn with_db_path<P: Into<PathBuf>>(db_path: P) -> Self {
        Self {
            db_path: db_path.into(),
            locale: DEFAULT_LOCALE.to_string(),
            import: ImportConfig::default(),
            query: QueryConfig::default(),
        }
    }

    /// 读取环境变量覆写默认配置
    ///
    /// # 环境变量
    /// - PURCHASE_TRACKER_DB: 数据库文件路径
    /// - PURCHASE_TRACKER_DATE_MODE: day-first / month-first
    /// - PURCHASE_TRACKER_PENDING_EXCLUDED: 逗号分隔的状态列表
    /// - PURCHASE_TRACKER_LOCALE: 消息语言
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 以任意键值来源覆写（测试可注入）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = non_empty(lookup(env_keys::DB_PATH)) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(locale) = non_empty(lookup(env_keys::LOCALE)) {
            config.locale = locale;
        }

        if let Some(raw) = non_empty(lookup(env_keys::DATE_MODE)) {
            match DateParseMode::parse(&raw) {
                Some(mode) => config.import.date_mode = mode,
                None => warn!(value = %raw, "unknown date mode, keeping default"),
            }
        }

        if let Some(raw) = non_empty(lookup(env_keys::PENDING_EXCLUDED)) {
            config.query.pending_excluded_statuses = raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }

        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 默认数据库路径（用户数据目录，取不到时回退到当前目录）
///
/// 只计算路径，目录由写入方在首次建表时创建
pub fn default_db_path() -> PathBuf {
    match dirs::data_dir() {
        Some(data_dir) => data_dir.join("purchase-tracker").join("database.db"),
        None => PathBuf::from("./database.db"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_query_config() {
        let config = QueryConfig::default();
        assert_eq!(config.approved_status, "aprovado");
        assert!(config
            .pending_excluded_statuses
            .contains(&"não aprovado".to_string()));
        assert_eq!(config.quotation_stages, vec!["02_COTAR", "05_COTADA"]);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut vars = HashMap::new();
        vars.insert(env_keys::DB_PATH, "/tmp/compras.db".to_string());
        vars.insert(env_keys::DATE_MODE, "month-first".to_string());
        vars.insert(env_keys::LOCALE, "en".to_string());
        vars.insert(env_keys::PENDING_EXCLUDED, "Aprovado, cancelado,,".to_string());

        let config = AppConfig::from_lookup(|key| vars.get(key).cloned());

        assert_eq!(config.db_path, PathBuf::from("/tmp/compras.db"));
        assert_eq!(config.import.date_mode, DateParseMode::MonthFirst);
        assert_eq!(config.locale, "en");
        assert_eq!(
            config.query.pending_excluded_statuses,
            vec!["aprovado".to_string(), "cancelado".to_string()]
        );
    }

    #[test]
    fn test_from_lookup_ignores_invalid_values() {
        let config = AppConfig::from_lookup(|key| match key {
            env_keys::DATE_MODE => Some("sideways".to_string()),
            env_keys::DB_PATH => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.import.date_mode, DateParseMode::DayFirst);
        assert_eq!(config.locale, DEFAULT_LOCALE);
        assert_eq!(config.query, QueryConfig::default());
    }

    #[test]
    fn test_building_config_touches_no_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("override").join("compras.db");
        let db_text = db.display().to_string();

        let config = AppConfig::from_lookup(|key| match key {
            env_keys::DB_PATH => Some(db_text.clone()),
            _ => None,
        });

        assert_eq!(config.db_path, db);
        assert!(!dir.path().join("override").exists());
        assert!(default_db_path().ends_with("database.db"));
    }
}
