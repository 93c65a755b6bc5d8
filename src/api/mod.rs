// ==========================================
// 采购申请跟踪 - API 层
// ==========================================
// 职责: 面向调用方（CLI / 外部 Web 层）的导入、看板、问答接口
// 约定: 底层错误统一转换为成功/失败消息或“尚无数据”提示
// ==========================================

pub mod chat_api;
pub mod dashboard_api;
pub mod error;
pub mod import_api;

pub use chat_api::{ChatApi, ChatReply, IntentHandler};
pub use dashboard_api::{DashboardApi, DashboardSnapshot};
pub use error::{ApiError, ApiResult};
pub use import_api::{ImportApi, LoadReport};
