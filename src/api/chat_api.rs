// ==========================================
// 采购申请问答API
// ==========================================
// 职责: 按顺序匹配意图（正则 + 处理函数），首个命中生效，否则返回帮助
// 红线: 不因任何查询错误崩溃，统一转为友好回复
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{AppConfig, QueryConfig};
use crate::i18n::{t, t_with_args};
use crate::repository::PurchaseQueryRepository;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, error, info};

static STATUS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:status|estado)\s+(?:da\s+)?(?:solicitação|solicitacao|pedido)\s+(\w+)")
        .expect("status pattern")
});

static PENDING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:quantas|n[uú]mero de)\s+(?:solicitações|solicitacoes|pedidos)\s+(?:estão|estao)\s+pendentes",
    )
    .expect("pending pattern")
});

static OVERDUE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:quais|listar)\s+(?:solicitações|solicitacoes|pedidos)\s+(?:com mais de|acima de|com)\s+(\d+)\s+dias\s+(?:de\s+)?(?:atraso|atrasadas)",
    )
    .expect("overdue pattern")
});

/// 意图处理函数
pub type IntentHandler = fn(&ChatApi, &Captures<'_>) -> ApiResult<String>;

struct Intent {
    name: &'static str,
    pattern: Regex,
    handler: IntentHandler,
}

/// 问答回复
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// 命中的意图（未命中 / 错误时为 None）
    pub intent: Option<String>,
    pub reply: String,
}

impl ChatReply {
    fn plain(reply: String) -> Self {
        Self {
            intent: None,
            reply,
        }
    }
}

pub struct ChatApi {
    queries: PurchaseQueryRepository,
    config: QueryConfig,
    intents: Vec<Intent>,
}

impl ChatApi {
    /// 创建问答API（内置三个意图，顺序即优先级）
    pub fn new(config: &AppConfig) -> Self {
        let mut api = Self {
            queries: PurchaseQueryRepository::new(&config.db_path),
            config: config.query.clone(),
            intents: Vec::new(),
        };
        api.register("request_status", STATUS_PATTERN.clone(), Self::handle_status);
        api.register("pending_count", PENDING_PATTERN.clone(), Self::handle_pending);
        api.register("overdue_list", OVERDUE_PATTERN.clone(), Self::handle_overdue);
        api
    }

    /// 追加意图（排在已有意图之后）
    pub fn register(&mut self, name: &'static str, pattern: Regex, handler: IntentHandler) {
        self.intents.push(Intent {
            name,
            pattern,
            handler,
        });
    }

    pub fn intent_names(&self) -> Vec<&'static str> {
        self.intents.iter().map(|i| i.name).collect()
    }

    /// 回复一条消息
    pub fn reply(&self, message: &str) -> ChatReply {
        let message = message.trim();
        if message.is_empty() {
            return ChatReply::plain(t("chat.empty_message"));
        }
        info!(message = %message, "chat message received");

        // 表不存在时，任何问题都回复“尚未导入”
        if let Err(err) = self.queries.count_records() {
            return ChatReply::plain(self.error_reply(err.into()));
        }

        for intent in &self.intents {
            if let Some(caps) = intent.pattern.captures(message) {
                debug!(intent = intent.name, "intent matched");
                let reply = match (intent.handler)(self, &caps) {
                    Ok(reply) => reply,
                    Err(err) => self.error_reply(err),
                };
                return ChatReply {
                    intent: Some(intent.name.to_string()),
                    reply,
                };
            }
        }

        ChatReply::plain(t("chat.help"))
    }

    fn error_reply(&self, err: ApiError) -> String {
        match err {
            ApiError::NoData => t("chat.not_loaded"),
            ApiError::InvalidInput(reason) => {
                debug!(reason = %reason, "chat input rejected");
                t("chat.help")
            }
            other => {
                error!(error = %other, "chat query failed");
                t("chat.storage_failed")
            }
        }
    }

    // ==========================================
    // 意图处理
    // ==========================================

    fn handle_status(&self, caps: &Captures<'_>) -> ApiResult<String> {
        let request_id = capture(caps, 1)?;
        let found = self.queries.find_by_request_id(request_id)?;

        let reply = match found.first() {
            Some(hit) => {
                let not_informed = t("common.not_informed");
                t_with_args(
                    "chat.status_found",
                    &[
                        ("id", request_id),
                        ("status", hit.status.as_deref().unwrap_or(&not_informed)),
                        ("stage", hit.stage.as_deref().unwrap_or(&not_informed)),
                        ("buyer", hit.buyer.as_str()),
                    ],
                )
            }
            None => t_with_args("chat.status_not_found", &[("id", request_id)]),
        };
        Ok(reply)
    }

    fn handle_pending(&self, _caps: &Captures<'_>) -> ApiResult<String> {
        let count = self
            .queries
            .count_pending(&self.config.pending_excluded_statuses)?
            .to_string();
        Ok(t_with_args("chat.pending_count", &[("count", count.as_str())]))
    }

    fn handle_overdue(&self, caps: &Captures<'_>) -> ApiResult<String> {
        let raw_days = capture(caps, 1)?;
        let days: i64 = raw_days
            .parse()
            .map_err(|_| ApiError::InvalidInput(format!("days out of range: {}", raw_days)))?;

        let overdue = self.queries.overdue_above(days)?;
        if overdue.is_empty() {
            return Ok(t_with_args("chat.overdue_none", &[("days", raw_days)]));
        }

        let count = overdue.len().to_string();
        let mut lines = vec![t_with_args(
            "chat.overdue_header",
            &[("count", count.as_str()), ("days", raw_days)],
        )];
        for item in &overdue {
            let late = item.days_late.to_string();
            lines.push(t_with_args(
                "chat.overdue_line",
                &[
                    ("id", item.request_id.as_str()),
                    ("buyer", item.buyer.as_str()),
                    ("late", late.as_str()),
                ],
            ));
        }
        Ok(lines.join("\n"))
    }
}

fn capture<'t>(caps: &Captures<'t>, index: usize) -> ApiResult<&'t str> {
    caps.get(index)
        .map(|m| m.as_str())
        .ok_or_else(|| ApiError::InvalidInput(format!("missing capture group {}", index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::{set_locale, tests::LOCALE_TEST_LOCK, DEFAULT_LOCALE};

    #[test]
    fn test_patterns_match_variants() {
        assert_eq!(
            &STATUS_PATTERN.captures("Qual o STATUS DA SOLICITAÇÃO 12345?").unwrap()[1],
            "12345"
        );
        assert!(STATUS_PATTERN.is_match("estado pedido A77"));
        assert!(PENDING_PATTERN.is_match("Quantas solicitacoes estao pendentes?"));
        assert!(PENDING_PATTERN.is_match("numero de pedidos estão pendentes"));
        assert_eq!(
            &OVERDUE_PATTERN
                .captures("listar pedidos com mais de 7 dias de atraso")
                .unwrap()[1],
            "7"
        );
        assert!(OVERDUE_PATTERN.is_match("quais solicitações acima de 3 dias atrasadas"));
        assert!(!OVERDUE_PATTERN.is_match("listar pedidos"));
    }

    #[test]
    fn test_intent_order() {
        let dir = tempfile::TempDir::new().unwrap();
        let api = ChatApi::new(&AppConfig::with_db_path(dir.path().join("c.db")));
        assert_eq!(
            api.intent_names(),
            vec!["request_status", "pending_count", "overdue_list"]
        );
    }

    #[test]
    fn test_empty_and_missing_table_replies() {
        let _guard = LOCALE_TEST_LOCK.lock().unwrap();
        set_locale(DEFAULT_LOCALE);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("c.db");
        let api = ChatApi::new(&AppConfig::with_db_path(&path));

        assert_eq!(api.reply("   ").reply, "Por favor, envie uma mensagem.");
        let reply = api.reply("status da solicitação 1");
        assert!(reply.reply.starts_with("A base de dados ainda não foi carregada"));
        assert_eq!(reply.intent, None);
        // 只读检查，不留下空数据库文件
        assert!(!path.exists());
    }
}
