// ==========================================
// 采购申请跟踪 - 领域类型
// ==========================================
// 职责: 采购员枚举 / 采购周期哨兵值 / 日期解析模式 / 单元格原始值
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Buyer - 采购员（封闭枚举）
// ==========================================
// 红线: 只允许三个取值，白名单外一律归为 Other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Buyer {
    Miriam,
    Irineu,
    Other,
}

impl Buyer {
    /// 有名字的采购员（看板/问答只统计这两位）
    pub const NAMED: [Buyer; 2] = [Buyer::Miriam, Buyer::Irineu];

    /// 持久化使用的文本值
    pub fn as_str(&self) -> &'static str {
        match self {
            Buyer::Miriam => "Miriam",
            Buyer::Irineu => "Irineu",
            Buyer::Other => "Other",
        }
    }

    /// 从原始单元格文本归一化
    ///
    /// # 规则
    /// - TRIM → Title Case → 白名单匹配
    /// - 白名单外（含空值）→ Other
    pub fn from_raw(raw: &str) -> Self {
        match title_case(raw.trim()).as_str() {
            "Miriam" => Buyer::Miriam,
            "Irineu" => Buyer::Irineu,
            _ => Buyer::Other,
        }
    }

    /// 从数据库文本解析（未知值按 Other 处理）
    pub fn from_db(value: &str) -> Self {
        match value {
            "Miriam" => Buyer::Miriam,
            "Irineu" => Buyer::Irineu,
            _ => Buyer::Other,
        }
    }
}

impl fmt::Display for Buyer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 每个单词首字母大写、其余小写
fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ==========================================
// PurchaseLeadTime - 采购周期
// ==========================================
// 下单日期早于申请审批日期 → Contract（既有供货协议，不是临时申请）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurchaseLeadTime {
    Days(i64),
    Contract,
}

impl PurchaseLeadTime {
    pub const CONTRACT_SENTINEL: &'static str = "contract";

    /// 持久化文本（整数天数或 "contract"）
    pub fn to_db_text(&self) -> String {
        match self {
            PurchaseLeadTime::Days(days) => days.to_string(),
            PurchaseLeadTime::Contract => Self::CONTRACT_SENTINEL.to_string(),
        }
    }

    pub fn from_db_text(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed == Self::CONTRACT_SENTINEL {
            return Some(PurchaseLeadTime::Contract);
        }
        trimmed.parse::<i64>().ok().map(PurchaseLeadTime::Days)
    }
}

impl fmt::Display for PurchaseLeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_db_text())
    }
}

// ==========================================
// DateParseMode - 文本日期解析偏好
// ==========================================
// 早期表格按日/月/年录入，后期版本去掉了日在前的偏好，因此做成可配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateParseMode {
    #[default]
    DayFirst,
    MonthFirst,
}

impl DateParseMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "day-first" | "dayfirst" | "dmy" => Some(DateParseMode::DayFirst),
            "month-first" | "monthfirst" | "mdy" => Some(DateParseMode::MonthFirst),
            _ => None,
        }
    }
}

// ==========================================
// CellValue - 单元格原始值
// ==========================================
// 用途: 文件解析输出，保留 Excel 原生类型（日期/数值）供归一化使用
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    /// Excel 错误单元格（#N/A、#REF! 等）
    Error(String),
}

impl CellValue {
    /// 空值或纯空白文本
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 转为去除首尾空白的文本（空 → None）
    ///
    /// 整数值的浮点数按整数输出（12345.0 → "12345"）
    pub fn to_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
