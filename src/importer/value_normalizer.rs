// ==========================================
// 采购申请跟踪 - 单元格值归一化
// ==========================================
// 职责: 日期 / 金额 / 数量 / 延迟天数 / 文本的纯函数归一化
// 红线: 畸形输入返回 None 或默认值，不抛错
// ==========================================

use crate::domain::{CellValue, DateParseMode};
use chrono::{Duration, NaiveDate};

// ==========================================
// 日期格式表
// ==========================================

/// ISO 格式（任何模式下最先尝试，保证规范形式幂等）
const ISO_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d",
];

// 两位年份在前：%Y 也接受 "24"，会被解析成公元 24 年
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y",
];

const MONTH_FIRST_FORMATS: &[&str] = &[
    "%m/%d/%y", "%m-%d-%y", "%m.%d.%y", "%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y",
];

/// 英文月份名（与日/月顺序无关）
const NAMED_MONTH_FORMATS: &[&str] = &["%d %b %Y", "%b %d, %Y", "%d %B %Y", "%B %d, %Y"];

/// Excel 序列日期的合理区间（1950-01-01 ~ 2099-12-31）
const EXCEL_SERIAL_MIN: f64 = 18_264.0;
const EXCEL_SERIAL_MAX: f64 = 73_050.0;

// ==========================================
// DateNormalizer - 日期归一化
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    mode: DateParseMode,
}

impl DateNormalizer {
    pub fn new(mode: DateParseMode) -> Self {
        Self { mode }
    }

    /// 单元格 → 日期
    ///
    /// # 规则
    /// - 原生日期时间 → 取日期部分
    /// - 数值 → 合理区间内按 Excel 序列日期处理
    /// - 文本 → 宽松解析（见 parse_date_text）
    /// - 其他 → None
    pub fn normalize(&self, cell: &CellValue) -> Option<NaiveDate> {
        match cell {
            CellValue::DateTime(dt) => Some(dt.date()),
            CellValue::Number(n) => excel_serial_to_date(*n),
            CellValue::Text(text) => parse_date_text(text, self.mode),
            CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
        }
    }

    /// 单元格 → YYYY-MM-DD 文本
    pub fn normalize_to_string(&self, cell: &CellValue) -> Option<String> {
        self.normalize(cell).map(format_date)
    }
}

/// 规范日期文本
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// 文本日期宽松解析
///
/// # 参数
/// - text: 原始文本（允许首尾空白、附带时间部分）
/// - mode: 日/月 顺序偏好
///
/// # 返回
/// - Some(date): 任一格式解析成功
/// - None: 全部失败
///
/// # 顺序
/// ISO → 偏好顺序 → 相反顺序（偏好下非法时回退）→ 英文月份名 → 纯数字序列日期
pub fn parse_date_text(text: &str, mode: DateParseMode) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if starts_with_year(trimmed) {
        if let Some(date) = try_formats(trimmed, ISO_FORMATS) {
            return Some(date);
        }
    }

    let (preferred, fallback) = match mode {
        DateParseMode::DayFirst => (DAY_FIRST_FORMATS, MONTH_FIRST_FORMATS),
        DateParseMode::MonthFirst => (MONTH_FIRST_FORMATS, DAY_FIRST_FORMATS),
    };

    // "10/01/2024 00:00:00" 之类带时间的文本只取日期部分
    let date_part = trimmed.split_whitespace().next().unwrap_or(trimmed);
    for candidate in [trimmed, date_part] {
        if let Some(date) = try_formats(candidate, preferred) {
            return Some(date);
        }
        if let Some(date) = try_formats(candidate, fallback) {
            return Some(date);
        }
    }

    if let Some(date) = try_formats(trimmed, NAMED_MONTH_FORMATS) {
        return Some(date);
    }

    // CSV 导出的序列日期会以文本形式出现
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(excel_serial_to_date)
}

fn starts_with_year(text: &str) -> bool {
    text.len() > 4 && text.bytes().take(4).all(|b| b.is_ascii_digit())
}

fn try_formats(text: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Excel 序列日期 → 日期（1900 日期系统，起点 1899-12-30）
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(EXCEL_SERIAL_MIN..=EXCEL_SERIAL_MAX).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}

// ==========================================
// 金额归一化
// ==========================================

/// 单元格 → 金额
///
/// # 规则
/// - 数值 → 有限值原样返回
/// - 文本 → 去货币符号/空白 → 去千分位 "." → 小数逗号转 "." → 解析
/// - 空值或无法解析 → None
pub fn normalize_price(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(text) => parse_price_text(text),
        _ => None,
    }
}

/// 巴西格式金额文本解析（"R$ 1.234,56" → 1234.56）
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, 'R' | '$' | '.') && !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ==========================================
// 数量归一化
// ==========================================

/// 单元格 → 数量
///
/// # 返回
/// - Ok(None): 空值
/// - Ok(Some(v)): 数值单元格原样；含逗号的文本按巴西格式，否则按普通小数
/// - Err(raw): 有值但无法解析（行级错误）
pub fn normalize_quantity(cell: &CellValue) -> Result<Option<f64>, String> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Number(n) if n.is_finite() => Ok(Some(*n)),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed = if trimmed.contains(',') {
                parse_price_text(trimmed)
            } else {
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            };
            parsed.map(Some).ok_or_else(|| trimmed.to_string())
        }
        other => Err(other.to_text().unwrap_or_default()),
    }
}

// ==========================================
// 延迟天数归一化
// ==========================================

/// 单元格 → 审批延迟天数（缺失/非数值 → 0）
pub fn normalize_days_late(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Number(n) if n.is_finite() => n.trunc() as i64,
        CellValue::Text(text) => {
            let trimmed = text.trim();
            trimmed
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|v| v.trunc() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

// ==========================================
// 文本归一化
// ==========================================

/// 单元格 → 去空白文本（空 → None）
pub fn normalize_text(cell: &CellValue) -> Option<String> {
    cell.to_text()
}

/// 状态: 小写 + "nao aprovado" 拼写修正
pub fn normalize_status(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered == "nao aprovado" {
        "não aprovado".to_string()
    } else {
        lowered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_date_native_datetime() {
        let dt = NaiveDateTime::parse_from_str("2024-03-15 13:45:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let normalizer = DateNormalizer::default();
        assert_eq!(
            normalizer.normalize_to_string(&CellValue::DateTime(dt)),
            Some("2024-03-15".to_string())
        );
    }

    #[test]
    fn test_date_day_first_shapes() {
        let normalizer = DateNormalizer::new(DateParseMode::DayFirst);
        assert_eq!(normalizer.normalize(&text("10/01/2024")), Some(ymd(2024, 1, 10)));
        assert_eq!(normalizer.normalize(&text("10-01-2024")), Some(ymd(2024, 1, 10)));
        assert_eq!(normalizer.normalize(&text("10.01.2024")), Some(ymd(2024, 1, 10)));
        assert_eq!(normalizer.normalize(&text("10/01/24")), Some(ymd(2024, 1, 10)));
        assert_eq!(normalizer.normalize(&text(" 2024/01/10 ")), Some(ymd(2024, 1, 10)));
        assert_eq!(
            normalizer.normalize(&text("10/01/2024 00:00:00")),
            Some(ymd(2024, 1, 10))
        );
        assert_eq!(normalizer.normalize(&text("10 Jan 2024")), Some(ymd(2024, 1, 10)));
        assert_eq!(normalizer.normalize(&text("Jan 10, 2024")), Some(ymd(2024, 1, 10)));
    }

    #[test]
    fn test_date_canonical_form_is_idempotent() {
        let normalizer = DateNormalizer::default();
        for raw in ["01/02/2024", "31/12/2023", "29/02/2024", "05.06.23", "15-08-2022"] {
            let first = normalizer.normalize_to_string(&text(raw)).unwrap();
            let second = normalizer.normalize_to_string(&text(&first)).unwrap();
            assert_eq!(first, second, "input {}", raw);
        }
    }

    #[test]
    fn test_date_mode_disagreement_on_ambiguous_input() {
        // 同一文本在两种模式下得到不同日期（表格版本间的不一致）
        let day_first = DateNormalizer::new(DateParseMode::DayFirst);
        let month_first = DateNormalizer::new(DateParseMode::MonthFirst);

        assert_eq!(day_first.normalize(&text("03/04/2024")), Some(ymd(2024, 4, 3)));
        assert_eq!(month_first.normalize(&text("03/04/2024")), Some(ymd(2024, 3, 4)));
        assert_ne!(
            day_first.normalize(&text("03/04/2024")),
            month_first.normalize(&text("03/04/2024"))
        );
    }

    #[test]
    fn test_date_fallback_to_other_order() {
        let day_first = DateNormalizer::new(DateParseMode::DayFirst);
        assert_eq!(day_first.normalize(&text("01/13/2024")), Some(ymd(2024, 1, 13)));

        let month_first = DateNormalizer::new(DateParseMode::MonthFirst);
        assert_eq!(month_first.normalize(&text("13/01/2024")), Some(ymd(2024, 1, 13)));
    }

    #[test]
    fn test_date_excel_serial() {
        let normalizer = DateNormalizer::default();
        assert_eq!(normalizer.normalize(&CellValue::Number(45292.0)), Some(ymd(2024, 1, 1)));
        assert_eq!(normalizer.normalize(&text("45292")), Some(ymd(2024, 1, 1)));
        assert_eq!(normalizer.normalize(&CellValue::Number(12.0)), None);
    }

    #[test]
    fn test_date_malformed_returns_none() {
        let normalizer = DateNormalizer::default();
        assert_eq!(normalizer.normalize(&text("amanhã")), None);
        assert_eq!(normalizer.normalize(&text("32/13/2024")), None);
        assert_eq!(normalizer.normalize(&text("   ")), None);
        assert_eq!(normalizer.normalize(&CellValue::Empty), None);
        assert_eq!(normalizer.normalize(&CellValue::Error("#N/A".into())), None);
    }

    #[test]
    fn test_price_brazilian_format() {
        assert_eq!(parse_price_text("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_price_text("1.234,56"), Some(1234.56));
        assert_eq!(parse_price_text("50"), Some(50.0));
        assert_eq!(parse_price_text("R$\u{a0}12,50"), Some(12.5));
        assert_eq!(parse_price_text("$ 3,00"), Some(3.0));
        assert_eq!(parse_price_text("R 10,00"), Some(10.0));
        assert_eq!(parse_price_text("R10,00"), Some(10.0));
    }

    #[test]
    fn test_price_empty_or_invalid() {
        assert_eq!(parse_price_text(""), None);
        assert_eq!(parse_price_text("R$  "), None);
        assert_eq!(parse_price_text("a combinar"), None);
        assert_eq!(parse_price_text("inf"), None);
        assert_eq!(normalize_price(&CellValue::Empty), None);
        assert_eq!(normalize_price(&CellValue::Bool(true)), None);
    }

    #[test]
    fn test_price_native_number() {
        assert_eq!(normalize_price(&CellValue::Number(99.9)), Some(99.9));
        assert_eq!(normalize_price(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn test_quantity_rules() {
        assert_eq!(normalize_quantity(&CellValue::Number(3.0)), Ok(Some(3.0)));
        assert_eq!(normalize_quantity(&text("2,5")), Ok(Some(2.5)));
        assert_eq!(normalize_quantity(&text("1.000,5")), Ok(Some(1000.5)));
        assert_eq!(normalize_quantity(&text("12.5")), Ok(Some(12.5)));
        assert_eq!(normalize_quantity(&text(" ")), Ok(None));
        assert_eq!(normalize_quantity(&CellValue::Empty), Ok(None));
        assert_eq!(normalize_quantity(&text("dez")), Err("dez".to_string()));
    }

    #[test]
    fn test_days_late_defaults_to_zero() {
        assert_eq!(normalize_days_late(&CellValue::Number(12.0)), 12);
        assert_eq!(normalize_days_late(&CellValue::Number(4.9)), 4);
        assert_eq!(normalize_days_late(&text(" 7 ")), 7);
        assert_eq!(normalize_days_late(&text("3.0")), 3);
        assert_eq!(normalize_days_late(&text("n/a")), 0);
        assert_eq!(normalize_days_late(&CellValue::Empty), 0);
        assert_eq!(normalize_days_late(&CellValue::Error("#REF!".into())), 0);
    }

    #[test]
    fn test_status_normalization() {
        assert_eq!(normalize_status("APROVADO"), "aprovado");
        assert_eq!(normalize_status(" Nao Aprovado "), "não aprovado");
        assert_eq!(normalize_status("Em Cotação"), "em cotação");
    }
}
