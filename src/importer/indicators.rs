// ==========================================
// 采购申请跟踪 - 派生指标计算
// ==========================================
// 职责: 采购周期 / 交付周期 / 交付延迟（三者相互独立）
// 红线: 下单早于审批 → contract，不是负数
// 红线: 收货早于订单审批 → NULL，不截断为 0
// 红线: 交付延迟下限 0
// ==========================================

use crate::domain::{DateParseMode, PurchaseLeadTime};
use crate::importer::importer_trait::IndicatorService;
use crate::importer::value_normalizer::parse_date_text;
use chrono::NaiveDate;

// ==========================================
// IndicatorCalculator - 指标计算器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorCalculator;

impl IndicatorCalculator {
    pub fn new() -> Self {
        Self
    }
}

impl IndicatorService for IndicatorCalculator {
    fn purchase_lead_time(
        &self,
        ordered_on: Option<NaiveDate>,
        request_approved_on: Option<NaiveDate>,
    ) -> Option<PurchaseLeadTime> {
        let (ordered, approved) = (ordered_on?, request_approved_on?);
        if ordered < approved {
            Some(PurchaseLeadTime::Contract)
        } else {
            Some(PurchaseLeadTime::Days((ordered - approved).num_days()))
        }
    }

    fn delivery_lead_time(
        &self,
        received_on: Option<NaiveDate>,
        order_approved_on: Option<NaiveDate>,
    ) -> Option<i64> {
        let (received, approved) = (received_on?, order_approved_on?);
        if received >= approved {
            Some((received - approved).num_days())
        } else {
            None
        }
    }

    fn delivery_delay(
        &self,
        received_on: Option<NaiveDate>,
        promised_on: Option<NaiveDate>,
    ) -> Option<i64> {
        let (received, promised) = (received_on?, promised_on?);
        Some((received - promised).num_days().max(0))
    }
}

// ==========================================
// 文本入口（原始或已归一化的日期文本，无法解析视为缺失）
// ==========================================

fn parse(text: &str) -> Option<NaiveDate> {
    parse_date_text(text, DateParseMode::DayFirst)
}

/// 采购周期（下单日期文本, 申请审批日期文本）
pub fn purchase_lead_time(ordered_on: &str, request_approved_on: &str) -> Option<PurchaseLeadTime> {
    IndicatorCalculator.purchase_lead_time(parse(ordered_on), parse(request_approved_on))
}

/// 交付周期（收货日期文本, 订单审批日期文本）
pub fn delivery_lead_time(received_on: &str, order_approved_on: &str) -> Option<i64> {
    IndicatorCalculator.delivery_lead_time(parse(received_on), parse(order_approved_on))
}

/// 交付延迟（收货日期文本, 原承诺交付日期文本）
pub fn delivery_delay(received_on: &str, promised_on: &str) -> Option<i64> {
    IndicatorCalculator.delivery_delay(parse(received_on), parse(promised_on))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_lead_time_days() {
        assert_eq!(
            purchase_lead_time("2024-01-10", "2024-01-01"),
            Some(PurchaseLeadTime::Days(9))
        );
        assert_eq!(
            purchase_lead_time("2024-01-01", "2024-01-01"),
            Some(PurchaseLeadTime::Days(0))
        );
        // 跨月跨年
        assert_eq!(
            purchase_lead_time("2024-03-01", "2023-12-31"),
            Some(PurchaseLeadTime::Days(61))
        );
    }

    #[test]
    fn test_purchase_lead_time_contract_when_order_precedes_approval() {
        assert_eq!(
            purchase_lead_time("2024-01-01", "2024-01-10"),
            Some(PurchaseLeadTime::Contract)
        );
    }

    #[test]
    fn test_purchase_lead_time_missing_date() {
        assert_eq!(purchase_lead_time("", "2024-01-10"), None);
        assert_eq!(purchase_lead_time("2024-01-10", "sem data"), None);
    }

    #[test]
    fn test_delivery_lead_time() {
        assert_eq!(delivery_lead_time("2024-02-10", "2024-02-01"), Some(9));
        assert_eq!(delivery_lead_time("2024-02-01", "2024-02-01"), Some(0));
        // 录入顺序异常 → NULL，而不是 0
        assert_eq!(delivery_lead_time("2024-01-20", "2024-02-01"), None);
        assert_eq!(delivery_lead_time("", "2024-02-01"), None);
    }

    #[test]
    fn test_delivery_delay_clamped_at_zero() {
        assert_eq!(delivery_delay("2024-02-01", "2024-02-05"), Some(0));
        assert_eq!(delivery_delay("2024-02-10", "2024-02-05"), Some(5));
        assert_eq!(delivery_delay("2024-02-05", "2024-02-05"), Some(0));
        assert_eq!(delivery_delay("2024-02-10", ""), None);
    }

    #[test]
    fn test_raw_day_first_text_accepted() {
        assert_eq!(delivery_delay("10/02/2024", "05/02/2024"), Some(5));
        assert_eq!(
            purchase_lead_time("10/01/2024", "01/01/2024"),
            Some(PurchaseLeadTime::Days(9))
        );
    }

    #[test]
    fn test_typed_service_matches_text_entry() {
        let calc = IndicatorCalculator::new();
        let d = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
        assert_eq!(
            calc.delivery_lead_time(d("2024-02-10"), d("2024-02-01")),
            delivery_lead_time("2024-02-10", "2024-02-01")
        );
        assert_eq!(calc.delivery_delay(None, d("2024-02-01")), None);
    }
}
