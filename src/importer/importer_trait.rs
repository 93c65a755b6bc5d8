// ==========================================
// 采购申请跟踪 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道的接缝（不包含实现）
// ==========================================

use crate::domain::PurchaseLeadTime;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::RawSheet;
use chrono::NaiveDate;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（表头 + 行记录）
// 实现者: ExcelParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 原始行记录
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawSheet): 表头（已去除首尾空白）与非空数据行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// IndicatorService Trait
// ==========================================
// 用途: 日期派生指标（三个指标相互独立，均为纯函数）
// 实现者: IndicatorCalculator
pub trait IndicatorService: Send + Sync {
    /// 采购周期 = 下单日期 - 申请审批日期
    ///
    /// # 规则
    /// - 任一日期缺失 → None
    /// - 下单日期早于审批日期 → Contract
    /// - 否则 → Days(天数)
    fn purchase_lead_time(
        &self,
        ordered_on: Option<NaiveDate>,
        request_approved_on: Option<NaiveDate>,
    ) -> Option<PurchaseLeadTime>;

    /// 交付周期 = 收货日期 - 订单审批日期
    ///
    /// # 规则
    /// - 任一日期缺失 → None
    /// - 收货日期早于订单审批日期 → None（录入顺序异常，不截断为 0）
    fn delivery_lead_time(
        &self,
        received_on: Option<NaiveDate>,
        order_approved_on: Option<NaiveDate>,
    ) -> Option<i64>;

    /// 交付延迟 = 收货日期 - 原承诺交付日期，下限 0
    ///
    /// # 规则
    /// - 任一日期缺失 → None
    /// - 提前/准时交付 → 0
    fn delivery_delay(
        &self,
        received_on: Option<NaiveDate>,
        promised_on: Option<NaiveDate>,
    ) -> Option<i64>;
}
