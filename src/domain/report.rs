// ==========================================
// 采购申请跟踪 - 查询结果模型
// ==========================================
// 用途: 查询仓储 → 看板 / 问答
// ==========================================

use crate::domain::types::Buyer;
use serde::{Deserialize, Serialize};

/// 按采购员计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerCount {
    pub buyer: Buyer,
    pub count: i64,
}

/// 按采购员汇总金额（仅已审批）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyerTotal {
    pub buyer: Buyer,
    pub total: f64,
}

/// 按流程阶段计数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: Option<String>,
    pub count: i64,
}

/// 审批延迟的申请行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueRequest {
    pub request_id: String,
    pub stage: Option<String>,
    pub buyer: Buyer,
    pub days_late: i64,
}

/// 单个申请的状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestStatus {
    pub request_id: String,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub buyer: Buyer,
}

/// 三个派生指标的平均值（无数据为 None，保留两位小数）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorAverages {
    pub purchase_lead_time: Option<f64>,
    pub delivery_lead_time: Option<f64>,
    pub delivery_delay: Option<f64>,
}
