// ==========================================
// 采购申请跟踪 - 领域层
// ==========================================
// 职责: 实体与类型（不含持久化细节）
// ==========================================

pub mod purchase_request;
pub mod report;
pub mod types;

pub use purchase_request::{InternalField, PurchaseRequest};
pub use report::{
    BuyerCount, BuyerTotal, IndicatorAverages, OverdueRequest, RequestStatus, StageCount,
};
pub use types::{Buyer, CellValue, DateParseMode, PurchaseLeadTime};
