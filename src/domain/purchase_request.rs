// ==========================================
// 采购申请跟踪 - 采购申请领域模型
// ==========================================
// 职责: 内部字段清单 + 采购申请记录（每个申请行一条）
// 用途: 导入层写入，看板/问答只读
// ==========================================

use crate::domain::types::{Buyer, PurchaseLeadTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// InternalField - 内部字段（即持久化列名）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InternalField {
    Solicitacao,
    DtAbertura,
    DtAprovSol,
    Comprador,
    Fornecedor,
    Produto,
    Qtde,
    PrecoUnitario,
    Moeda,
    VlrTotal,
    DtAprovPedido,
    DtPedido,
    Pedido,
    DtEntregaOrig,
    DtEntregaAtual,
    DtReceb,
    Status,
    Etapa,
    DiasAtrSol,
}

impl InternalField {
    /// 必填字段（16 个，缺任意一个即整体拒绝导入）
    pub const REQUIRED: [InternalField; 16] = [
        InternalField::Solicitacao,
        InternalField::DtAprovSol,
        InternalField::Comprador,
        InternalField::Fornecedor,
        InternalField::Produto,
        InternalField::Qtde,
        InternalField::PrecoUnitario,
        InternalField::VlrTotal,
        InternalField::DtAprovPedido,
        InternalField::DtPedido,
        InternalField::Pedido,
        InternalField::DtEntregaOrig,
        InternalField::DtReceb,
        InternalField::Status,
        InternalField::Etapa,
        InternalField::DiasAtrSol,
    ];

    /// 可选字段（缺失时记录值为 NULL）
    pub const OPTIONAL: [InternalField; 3] = [
        InternalField::Moeda,
        InternalField::DtEntregaAtual,
        InternalField::DtAbertura,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InternalField::Solicitacao => "Solicitacao",
            InternalField::DtAbertura => "DtAbertura",
            InternalField::DtAprovSol => "DtAprovSol",
            InternalField::Comprador => "Comprador",
            InternalField::Fornecedor => "Fornecedor",
            InternalField::Produto => "Produto",
            InternalField::Qtde => "Qtde",
            InternalField::PrecoUnitario => "PrecoUnitario",
            InternalField::Moeda => "Moeda",
            InternalField::VlrTotal => "VlrTotal",
            InternalField::DtAprovPedido => "DtAprovPedido",
            InternalField::DtPedido => "DtPedido",
            InternalField::Pedido => "Pedido",
            InternalField::DtEntregaOrig => "DtEntregaOrig",
            InternalField::DtEntregaAtual => "DtEntregaAtual",
            InternalField::DtReceb => "DtReceb",
            InternalField::Status => "Status",
            InternalField::Etapa => "Etapa",
            InternalField::DiasAtrSol => "DiasAtrSol",
        }
    }

    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }
}

impl fmt::Display for InternalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// PurchaseRequest - 采购申请记录
// ==========================================
// 红线: 单价/总价只能是合法浮点数或 NULL，不能是原始字符串
// 红线: days_late 缺失/非数值时为 0，不为 NULL
// 对齐: solicitacoes 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    // ===== 业务键（不唯一，一个申请可有多行）=====
    pub request_id: String, // Solicitacao

    // ===== 采购信息 =====
    pub buyer: Buyer,                 // Comprador
    pub supplier: Option<String>,     // Fornecedor
    pub product: Option<String>,      // Produto
    pub quantity: Option<f64>,        // Qtde
    pub unit_price: Option<f64>,      // PrecoUnitario（清洗后）
    pub unit_price_raw: Option<String>, // PrecoUnitarioOrig（审计用原值）
    pub currency: Option<String>,     // Moeda（可选列）
    pub total_value: Option<f64>,     // VlrTotal
    pub order_number: Option<String>, // Pedido

    // ===== 生命周期日期（YYYY-MM-DD）=====
    pub opened_on: Option<NaiveDate>,             // DtAbertura（可选列）
    pub request_approved_on: Option<NaiveDate>,   // DtAprovSol
    pub order_approved_on: Option<NaiveDate>,     // DtAprovPedido
    pub ordered_on: Option<NaiveDate>,            // DtPedido
    pub promised_delivery_on: Option<NaiveDate>,  // DtEntregaOrig
    pub current_delivery_on: Option<NaiveDate>,   // DtEntregaAtual（可选列）
    pub received_on: Option<NaiveDate>,           // DtReceb

    // ===== 流程状态 =====
    pub status: Option<String>, // Status（小写 + "nao aprovado" 拼写修正）
    pub stage: Option<String>,  // Etapa
    pub days_late: i64,         // DiasAtrSol

    // ===== 派生指标 =====
    pub purchase_lead_time: Option<PurchaseLeadTime>, // LeadTimeCompra
    pub delivery_lead_time: Option<i64>,              // LeadTimeEntrega
    pub delivery_delay: Option<i64>,                  // AtrasoEntrega
}
