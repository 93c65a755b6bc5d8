// ==========================================
// 采购申请跟踪 - 行记录转换
// ==========================================
// 职责: 原始行 + 列映射 → PurchaseRequest 或 RowError
// 流程: 取值 → 归一化 → 字段后处理 → 派生指标
// ==========================================

use crate::domain::{Buyer, CellValue, InternalField, PurchaseRequest};
use crate::importer::error::RowError;
use crate::importer::file_parser::RawRow;
use crate::importer::header_reconciler::ColumnMapping;
use crate::importer::importer_trait::IndicatorService;
use crate::importer::indicators::IndicatorCalculator;
use crate::importer::value_normalizer::{
    normalize_days_late, normalize_price, normalize_quantity, normalize_status, normalize_text,
    DateNormalizer,
};

static EMPTY_CELL: CellValue = CellValue::Empty;

// ==========================================
// RecordTransformer - 行转换器
// ==========================================
pub struct RecordTransformer {
    dates: DateNormalizer,
    indicators: Box<dyn IndicatorService>,
}

impl RecordTransformer {
    pub fn new(dates: DateNormalizer) -> Self {
        Self::with_indicators(dates, Box::new(IndicatorCalculator::new()))
    }

    pub fn with_indicators(dates: DateNormalizer, indicators: Box<dyn IndicatorService>) -> Self {
        Self { dates, indicators }
    }

    /// 转换一行
    ///
    /// # 参数
    /// - row: 原始行（带表格行号）
    /// - mapping: 表头对齐结果
    ///
    /// # 返回
    /// - Ok(PurchaseRequest): 可直接写入
    /// - Err(RowError): 该行跳过（空申请号 / 错误单元格 / 数量无法解析）
    pub fn transform(
        &self,
        row: &RawRow,
        mapping: &ColumnMapping,
    ) -> Result<PurchaseRequest, RowError> {
        let row_number = row.row_number;
        let cell = |field: InternalField| -> Result<&CellValue, RowError> {
            let value = match mapping.header_for(field) {
                Some(header) => row.get(header),
                None => &EMPTY_CELL,
            };
            if let CellValue::Error(code) = value {
                return Err(RowError::ErrorCell {
                    row: row_number,
                    field,
                    value: code.clone(),
                });
            }
            Ok(value)
        };

        // ===== 业务键 =====
        let request_id = normalize_text(cell(InternalField::Solicitacao)?)
            .ok_or(RowError::MissingRequestId { row: row_number })?;

        // ===== 数值字段 =====
        let quantity = normalize_quantity(cell(InternalField::Qtde)?).map_err(|value| {
            RowError::TypeConversion {
                row: row_number,
                field: InternalField::Qtde,
                value,
            }
        })?;
        let price_cell = cell(InternalField::PrecoUnitario)?;
        let unit_price = normalize_price(price_cell);
        let unit_price_raw = price_cell.to_text();
        let total_value = normalize_price(cell(InternalField::VlrTotal)?);
        let days_late = normalize_days_late(cell(InternalField::DiasAtrSol)?);

        // ===== 日期字段 =====
        let date = |field: InternalField| cell(field).map(|c| self.dates.normalize(c));
        let opened_on = date(InternalField::DtAbertura)?;
        let request_approved_on = date(InternalField::DtAprovSol)?;
        let order_approved_on = date(InternalField::DtAprovPedido)?;
        let ordered_on = date(InternalField::DtPedido)?;
        let promised_delivery_on = date(InternalField::DtEntregaOrig)?;
        let current_delivery_on = date(InternalField::DtEntregaAtual)?;
        let received_on = date(InternalField::DtReceb)?;

        // ===== 文本字段 =====
        let raw_buyer = normalize_text(cell(InternalField::Comprador)?).unwrap_or_default();
        let buyer = Buyer::from_raw(&raw_buyer);
        let status = normalize_text(cell(InternalField::Status)?).map(|s| normalize_status(&s));

        Ok(PurchaseRequest {
            request_id,
            buyer,
            supplier: normalize_text(cell(InternalField::Fornecedor)?),
            product: normalize_text(cell(InternalField::Produto)?),
            quantity,
            unit_price,
            unit_price_raw,
            currency: normalize_text(cell(InternalField::Moeda)?),
            total_value,
            order_number: normalize_text(cell(InternalField::Pedido)?),
            opened_on,
            request_approved_on,
            order_approved_on,
            ordered_on,
            promised_delivery_on,
            current_delivery_on,
            received_on,
            status,
            stage: normalize_text(cell(InternalField::Etapa)?),
            days_late,
            purchase_lead_time: self
                .indicators
                .purchase_lead_time(ordered_on, request_approved_on),
            delivery_lead_time: self
                .indicators
                .delivery_lead_time(received_on, order_approved_on),
            delivery_delay: self
                .indicators
                .delivery_delay(received_on, promised_delivery_on),
        })
    }
}

impl Default for RecordTransformer {
    fn default() -> Self {
        Self::new(DateNormalizer::default())
    }
}
