// ==========================================
// 采购申请跟踪 - 表头对齐
// ==========================================
// 职责: 实际表头 → 内部字段（声明式别名表，按顺序尝试）
// 红线: 任一必填字段无法对齐 → 整体失败，并列出全部缺失字段
// ==========================================

use crate::domain::InternalField;
use crate::importer::error::{ImportError, ImportResult};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// 内部字段 → 可接受的表头写法（首项为当前表格的主名称）
///
/// 后续写法依次为: 去重音 ASCII、UTF-8 被按 Latin-1 读出的乱码、历史版本名称
const HEADER_VARIANTS: &[(InternalField, &[&str])] = &[
    (
        InternalField::Solicitacao,
        &["Solicitação", "Solicitacao", "SolicitaÃ§Ã£o", "Solicita‡Æo"],
    ),
    (InternalField::DtAbertura, &["DtAbertura", "Dt.Abertura"]),
    (InternalField::DtAprovSol, &["DtAprovSol", "Dt.AprovSol"]),
    (InternalField::Comprador, &["Comprador"]),
    (InternalField::Fornecedor, &["Fornec", "Fornecedor"]),
    (
        InternalField::Produto,
        &["Descrição", "Descricao", "DescriÃ§Ã£o", "Descri‡Æo", "Produto"],
    ),
    (InternalField::Qtde, &["Qt.Solicitada", "Qtd.Solicitada", "Qtde"]),
    (
        InternalField::PrecoUnitario,
        &[
            "Preço Unitário",
            "Preco Unitario",
            "PreÃ§o UnitÃ¡rio",
            "Pre‡o Unit\tário",
            "PrecoUnitario",
        ],
    ),
    (InternalField::Moeda, &["Moeda"]),
    (InternalField::VlrTotal, &["Vlr Total", "Vlr.Total", "VlrTotal"]),
    (InternalField::DtAprovPedido, &["DtAprovPedido", "Dt.AprovPedido"]),
    (InternalField::DtPedido, &["Dt.Pedido", "DtPedido"]),
    (InternalField::Pedido, &["Pedido"]),
    (InternalField::DtEntregaOrig, &["Dt.EntregaOrig", "DtEntregaOrig"]),
    (InternalField::DtEntregaAtual, &["DtEntregaAtual", "Dt.EntregaAtual"]),
    (InternalField::DtReceb, &["Dt.Receb", "DtReceb"]),
    (InternalField::Status, &["Estado", "Status"]),
    (InternalField::Etapa, &["Etapa"]),
    (InternalField::DiasAtrSol, &["Dias Atr Sol", "DiasAtrSol", "Dias Atr.Sol"]),
];

// ==========================================
// ColumnMapping - 对齐结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    columns: BTreeMap<InternalField, String>,
}

impl ColumnMapping {
    /// 字段对应的实际表头（可选字段缺失时为 None）
    pub fn header_for(&self, field: InternalField) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: InternalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ==========================================
// HeaderReconciler - 表头对齐器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderReconciler;

impl HeaderReconciler {
    pub fn new() -> Self {
        Self
    }

    /// 字段的全部可接受写法
    pub fn variants(field: InternalField) -> &'static [&'static str] {
        HEADER_VARIANTS
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| *v)
            .unwrap_or(&[])
    }

    /// 对齐表头
    ///
    /// # 参数
    /// - headers: 文件中的表头（解析时已去除首尾空白）
    ///
    /// # 返回
    /// - Ok(ColumnMapping): 全部必填字段已对齐
    /// - Err(ImportError::MissingColumns): 列出每一个缺失的必填字段
    pub fn reconcile<S: AsRef<str>>(&self, headers: &[S]) -> ImportResult<ColumnMapping> {
        let present: HashSet<&str> = headers.iter().map(|h| h.as_ref()).collect();

        let mut mapping = ColumnMapping::default();
        let mut missing = Vec::new();

        for (field, variants) in HEADER_VARIANTS {
            match variants.iter().find(|v| present.contains(**v)) {
                Some(header) => {
                    debug!(field = %field, header = %header, "header matched");
                    mapping.columns.insert(*field, (*header).to_string());
                }
                None if field.is_required() => missing.push(*field),
                None => debug!(field = %field, "optional column absent"),
            }
        }

        if !missing.is_empty() {
            warn!(missing = ?missing, "required columns not found");
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(mapping)
    }
}
