// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、测试表格（CSV / XLSX）生成
// ==========================================
#![allow(dead_code)]

use purchase_tracker::i18n::{set_locale, DEFAULT_LOCALE};
use purchase_tracker::{logging, AppConfig};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::error::Error;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 标准表头（16 个必填列，使用表格中的原始名称）
pub const STANDARD_HEADERS: [&str; 16] = [
    "Solicitação",
    "DtAprovSol",
    "Comprador",
    "Fornec",
    "Descrição",
    "Qt.Solicitada",
    "Preço Unitário",
    "Vlr Total",
    "DtAprovPedido",
    "Dt.Pedido",
    "Pedido",
    "Dt.EntregaOrig",
    "Dt.Receb",
    "Estado",
    "Etapa",
    "Dias Atr Sol",
];

/// 测试环境: 临时目录 + 指向其中数据库的配置
///
/// # 返回
/// - TempDir: 临时目录（需要保持存活）
/// - AppConfig: 数据库路径在临时目录内（文件尚不存在）
pub fn create_test_env() -> (TempDir, AppConfig) {
    let dir = TempDir::new().expect("创建临时目录失败");
    logging::init_test();
    set_locale(DEFAULT_LOCALE);
    let config = AppConfig::with_db_path(dir.path().join("solicitacoes.db"));
    (dir, config)
}

/// 一行合法数据（与 STANDARD_HEADERS 对齐）
pub fn good_row(
    request_id: &str,
    buyer: &str,
    status: &str,
    stage: &str,
    days_late: i64,
) -> Vec<String> {
    vec![
        request_id.to_string(),
        "01/01/2024".to_string(),
        buyer.to_string(),
        "Acme Ltda".to_string(),
        "Parafuso".to_string(),
        "10".to_string(),
        "R$ 1.234,56".to_string(),
        "12.345,60".to_string(),
        "12/01/2024".to_string(),
        "10/01/2024".to_string(),
        format!("P-{}", request_id),
        "05/02/2024".to_string(),
        "10/02/2024".to_string(),
        status.to_string(),
        stage.to_string(),
        days_late.to_string(),
    ]
}

/// 替换某一列的值
pub fn with_cell(mut row: Vec<String>, header: &str, value: &str) -> Vec<String> {
    if let Some(idx) = STANDARD_HEADERS.iter().position(|h| *h == header) {
        row[idx] = value.to_string();
    }
    row
}

/// 写出分号分隔的 UTF-8 CSV
pub fn write_csv<S: AsRef<str>>(
    dir: &Path,
    name: &str,
    headers: &[S],
    rows: &[Vec<String>],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_path(&path)?;
    writer.write_record(headers.iter().map(|h| h.as_ref()))?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(path)
}

/// 写出 Windows-1252 编码的 CSV（模拟旧版 Excel 导出）
pub fn write_csv_windows_1252<S: AsRef<str>>(
    dir: &Path,
    name: &str,
    headers: &[S],
    rows: &[Vec<String>],
) -> Result<PathBuf, Box<dyn Error>> {
    let mut text = headers
        .iter()
        .map(|h| h.as_ref())
        .collect::<Vec<_>>()
        .join(";");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(";"));
        text.push('\n');
    }
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(&text);
    assert!(!had_errors, "文本无法以 Windows-1252 编码");

    let path = dir.join(name);
    std::fs::write(&path, bytes.as_ref())?;
    Ok(path)
}

/// 写出 XLSX（日期列写为原生日期单元格，数量/延迟写为数值）
pub fn write_xlsx(
    dir: &Path,
    name: &str,
    rows: &[Vec<String>],
) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("dd/mm/yyyy");
    let sheet = workbook.add_worksheet();

    for (col, header) in STANDARD_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    for (r, row) in rows.iter().enumerate() {
        let excel_row = (r + 1) as u32;
        for (col, value) in row.iter().enumerate() {
            let header = STANDARD_HEADERS[col];
            let col = col as u16;
            if let Some((day, month, year)) = split_br_date(value) {
                let date = ExcelDateTime::from_ymd(year, month, day)?;
                sheet.write_datetime_with_format(excel_row, col, &date, &date_format)?;
            } else if matches!(header, "Qt.Solicitada" | "Dias Atr Sol") {
                match value.parse::<f64>() {
                    Ok(n) => sheet.write_number(excel_row, col, n)?,
                    Err(_) => sheet.write_string(excel_row, col, value)?,
                };
            } else {
                sheet.write_string(excel_row, col, value)?;
            }
        }
    }

    workbook.save(&path)?;
    Ok(path)
}

fn split_br_date(value: &str) -> Option<(u8, u8, u16)> {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }
    Some((parts[0].parse().ok()?, parts[1].parse().ok()?, parts[2].parse().ok()?))
}
