// ==========================================
// 采购申请跟踪 - 文件解析器实现
// ==========================================
// 支持: Excel (.xlsx/.xls，首个工作表) / CSV (.csv)
// 约定: 第一行为表头，表头去除首尾空白，完全空白的行跳过
// ==========================================

use crate::domain::CellValue;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// CSV 候选分隔符（按表头行出现次数选取）
const CSV_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

// ==========================================
// RawSheet / RawRow - 解析输出
// ==========================================

/// 一行原始数据
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 表格行号（表头 = 第 1 行）
    pub row_number: usize,
    pub cells: HashMap<String, CellValue>,
}

impl RawRow {
    /// 按表头取值（不存在时返回 Empty）
    pub fn get(&self, header: &str) -> &CellValue {
        self.cells.get(header).unwrap_or(&EMPTY_CELL)
    }
}

/// 整张表
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawSheet {
    /// 由表头 + 逐行单元格构造（跳过完全空白的行，重复表头取第一列）
    fn build<I>(headers: Vec<String>, rows: I) -> Self
    where
        I: IntoIterator<Item = (usize, Vec<CellValue>)>,
    {
        let mut sheet_rows = Vec::new();
        for (row_number, values) in rows {
            if values.iter().all(CellValue::is_blank) {
                continue;
            }

            let mut cells = HashMap::with_capacity(headers.len());
            for (header, value) in headers.iter().zip(values) {
                if header.is_empty() {
                    continue;
                }
                cells.entry(header.clone()).or_insert(value);
            }
            sheet_rows.push(RawRow { row_number, cells });
        }

        Self {
            headers,
            rows: sheet_rows,
        }
    }
}

fn check_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 读取文本（UTF-8 失败时按 Windows-1252 解码）
    fn read_text(path: &Path) -> ImportResult<String> {
        let bytes = std::fs::read(path)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                let bytes = err.into_bytes();
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
                debug!(file = %path.display(), "csv is not utf-8, decoded as windows-1252");
                decoded.into_owned()
            }
        };
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    /// 根据表头行选择分隔符（默认逗号）
    pub fn detect_delimiter(text: &str) -> u8 {
        let header_line = text.lines().next().unwrap_or("");
        CSV_DELIMITERS
            .iter()
            .copied()
            .map(|d| (d, header_line.bytes().filter(|b| *b == d).count()))
            .filter(|(_, count)| *count > 0)
            .max_by_key(|(_, count)| *count)
            .map(|(d, _)| d)
            .unwrap_or(b',')
    }
}

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let text = Self::read_text(file_path)?;
        let delimiter = Self::detect_delimiter(&text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true) // 允许行长度不一致
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeaderRow);
        }

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_number = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            let values = record
                .iter()
                .map(|v| {
                    let trimmed = v.trim();
                    if trimmed.is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(trimmed.to_string())
                    }
                })
                .collect();
            rows.push((row_number, values));
        }

        let sheet = RawSheet::build(headers, rows);
        info!(
            file = %file_path.display(),
            delimiter = %(delimiter as char).escape_default(),
            rows = sheet.rows.len(),
            "csv parsed"
        );
        Ok(sheet)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => CellValue::DateTime(value),
                None => CellValue::Number(dt.as_f64()),
            },
            Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(e.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        check_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;

        // 读取第一个 sheet
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet_name)?;

        // 区域可能不从 A1 开始
        let first_row = range.start().map(|(r, _)| r as usize).unwrap_or(0);

        let mut rows = range.rows();
        let header_row = rows.next().ok_or(ImportError::MissingHeaderRow)?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeaderRow);
        }

        let data_rows = rows.enumerate().map(|(idx, row)| {
            let values = row.iter().map(Self::convert_cell).collect();
            (first_row + idx + 2, values)
        });

        let sheet = RawSheet::build(headers, data_rows);
        info!(
            file = %file_path.display(),
            sheet = %sheet_name,
            rows = sheet.rows.len(),
            "workbook parsed"
        );
        Ok(sheet)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        match extension_of(file_path).as_str() {
            "csv" => CsvParser.parse(file_path),
            "xlsx" | "xls" => ExcelParser.parse(file_path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
