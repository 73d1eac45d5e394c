// Result export: CSV (UTF-8 with BOM) and, when built with the `xlsx`
// feature, an Excel workbook.
use crate::model::{ExportError, PhoneRecord};
use chrono::Local;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const EXPORT_HEADERS: [&str; 7] = [
    "手机号",
    "归属地",
    "运营商",
    "区号",
    "邮编",
    "状态",
    "查询时间",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes to `path`, routing on its extension. Anything that is neither
/// `.csv` nor `.xlsx` gets `.csv` appended, mirroring the save-dialog
/// default. Returns the path actually written.
pub fn export_records(path: &Path, records: &[PhoneRecord]) -> Result<PathBuf, ExportError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => {
            export_csv(path, records)?;
            Ok(path.to_path_buf())
        }
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => {
            export_xlsx(path, records)?;
            Ok(path.to_path_buf())
        }
        _ => {
            let mut fallback = path.as_os_str().to_owned();
            fallback.push(".csv");
            let fallback = PathBuf::from(fallback);
            export_csv(&fallback, records)?;
            Ok(fallback)
        }
    }
}

pub fn export_csv(path: &Path, records: &[PhoneRecord]) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    // BOM first, so Excel decodes the Chinese headers correctly.
    file.write_all(b"\xEF\xBB\xBF")?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(EXPORT_HEADERS)?;

    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    for record in records {
        writer.write_record(record_row(record, &timestamp))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
pub fn export_xlsx(path: &Path, records: &[PhoneRecord]) -> Result<(), ExportError> {
    use rust_xlsxwriter::Workbook;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("手机号查询结果")?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    for (row, record) in records.iter().enumerate() {
        for (col, cell) in record_row(record, &timestamp).iter().enumerate() {
            sheet.write_string(row as u32 + 1, col as u16, cell.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
pub fn export_xlsx(_path: &Path, _records: &[PhoneRecord]) -> Result<(), ExportError> {
    Err(ExportError::XlsxUnavailable)
}

fn record_row(record: &PhoneRecord, timestamp: &str) -> [String; 7] {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();
    let status = if record.success {
        "成功".to_string()
    } else {
        format!("失败: {}", record.error.as_deref().unwrap_or(""))
    };

    [
        record.phone.clone(),
        field(&record.fields.location),
        field(&record.fields.operator),
        field(&record.fields.area_code),
        field(&record.fields.zip_code),
        status,
        timestamp.to_string(),
    ]
}
