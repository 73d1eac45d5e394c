// Core structs: QueryFields, PhoneRecord, BatchSummary
use thiserror::Error;

/// Fields pulled out of one result page. Every extraction strategy fills in
/// whatever subset it can; missing keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFields {
    pub phone: Option<String>,
    pub location: Option<String>,
    pub operator: Option<String>,
    pub area_code: Option<String>,
    pub zip_code: Option<String>,
}

impl QueryFields {
    /// True when no strategy produced anything. Drives the fallback chain.
    pub fn is_empty(&self) -> bool {
        self.phone.is_none()
            && self.location.is_none()
            && self.operator.is_none()
            && self.area_code.is_none()
            && self.zip_code.is_none()
    }
}

/// Outcome of one phone query. Immutable once built; either `fields` or
/// `error` is populated, gated by `success`.
#[derive(Debug, Clone)]
pub struct PhoneRecord {
    pub phone: String,
    pub success: bool,
    pub fields: QueryFields,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Items actually processed (may be short of `total` after a stop).
    pub attempted: usize,
    pub succeeded: usize,
    pub total: usize,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP错误: {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("写入失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV写入失败: {0}")]
    Csv(#[from] csv::Error),
    #[cfg(feature = "xlsx")]
    #[error("Excel写入失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[cfg(not(feature = "xlsx"))]
    #[error("此版本未启用Excel导出, 请使用CSV格式")]
    XlsxUnavailable,
}
