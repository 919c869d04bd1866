//! Import driver: CSV rows → typed records.
//!
//! ```text
//! bytes ─► parser ─► rows ─► check(mapping) ─► fill row by row ─► ImportReport
//! ```
//!
//! The mapping is validated once against the target type before any row is
//! touched. After that, a failing row is recorded in the report and skipped;
//! it never stops the import.

use serde::Serialize;

use crate::cache::CoercionCache;
use crate::config::ImportOptions;
use crate::error::{ImportError, ImportResult, MappingError, MappingResult};
use crate::logs::{log_info, log_success, log_warning, log_warning_indent};
use crate::mapping::MappingNode;
use crate::parser::parse_bytes;
use crate::reflect::Record;

/// Outcome of importing a batch of rows
#[derive(Debug)]
pub struct ImportReport<R> {
    /// Records for every row that mapped cleanly, in input order
    pub records: Vec<R>,
    /// Rows that failed, in input order
    pub skipped: Vec<SkippedRow>,
    /// Number of data rows seen
    pub total_rows: usize,
}

/// A row that could not be mapped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    /// 0-based data row index (header excluded)
    pub row: usize,
    /// 1-based line in the source file, when known
    pub line: Option<usize>,
    pub error: MappingError,
}

/// CSV file information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl<R> ImportReport<R> {
    fn new(total_rows: usize) -> Self {
        Self {
            records: Vec::with_capacity(total_rows),
            skipped: Vec::new(),
            total_rows,
        }
    }

    /// Every row mapped.
    pub fn is_ok(&self) -> bool {
        self.skipped.is_empty()
    }

    /// One-line summary, e.g. `3 rows: 2 imported, 1 skipped`.
    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} imported, {} skipped",
            self.total_rows,
            self.records.len(),
            self.skipped.len()
        )
    }
}

/// Fill one fresh record per row.
///
/// Fails only if the mapping does not fit `R`; row-level failures are
/// collected in the report.
pub fn import_rows<R: Record>(
    cache: &CoercionCache,
    rows: &[Vec<String>],
    mapping: &MappingNode,
) -> MappingResult<ImportReport<R>> {
    cache.check::<R>(mapping)?;
    Ok(fill_rows(cache, rows, None, mapping))
}

fn fill_rows<R: Record>(
    cache: &CoercionCache,
    rows: &[Vec<String>],
    lines: Option<&[usize]>,
    mapping: &MappingNode,
) -> ImportReport<R> {
    let mut report = ImportReport::new(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let mut record = R::default();
        match cache.fill(row, mapping, &mut record) {
            Ok(()) => report.records.push(record),
            Err(error) => report.skipped.push(SkippedRow {
                row: index,
                line: lines.and_then(|lines| lines.get(index).copied()),
                error,
            }),
        }
    }

    report
}

/// Parse CSV bytes and import every data row into `R`.
///
/// Returns [`ImportError::AllRowsFailed`] when there was at least one row and
/// none of them mapped.
pub fn import_csv<R: Record>(
    cache: &CoercionCache,
    bytes: &[u8],
    mapping: &MappingNode,
    options: &ImportOptions,
) -> ImportResult<(ImportReport<R>, CsvInfo)> {
    let parsed = parse_bytes(
        bytes,
        options.encoding.as_deref(),
        options.delimiter,
        options.has_headers,
    )?;

    let info = CsvInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter,
        headers: parsed.headers,
        row_count: parsed.rows.len(),
    };
    log_info(format!(
        "Parsed {} rows (encoding {}, delimiter {:?})",
        info.row_count, info.encoding, info.delimiter
    ));

    cache.check::<R>(mapping)?;

    let width = mapping.required_width();
    if !info.headers.is_empty() && info.headers.len() < width {
        log_warning(format!(
            "Mapping reads up to column {} but the header has {} columns",
            width - 1,
            info.headers.len()
        ));
    }

    let report: ImportReport<R> =
        fill_rows(cache, &parsed.rows, Some(parsed.lines.as_slice()), mapping);

    for skipped in report.skipped.iter().take(options.max_reported_errors) {
        log_warning_indent(
            format!(
                "Row {} skipped: {}",
                skipped.line.unwrap_or(skipped.row),
                skipped.error
            ),
            1,
        );
    }
    if report.skipped.len() > options.max_reported_errors {
        log_warning_indent(
            format!(
                "... and {} more",
                report.skipped.len() - options.max_reported_errors
            ),
            1,
        );
    }

    if report.total_rows > 0 && report.records.is_empty() {
        return Err(ImportError::AllRowsFailed(report.total_rows));
    }

    log_success(format!("{}: {}", R::NAME, report.summary()));
    Ok((report, info))
}
