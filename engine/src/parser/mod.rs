//! CSV reader with encoding and delimiter auto-detection.
//!
//! Produces plain rows of strings; nothing here knows about records or
//! mappings. The header row, when present, is split off from the data rows.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Candidate delimiters, in tie-breaking order.
const DELIMITERS: [char; 4] = [';', ',', '\t', '|'];

/// Parsed input with the settings that were used to read it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    /// Header row, empty when the input has none
    pub headers: Vec<String>,
    /// Data rows, header excluded
    pub rows: Vec<Vec<String>>,
    /// 1-based source line where each data row starts
    pub lines: Vec<usize>,
    /// Detected or requested encoding
    pub encoding: String,
    /// Detected or requested delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes with the given encoding label.
///
/// Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => {
            String::from_utf8(bytes.to_vec()).map_err(|e| CsvError::Encoding(e.to_string()))
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(codec) => Ok(codec.decode(bytes).0.into_owned()),
            None => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// Pick the delimiter that occurs most often in the first line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for sep in DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best = sep;
        }
    }
    best
}

/// Rows read from decoded content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Starting line of each row; quoted fields may span several lines
    pub lines: Vec<usize>,
}

/// Read decoded content into rows.
///
/// Rows may have different widths; short rows are reported later by the
/// resolver, not here. Blank lines are skipped.
pub fn read_rows(content: &str, delimiter: char, has_headers: bool) -> CsvResult<Rows> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if !delimiter.is_ascii() {
        return Err(CsvError::InvalidDelimiter(delimiter));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(has_headers)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = if has_headers {
        reader
            .headers()
            .map_err(parse_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();
    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        let line = record.position().map_or(0, |pos| pos.line() as usize);
        lines.push(line);
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Rows {
        headers,
        rows,
        lines,
    })
}

fn parse_error(err: csv::Error) -> CsvError {
    let line = err.position().map_or(0, |pos| pos.line());
    match err.into_kind() {
        csv::ErrorKind::Io(io) => CsvError::Io(io),
        kind => CsvError::Parse {
            line,
            message: format!("{:?}", kind),
        },
    }
}

/// Parse bytes with explicit or auto-detected settings.
///
/// `None` for encoding or delimiter means detect it.
pub fn parse_bytes(
    bytes: &[u8],
    encoding: Option<&str>,
    delimiter: Option<char>,
    has_headers: bool,
) -> CsvResult<ParsedCsv> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = encoding.map_or_else(|| detect_encoding(bytes), str::to_string);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let Rows {
        headers,
        rows,
        lines,
    } = read_rows(&content, delimiter, has_headers)?;

    Ok(ParsedCsv {
        headers,
        rows,
        lines,
        encoding,
        delimiter,
    })
}

/// Parse bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParsedCsv> {
    parse_bytes(bytes, None, None, true)
}

/// Parse a file with auto-detection of encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParsedCsv> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
