//! Error types for the rowmap engine.
//!
//! Errors are split by the phase that raises them:
//!
//! - [`CoercionError`] - a single token could not become a field value
//! - [`MappingError`] - a row could not be applied to a record (per-row, recoverable)
//! - [`EngineError`] - a record type has no coercion strategy (build time, fatal)
//! - [`SchemaError`] - schema derivation was asked for a non-record type
//! - [`CsvError`] - reading delimited input
//! - [`ConfigError`] - environment and mapping file configuration
//! - [`ImportError`] - top-level import orchestration
//!
//! Lower layers convert into higher ones via `From`, so `?` works across
//! boundaries.

use thiserror::Error;

use crate::models::PrimitiveKind;

// =============================================================================
// Coercion Errors
// =============================================================================

/// A raw token could not be written into a typed field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// Token is not a valid value of the field's kind.
    #[error("Cannot parse '{token}' as {expected} for field '{field}'")]
    ParseFailure {
        field: String,
        token: String,
        expected: PrimitiveKind,
    },

    /// Field kind needs parse options that the mapping did not provide.
    #[error("Field '{field}' requires parse options that were not provided")]
    MissingOption { field: String },
}

// =============================================================================
// Engine (build-time) Errors
// =============================================================================

/// Structural problems with a record type, found while building its
/// coercion entry. These indicate a programming defect, not bad data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Field shape has no coercion strategy (arrays, optional wrappers).
    #[error("Record '{record}' field '{field}' has unsupported kind: {kind}")]
    UnsupportedFieldKind {
        record: &'static str,
        field: &'static str,
        kind: String,
    },

    /// Two fields of one record registered under the same name.
    #[error("Record '{record}' registers field '{field}' more than once")]
    DuplicateField {
        record: &'static str,
        field: &'static str,
    },

    /// A cache slot held an entry of a different record type.
    #[error("Coercion cache slot for '{0}' holds a foreign entry")]
    SlotMismatch(&'static str),
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors while applying one row to one record through a mapping tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// Mapping node names a field the record does not have.
    #[error("Unknown field '{field}' on record '{record}'")]
    UnknownField { record: &'static str, field: String },

    /// Referenced column is past the end of the row.
    #[error("Column {index} is out of range for a row of {len} fields")]
    RowTooShort { index: usize, len: usize },

    /// A leaf targets a nested record, or a branch targets a scalar field.
    #[error("Field '{field}' on record '{record}' must be mapped by a {expected} node")]
    ShapeMismatch {
        record: &'static str,
        field: String,
        expected: &'static str,
    },

    /// Token coercion failed.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// Target record type could not be prepared.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

// =============================================================================
// Schema Errors
// =============================================================================

/// Errors from schema derivation. Always a caller mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// `derive_schema` was called on something that is not a record.
    #[error("Type '{0}' is not a structured record type")]
    NotAStructuredType(String),
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading delimited input.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Content could not be decoded.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Delimiter must be a single ASCII character.
    #[error("Delimiter '{0}' is not a single-byte character")]
    InvalidDelimiter(char),

    /// Malformed record.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyFile,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds an unusable value.
    #[error("Invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },

    /// Mapping file could not be read.
    #[error("Failed to read mapping file: {0}")]
    Io(#[from] std::io::Error),

    /// Mapping file is not a valid mapping tree.
    #[error("Invalid mapping JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Import Errors (top-level)
// =============================================================================

/// Top-level import orchestration errors.
///
/// Per-row failures are not errors at this level; they are collected in the
/// import report. Only structural or input-level problems surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Mapping tree does not fit the target record.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Target record type is not coercible.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Schema derivation error.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Every row in the input failed.
    #[error("All {0} rows failed to map")]
    AllRowsFailed(usize),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for token coercion.
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Result type for coercion entry construction.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type for mapping a row.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for schema derivation.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for CSV reading.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for imports.
pub type ImportResult<T> = Result<T, ImportError>;
