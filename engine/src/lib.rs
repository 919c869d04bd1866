//! # Rowmap - declarative CSV row to typed record mapping
//!
//! Rowmap fills strongly typed, possibly nested records from delimited rows,
//! driven by a mapping tree built at runtime, and derives an abstract schema
//! description of any record type.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Resolver   │────▶│   Records   │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │ (+ mapping) │     │   (typed)   │
//! └─────────────┘     └─────────────┘     └──────┬──────┘     └─────────────┘
//!                                                │
//!                                         ┌──────▼──────┐
//!                                         │ Coercion    │
//!                                         │ cache       │
//!                                         └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rowmap::{impl_record, CoercionCache, MappingNode, ParseOptions};
//!
//! #[derive(Debug, Default)]
//! struct Subs {
//!     website: String,
//! }
//! impl_record!(Subs { website => "Website" });
//!
//! let cache = CoercionCache::new();
//! let mapping = MappingNode::branch("Subs", vec![MappingNode::leaf("Website", 4)]);
//! let mut subs = Subs::default();
//! cache.fill(&row, &mapping, &mut subs)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per phase
//! - [`models`] - Schema descriptors
//! - [`mapping`] - Mapping trees and parse options
//! - [`reflect`] - Record registration and type shapes
//! - [`coerce`] - Token parsers per primitive kind
//! - [`cache`] - Per-type coercion entries
//! - [`resolver`] - Applying a mapping to a row
//! - [`schema`] - Schema derivation
//! - [`parser`] - CSV parsing with auto-detection
//! - [`import`] - Batch import with per-row error reporting
//! - [`config`] - Import options and mapping files
//! - [`logs`] - Log broadcasting
//! - [`demo`] - Sample records and mapping

// Core modules
pub mod error;
pub mod models;
pub mod mapping;

// Engine
pub mod reflect;
pub mod coerce;
pub mod cache;
pub mod resolver;
pub mod schema;

// Input and orchestration
pub mod parser;
pub mod import;
pub mod config;
pub mod logs;

pub mod demo;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    CoercionError, ConfigError, CsvError, EngineError, ImportError, MappingError, SchemaError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{FieldDescriptor, ObjectDescriptor, PrimitiveKind, TypeDescriptor};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use mapping::{Branch, Leaf, MappingNode, ParseOptions};

// =============================================================================
// Re-exports - Engine
// =============================================================================

pub use cache::{CoercionCache, CoercionEntry};
pub use reflect::{Record, Reflect, Shape};
pub use schema::{derive_schema, describe_type};

// =============================================================================
// Re-exports - Import
// =============================================================================

pub use config::{load_mapping, ImportOptions};
pub use import::{import_csv, import_rows, CsvInfo, ImportReport, SkippedRow};
pub use parser::{parse_bytes, parse_bytes_auto, parse_file_auto, ParsedCsv};
