//! PLANTDASH Core - Domain Types and View Models
//!
//! Pure data structures and presentation transforms. All other crates depend
//! on this. No I/O happens here: rows come in as [`RawTable`]s and leave as
//! display-ready [`DisplayTable`]s and [`FilterOptionSet`]s.

use thiserror::Error;

pub mod navigation;
pub mod table;
pub mod user;
pub mod view;

pub use navigation::Panel;
pub use table::{CellValue, DisplayTable, RawTable};
pub use user::{UserRecord, ADMIN_ROLE};
pub use view::{
    apply_plant_filter, build_filter_options, build_plant_summary, rename_columns,
    FilterOptionSet, PlantFilterOptions, PlantSearchFilter, ALL_OPTION, PLANT_SUMMARY_COLUMNS,
};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Errors raised while shaping query results into view models.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    #[error("Row {row} has {got} cells, expected {expected}")]
    RowArity {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Unknown panel: {label}")]
    UnknownPanel { label: String },
}

/// Errors raised by the query cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Failed to encode cached value for {operation}: {reason}")]
    Encode { operation: String, reason: String },

    #[error("Failed to decode cached value for {operation}: {reason}")]
    Decode { operation: String, reason: String },

    #[error("Cache store unavailable: {reason}")]
    StoreUnavailable { reason: String },
}

/// Master error type for all dashboard domain errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashError {
    #[error("View error: {0}")]
    View(#[from] ViewError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result type alias for dashboard domain operations.
pub type DashResult<T> = Result<T, DashError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_context() {
        let err = DashError::from(ViewError::ColumnNotFound {
            column: "plantname".to_string(),
        });
        let display = err.to_string();
        assert!(display.contains("View error"));
        assert!(display.contains("plantname"));
    }

    #[test]
    fn test_cache_error_conversion() {
        let err: DashError = CacheError::Decode {
            operation: "plant_summary".to_string(),
            reason: "invalid type".to_string(),
        }
        .into();
        assert!(matches!(err, DashError::Cache(CacheError::Decode { .. })));
    }
}
