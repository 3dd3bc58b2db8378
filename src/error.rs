//! Unified error model for table operations.

use thiserror::Error;

/// Result alias that uses the crate-wide [`DbfError`] type.
pub type DbfResult<T> = Result<T, DbfError>;

/// Errors surfaced by the table engine.
#[derive(Debug, Error)]
pub enum DbfError {
    /// The backing file could not be opened.
    #[error("cannot open table file: {source}")]
    Open {
        #[source]
        source: std::io::Error,
    },

    /// The header version byte or header structure is invalid.
    #[error("unrecognized table format: {details}")]
    UnrecognizedFormat { details: String },

    /// Seek/read failure on an open, readable file.
    #[error("read error during {action}: {source}")]
    Read {
        action: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// Seek/write failure, or an attempted write on a read-only handle.
    #[error("write error during {action}: {details}")]
    Write {
        action: &'static str,
        details: String,
    },

    /// Encode-time divergence between a caller record and the table schema.
    #[error("schema mismatch at field {index}: {details}")]
    SchemaMismatch { index: usize, details: String },

    /// A record index outside `[0, records_count - 1]`.
    #[error("record index {index} out of range for {count} records")]
    OutOfRange { index: i64, count: u32 },

    /// The record area yielded fewer bytes than one full record.
    #[error("short read at record {index}: wanted {wanted} bytes, got {got}")]
    ShortRead {
        index: usize,
        wanted: usize,
        got: usize,
    },
}

impl DbfError {
    /// Helper for wrapping read-path `std::io::Error` values.
    pub fn read(action: &'static str, e: std::io::Error) -> Self {
        Self::Read { action, source: e }
    }

    /// Helper for write failures with context.
    pub fn write(action: &'static str, details: impl Into<String>) -> Self {
        Self::Write {
            action,
            details: details.into(),
        }
    }

    /// Helper for structurally invalid headers.
    pub fn format(details: impl Into<String>) -> Self {
        Self::UnrecognizedFormat {
            details: details.into(),
        }
    }

    /// Map this error onto the coarse legacy error kind.
    pub fn table_error(&self) -> TableError {
        match self {
            DbfError::Open { .. } => TableError::Open,
            DbfError::UnrecognizedFormat { .. } => TableError::UnrecognizedFormat,
            DbfError::Read { .. } => TableError::Read,
            DbfError::Write { .. } => TableError::Write,
            DbfError::SchemaMismatch { .. } => TableError::SchemaMismatch,
            DbfError::OutOfRange { .. } | DbfError::ShortRead { .. } => TableError::Unspecified,
        }
    }
}

/// Coarse error kind recorded as the engine's last-error state.
///
/// After any call the most recent kind is queryable via
/// [`DbfTable::last_error`](crate::DbfTable::last_error), independently of
/// the `Result` returned by the call itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableError {
    /// No failure recorded by the most recent fallible call.
    #[default]
    None,
    /// Backing store could not be opened.
    Open,
    /// Header version byte or structure invalid.
    UnrecognizedFormat,
    /// Seek/read failure.
    Read,
    /// Seek/write failure or read-only handle.
    Write,
    /// Encode-time schema divergence.
    SchemaMismatch,
    /// Short read of the record area or out-of-range index.
    Unspecified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_legacy_kinds() {
        let e = DbfError::read("seek", std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(e.table_error(), TableError::Read);

        let e = DbfError::write("append", "short write");
        assert_eq!(e.table_error(), TableError::Write);

        let e = DbfError::format("bad version");
        assert_eq!(e.table_error(), TableError::UnrecognizedFormat);

        let e = DbfError::OutOfRange { index: 9, count: 3 };
        assert_eq!(e.table_error(), TableError::Unspecified);

        let e = DbfError::ShortRead {
            index: 0,
            wanted: 21,
            got: 4,
        };
        assert_eq!(e.table_error(), TableError::Unspecified);
    }

    #[test]
    fn display_includes_context() {
        let e = DbfError::write("update_record", "handle is read-only");
        let msg = e.to_string();
        assert!(msg.contains("update_record"));
        assert!(msg.contains("read-only"));
    }
}
