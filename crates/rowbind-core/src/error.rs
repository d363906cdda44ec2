//! Error types for mapping and statement synthesis.

use std::fmt;

/// The primary error type for all rowbind operations.
#[derive(Debug)]
pub enum Error {
    /// A cursor value could not be converted to a member's type
    Type(TypeError),
    /// A primary-key value was absent from a record's property map
    MissingKey(MissingKeyError),
    /// Invalid table or column metadata
    Schema(SchemaError),
    /// Failure reported by the external query/execution layer
    Query(QueryError),
    /// Custom error with message
    Custom(String),
}

/// A value could not be coerced to the requested type.
#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
    pub rust_type: Option<&'static str>,
}

impl TypeError {
    /// Create a type error without column context.
    pub fn new(expected: &'static str, actual: impl Into<String>) -> Self {
        Self {
            expected,
            actual: actual.into(),
            column: None,
            rust_type: None,
        }
    }

    /// Attach the column the failing value was read from.
    pub fn in_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

/// The primary key named by table metadata has no value on the record.
#[derive(Debug)]
pub struct MissingKeyError {
    /// Table the statement targets
    pub table: String,
    /// Key that was looked up in the property map
    pub key: String,
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Column name used twice in one table
    DuplicateColumn,
    /// Name is not a valid SQL identifier
    InvalidIdentifier,
    /// Primary key names a column the table does not have
    InvalidPrimaryKey,
}

#[derive(Debug)]
pub struct QueryError {
    pub sql: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Shorthand for a schema error.
    pub fn schema(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Error::Schema(SchemaError {
            kind,
            message: message.into(),
        })
    }

    /// Is this a value conversion failure?
    pub fn is_type_error(&self) -> bool {
        matches!(self, Error::Type(_))
    }

    /// Get the SQL that caused this error, if any.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::MissingKey(e) => write!(f, "Missing key error: {}", e),
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::Query(e) => write!(f, "Query error: {}", e.message),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for MissingKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record for table '{}' has no value for primary key '{}'",
            self.table, self.key
        )
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<MissingKeyError> for Error {
    fn from(err: MissingKeyError) -> Self {
        Error::MissingKey(err)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

/// Result type alias for rowbind operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_error_display_includes_column() {
        let err = Error::from(TypeError::new("i32", "TEXT").in_column("Age"));
        assert_eq!(
            err.to_string(),
            "Type error in column 'Age': expected i32, found TEXT"
        );
        assert!(err.is_type_error());
    }

    #[test]
    fn missing_key_display() {
        let err = Error::from(MissingKeyError {
            table: "Products".to_string(),
            key: "ProductID".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Missing key error: record for table 'Products' has no value for primary key 'ProductID'"
        );
    }

    #[test]
    fn query_error_exposes_sql_and_source() {
        let io = std::io::Error::other("socket closed");
        let err = Error::Query(QueryError {
            sql: Some("SELECT 1".to_string()),
            message: "execution failed".to_string(),
            source: Some(Box::new(io)),
        });

        assert_eq!(err.sql(), Some("SELECT 1"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
