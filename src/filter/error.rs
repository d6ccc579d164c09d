use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Unsupported operator '{operator}' on field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Invalid field path: {0}")]
    InvalidFieldPath(String),

    #[error("Value for '{field}' must be numeric, got '{value}'")]
    NonNumericValue { field: String, value: String },
}
