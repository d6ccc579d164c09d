//! Compiles flat query-string maps into a [`Predicate`].
//!
//! Keys take one of three shapes:
//! - `field__op=value` or `field[op]=value` with `op` in `eq|gt|gte|lt|lte`
//! - `field=value`
//!
//! `field` is either one of the entity's top-level columns or a dotted path
//! into its JSON document column. Bare top-level keys become case-insensitive
//! substring matches; bare document keys become exact matches.

use std::collections::BTreeMap;

use super::error::FilterError;
use super::types::{Condition, FieldMapping, FieldRef, FilterOp, FilterValue, Predicate};

/// Keys consumed by pagination, never treated as filters.
pub const RESERVED_KEYS: &[&str] = &["limit", "offset"];

#[derive(Debug, PartialEq)]
enum KeyForm<'k> {
    Operator { field: &'k str, token: &'k str },
    Plain(&'k str),
}

fn split_key(key: &str) -> KeyForm<'_> {
    if let Some(inner) = key.strip_suffix(']') {
        if let Some((field, token)) = inner.split_once('[') {
            if !field.is_empty() {
                return KeyForm::Operator { field, token };
            }
        }
    }
    if let Some((field, token)) = key.rsplit_once("__") {
        // Only a known token makes this operator syntax; `set_position__number`
        // style keys stay plain field names.
        if !field.is_empty() && FilterOp::from_token(token).is_some() {
            return KeyForm::Operator { field, token };
        }
    }
    KeyForm::Plain(key)
}

pub struct QueryFilter<'a> {
    columns: &'a [FieldMapping],
    numeric_fields: &'a [String],
    strict: bool,
}

impl<'a> QueryFilter<'a> {
    pub fn new(columns: &'a [FieldMapping], numeric_fields: &'a [String]) -> Self {
        Self { columns, numeric_fields, strict: false }
    }

    /// In strict mode malformed filters fail the request instead of being dropped.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn compile(&self, params: &BTreeMap<String, String>) -> Result<Predicate, FilterError> {
        let mut predicate = Predicate::all();

        for (key, value) in params {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            match self.compile_entry(key, value) {
                Ok(condition) => predicate.push(condition),
                Err(err) if self.strict => return Err(err),
                Err(err) => {
                    tracing::debug!(key = %key, error = %err, "dropping malformed filter");
                }
            }
        }

        Ok(predicate)
    }

    fn compile_entry(&self, key: &str, value: &str) -> Result<Condition, FilterError> {
        match split_key(key) {
            KeyForm::Operator { field, token } => {
                let op = FilterOp::from_token(token).ok_or_else(|| FilterError::UnsupportedOperator {
                    field: field.to_string(),
                    operator: token.to_string(),
                })?;
                if let Some(column) = self.column_for(field) {
                    return Ok(Condition::new(FieldRef::Column(column), op, FilterValue::Text(value.to_string())));
                }
                let path = document_path(field)?;
                let value = if self.is_numeric(field) {
                    let number = value.trim().parse::<f64>().ok().filter(|n| n.is_finite()).ok_or_else(|| {
                        FilterError::NonNumericValue { field: field.to_string(), value: value.to_string() }
                    })?;
                    FilterValue::Number(number)
                } else {
                    FilterValue::Text(value.to_string())
                };
                Ok(Condition::new(FieldRef::Document(path), op, value))
            }
            KeyForm::Plain(field) => {
                if let Some(column) = self.column_for(field) {
                    return Ok(Condition::new(
                        FieldRef::Column(column),
                        FilterOp::ILike,
                        FilterValue::Text(format!("%{}%", value)),
                    ));
                }
                let path = document_path(field)?;
                Ok(Condition::new(FieldRef::Document(path), FilterOp::Eq, FilterValue::Text(value.to_string())))
            }
        }
    }

    fn column_for(&self, field: &str) -> Option<&'static str> {
        self.columns.iter().find(|m| m.api_name == field).map(|m| m.column)
    }

    fn is_numeric(&self, field: &str) -> bool {
        self.numeric_fields.iter().any(|f| f == field)
    }
}

fn document_path(field: &str) -> Result<Vec<String>, FilterError> {
    let segments: Vec<String> = field.split('.').map(str::to_string).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(FilterError::InvalidFieldPath(field.to_string()));
    }
    Ok(segments)
}
