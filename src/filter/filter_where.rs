use super::types::{Condition, FieldRef, FilterValue, Predicate, SqlParam};

/// Translates a [`Predicate`] into a parameterized SQL boolean expression.
pub struct FilterWhere {
    document_column: Option<&'static str>,
    param_values: Vec<SqlParam>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(document_column: Option<&'static str>, starting_param_index: usize) -> Self {
        Self {
            document_column,
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    /// Returns an empty clause for an empty predicate.
    pub fn generate(
        predicate: &Predicate,
        document_column: Option<&'static str>,
        starting_param_index: usize,
    ) -> (String, Vec<SqlParam>) {
        let mut filter_where = Self::new(document_column, starting_param_index);
        let clauses: Vec<String> = predicate
            .conditions
            .iter()
            .filter_map(|c| filter_where.build_sql_condition(c))
            .collect();
        (clauses.join(" AND "), filter_where.param_values)
    }

    fn build_sql_condition(&mut self, condition: &Condition) -> Option<String> {
        let op = condition.op.to_sql();
        match &condition.field {
            FieldRef::Column(column) => {
                let quoted = format!("\"{}\"", column);
                Some(match &condition.value {
                    FilterValue::Uuid(id) => format!("{} {} {}", quoted, op, self.param(SqlParam::Uuid(*id))),
                    FilterValue::Number(n) => format!("{} {} {}", quoted, op, self.param(SqlParam::Float(*n))),
                    FilterValue::Text(s) => {
                        format!("CAST({} AS TEXT) {} {}", quoted, op, self.param(SqlParam::Text(s.clone())))
                    }
                })
            }
            FieldRef::Document(path) => {
                let Some(document) = self.document_column else {
                    tracing::warn!(?path, "document filter on entity without a document column");
                    return None;
                };
                let path_param = self.param(SqlParam::TextArray(path.clone()));
                let extracted = format!("(\"{}\" #>> {})", document, path_param);
                Some(match &condition.value {
                    FilterValue::Number(n) => {
                        // Stored as number or numeric text; anything else compares as NULL.
                        let numeric = format!(
                            "(CASE WHEN btrim({e}) ~ '^-?[0-9]+(\\.[0-9]+)?$' THEN btrim({e})::float8 END)",
                            e = extracted
                        );
                        format!("{} {} {}", numeric, op, self.param(SqlParam::Float(*n)))
                    }
                    FilterValue::Text(s) => format!("{} {} {}", extracted, op, self.param(SqlParam::Text(s.clone()))),
                    FilterValue::Uuid(id) => {
                        format!("{} {} {}", extracted, op, self.param(SqlParam::Text(id.to_string())))
                    }
                })
            }
        }
    }

    fn param(&mut self, value: SqlParam) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}
