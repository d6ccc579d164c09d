use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{Condition, FilterOrderInfo, Page, Predicate, SqlResult};

/// SELECT builder over one table: predicate, ordering and pagination window.
#[derive(Debug, Clone)]
pub struct Filter {
    table_name: String,
    document_column: Option<&'static str>,
    predicate: Predicate,
    order_data: Vec<FilterOrderInfo>,
    page: Option<Page>,
}

impl Filter {
    pub fn new(table_name: impl Into<String>) -> Result<Self, FilterError> {
        let table_name = table_name.into();
        Self::validate_table_name(&table_name)?;
        Ok(Self {
            table_name,
            document_column: None,
            predicate: Predicate::all(),
            order_data: vec![],
            page: None,
        })
    }

    pub fn document_column(mut self, column: &'static str) -> Self {
        self.document_column = Some(column);
        self
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.predicate.push(condition);
        self
    }

    pub fn order(mut self, order: Vec<FilterOrderInfo>) -> Self {
        self.order_data.extend(order);
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn to_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = [
            format!("SELECT * FROM \"{}\"", self.table_name),
            if where_result.query.is_empty() { String::new() } else { format!("WHERE {}", where_result.query) },
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params: where_result.params }
    }

    pub fn to_where_sql(&self) -> SqlResult {
        let (query, params) = FilterWhere::generate(&self.predicate, self.document_column, 0);
        SqlResult { query, params }
    }

    /// Counts every row matching the predicate, ignoring order and window.
    pub fn to_count_sql(&self) -> SqlResult {
        let where_result = self.to_where_sql();
        let query = if where_result.query.is_empty() {
            format!("SELECT COUNT(*) AS count FROM \"{}\"", self.table_name)
        } else {
            format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.table_name, where_result.query)
        };
        SqlResult { query, params: where_result.params }
    }

    fn validate_table_name(name: &str) -> Result<(), FilterError> {
        let mut chars = name.chars();
        let valid_start = chars.next().map(|c| c.is_ascii_alphabetic() || c == '_').unwrap_or(false);
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(FilterError::InvalidTableName(name.to_string()));
        }
        Ok(())
    }

    fn build_limit_clause(&self) -> String {
        match self.page {
            Some(page) => format!("LIMIT {} OFFSET {}", page.limit, page.offset),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{FieldRef, FilterOp, FilterValue, SortDirection, SqlParam};

    #[test]
    fn rejects_invalid_table_names() {
        assert!(Filter::new("cards").is_ok());
        assert!(Filter::new("").is_err());
        assert!(Filter::new("1cards").is_err());
        assert!(Filter::new("cards; DROP").is_err());
    }

    #[test]
    fn plain_select_has_no_where() {
        let sql = Filter::new("eras").unwrap().to_sql();
        assert_eq!(sql.query, "SELECT * FROM \"eras\"");
        assert!(sql.params.is_empty());
    }

    #[test]
    fn full_select_with_window() {
        let filter = Filter::new("cards")
            .unwrap()
            .document_column("details")
            .and(Condition::new(
                FieldRef::Document(vec!["hp".to_string()]),
                FilterOp::Gt,
                FilterValue::Number(90.0),
            ))
            .order(vec![FilterOrderInfo { expression: "\"id\"".to_string(), sort: SortDirection::Asc }])
            .page(Page { limit: 5, offset: 10 });

        let sql = filter.to_sql();
        assert!(sql.query.starts_with("SELECT * FROM \"cards\" WHERE "), "{}", sql.query);
        assert!(sql.query.ends_with("ORDER BY \"id\" ASC LIMIT 5 OFFSET 10"), "{}", sql.query);
        assert_eq!(sql.params.len(), 2);

        let count = filter.to_count_sql();
        assert!(count.query.starts_with("SELECT COUNT(*) AS count FROM \"cards\" WHERE "));
        assert!(!count.query.contains("LIMIT"));
        assert!(!count.query.contains("ORDER BY"));
        assert_eq!(count.params, sql.params);
    }

    #[test]
    fn count_without_predicate() {
        let count = Filter::new("sets").unwrap().page(Page { limit: 1, offset: 0 }).to_count_sql();
        assert_eq!(count.query, "SELECT COUNT(*) AS count FROM \"sets\"");
        assert_eq!(count.params, Vec::<SqlParam>::new());
    }
}
