use super::types::{FieldMapping, FilterOrderInfo, SortDirection};

pub struct FilterOrder;

impl FilterOrder {
    /// Parses `sort=field[,field]` plus a shared `order=asc|desc`. Fields not in
    /// `sortable` are ignored so clients cannot order by arbitrary SQL.
    pub fn parse(sort: Option<&str>, order: Option<&str>, sortable: &[FieldMapping]) -> Vec<FilterOrderInfo> {
        let direction = SortDirection::parse(order);
        let Some(sort) = sort else { return vec![] };

        let mut out = Vec::new();
        for part in sort.split(',') {
            let name = part.trim();
            if name.is_empty() {
                continue;
            }
            match sortable.iter().find(|m| m.api_name == name) {
                Some(mapping) => out.push(FilterOrderInfo {
                    expression: format!("\"{}\"", mapping.column),
                    sort: direction,
                }),
                None => tracing::debug!(sort = name, "ignoring unsortable field"),
            }
        }
        out
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", i.expression, i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }
}
