use serde::Serialize;
use uuid::Uuid;

/// Comparison operators a query-string filter can compile to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match, produced for bare top-level keys.
    ILike,
}

impl FilterOp {
    /// Operator tokens accepted in `field__op` and `field[op]` keys.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "eq" => FilterOp::Eq,
            "gt" => FilterOp::Gt,
            "gte" => FilterOp::Gte,
            "lt" => FilterOp::Lt,
            "lte" => FilterOp::Lte,
            _ => return None,
        })
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::ILike => "ILIKE",
        }
    }
}

/// Where a condition's value lives: a relational column or a path inside the
/// entity's JSON document column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRef {
    Column(&'static str),
    Document(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Uuid(Uuid),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: FieldRef,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Condition {
    pub fn new(field: FieldRef, op: FilterOp, value: FilterValue) -> Self {
        Self { field, op, value }
    }

    pub fn column_eq(column: &'static str, value: FilterValue) -> Self {
        Self::new(FieldRef::Column(column), FilterOp::Eq, value)
    }
}

/// Conjunction of conditions. An empty predicate matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub conditions: Vec<Condition>,
}

impl Predicate {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Maps an API-facing field name onto its storage column.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub api_name: &'static str,
    pub column: &'static str,
}

pub const fn field(api_name: &'static str, column: &'static str) -> FieldMapping {
    FieldMapping { api_name, column }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One ORDER BY term. `expression` is trusted SQL, never user input.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub expression: String,
    pub sort: SortDirection,
}

/// Bind parameter for generated SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Float(f64),
    Uuid(Uuid),
    TextArray(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlParam>,
}

/// Normalized pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Envelope returned by paginated list endpoints.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub results: Vec<T>,
}
