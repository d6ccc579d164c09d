use sqlx::{postgres::PgArguments, postgres::PgRow, Executor, FromRow, Postgres, Row};

use crate::database::manager::DatabaseError;
use crate::filter::types::{SqlParam, SqlResult};
use crate::filter::Filter;

/// Runs a [`Filter`]'s generated SQL against any Postgres executor (pool or
/// open transaction) and decodes rows into `T`.
pub struct QueryBuilder<T> {
    filter: Filter,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(filter: Filter) -> Self {
        Self { filter, _phantom: std::marker::PhantomData }
    }

    pub async fn select_all<'c, E>(&self, executor: E) -> Result<Vec<T>, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(executor).await?)
    }

    pub async fn select_optional<'c, E>(&self, executor: E) -> Result<Option<T>, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let sql_result = self.filter.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_optional(executor).await?)
    }

    pub async fn count<'c, E>(&self, executor: E) -> Result<i64, DatabaseError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        count(executor, &self.filter.to_count_sql()).await
    }
}

async fn count<'c, E>(executor: E, sql_result: &SqlResult) -> Result<i64, DatabaseError>
where
    E: Executor<'c, Database = Postgres>,
{
    let mut q = sqlx::query(&sql_result.query);
    for p in sql_result.params.iter() {
        q = bind_param_query(q, p);
    }
    let row = q.fetch_one(executor).await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::TextArray(items) => q.bind(items.clone()),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::TextArray(items) => q.bind(items.clone()),
    }
}
