use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::query_builder::QueryBuilder;
use crate::filter::types::{FilterOrderInfo, Page, Paginated, Predicate};
use crate::filter::{Filter, Lookup};

/// Read access to one catalog table.
pub struct Repository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _phantom: std::marker::PhantomData }
    }

    /// Base filter over `T::TABLE`, aware of its document column if any.
    pub fn filter(&self) -> Result<Filter, DatabaseError> {
        let filter = Filter::new(T::TABLE)?;
        Ok(match T::DOCUMENT_COLUMN {
            Some(column) => filter.document_column(column),
            None => filter,
        })
    }

    pub async fn select_any(&self, predicate: Predicate, order: Vec<FilterOrderInfo>) -> Result<Vec<T>, DatabaseError> {
        let filter = self.filter()?.predicate(predicate).order(order);
        QueryBuilder::<T>::new(filter).select_all(&self.pool).await
    }

    pub async fn select_one(&self, lookup: &Lookup) -> Result<Option<T>, DatabaseError> {
        let filter = self.filter()?.and(lookup.condition());
        QueryBuilder::<T>::new(filter).select_optional(&self.pool).await
    }

    /// Like [`select_one`](Self::select_one) but a miss is `DatabaseError::NotFound(message)`.
    pub async fn select_404(&self, lookup: &Lookup, message: impl Into<String>) -> Result<T, DatabaseError> {
        self.select_one(lookup)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(message.into()))
    }

    /// One page of matches plus the total match count. Both statements run in
    /// a single read-only snapshot so `total` agrees with `results`.
    pub async fn select_page(
        &self,
        predicate: Predicate,
        order: Vec<FilterOrderInfo>,
        page: Page,
    ) -> Result<Paginated<T>, DatabaseError> {
        let filter = self.filter()?.predicate(predicate).order(order).page(page);
        let query = QueryBuilder::<T>::new(filter);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;
        let total = query.count(&mut *tx).await?;
        let results = query.select_all(&mut *tx).await?;
        tx.commit().await?;

        Ok(Paginated { total, limit: page.limit, offset: page.offset, results })
    }
}
