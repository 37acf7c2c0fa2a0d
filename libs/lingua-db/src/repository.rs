//! Generic repository over aggregate roots.

use std::marker::PhantomData;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QuerySelect, Select, SelectTwo,
};
use serde::{Deserialize, Serialize};

use crate::uow::UnitOfWork;
use crate::{DbError, Result};

/// Marker for entity types that own their persistence identity.
///
/// Repositories can only be built for entities that opt in explicitly:
/// ```rust,ignore
/// impl AggregateRoot for culture::Entity {}
/// ```
pub trait AggregateRoot: EntityTrait {}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// 1-based page index.
    pub page_number: u64,
    pub page_size: u64,
    pub results: Vec<T>,
    /// `ceil(total_number_of_records / page_size)`
    pub total_number_of_pages: u64,
    pub total_number_of_records: u64,
}

impl<T> Page<T> {
    /// Build a page and derive the page count from the totals.
    #[must_use]
    pub fn new(page_number: u64, page_size: u64, results: Vec<T>, total_records: u64) -> Self {
        Self {
            page_number,
            page_size,
            results,
            total_number_of_pages: total_records.div_ceil(page_size.max(1)),
            total_number_of_records: total_records,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            page_number: self.page_number,
            page_size: self.page_size,
            results: self.results.into_iter().map(f).collect(),
            total_number_of_pages: self.total_number_of_pages,
            total_number_of_records: self.total_number_of_records,
        }
    }
}

/// Typed data accessor for one aggregate type, bound to a [`UnitOfWork`].
///
/// Mutations are written immediately and counted on the unit of work.
pub struct Repository<'u, E> {
    uow: &'u UnitOfWork,
    _entity: PhantomData<fn() -> E>,
}

impl<'u, E> Repository<'u, E>
where
    E: AggregateRoot,
    E::Model: IntoActiveModel<E::ActiveModel> + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
{
    #[must_use]
    pub fn new(uow: &'u UnitOfWork) -> Self {
        Self {
            uow,
            _entity: PhantomData,
        }
    }

    /// Composable query over the whole entity set.
    #[must_use]
    pub fn query(&self) -> Select<E> {
        E::find()
    }

    /// Insert and return the stored row (generated id populated).
    ///
    /// # Errors
    /// Propagates the driver error.
    pub async fn add(&self, model: E::ActiveModel) -> Result<E::Model> {
        let exec = self.uow.executor().await;
        let saved = model.insert(&exec).await?;
        self.uow.record(1);
        Ok(saved)
    }

    /// Write the changed columns of `model` and return the stored row.
    ///
    /// # Errors
    /// Propagates the driver error (`RecordNotUpdated` when the row is gone).
    pub async fn update(&self, model: E::ActiveModel) -> Result<E::Model> {
        let exec = self.uow.executor().await;
        let saved = model.update(&exec).await?;
        self.uow.record(1);
        Ok(saved)
    }

    /// Delete by primary key. Returns the number of rows removed.
    ///
    /// # Errors
    /// Propagates the driver error.
    pub async fn delete(&self, model: E::ActiveModel) -> Result<u64> {
        let exec = self.uow.executor().await;
        let res = model.delete(&exec).await?;
        self.uow.record(res.rows_affected);
        Ok(res.rows_affected)
    }

    /// # Errors
    /// Propagates the driver error.
    pub async fn first_or_default(&self, query: Select<E>) -> Result<Option<E::Model>> {
        let exec = self.uow.executor().await;
        Ok(query.one(&exec).await?)
    }

    /// At most one row.
    ///
    /// # Errors
    /// `DbError::MultipleRows` when the query matches more than one row.
    pub async fn single_or_default(&self, query: Select<E>) -> Result<Option<E::Model>> {
        let exec = self.uow.executor().await;
        let mut rows = query.limit(2_u64).all(&exec).await?;
        if rows.len() > 1 {
            return Err(DbError::MultipleRows);
        }
        Ok(rows.pop())
    }

    /// # Errors
    /// Propagates the driver error.
    pub async fn to_list(&self, query: Select<E>) -> Result<Vec<E::Model>> {
        let exec = self.uow.executor().await;
        Ok(query.all(&exec).await?)
    }

    /// # Errors
    /// Propagates the driver error.
    pub async fn count(&self, query: Select<E>) -> Result<u64> {
        let exec = self.uow.executor().await;
        Ok(query.count(&exec).await?)
    }

    /// First row of a joined query, with its related row if present.
    ///
    /// # Errors
    /// Propagates the driver error.
    pub async fn first_with_related<F>(
        &self,
        query: SelectTwo<E, F>,
    ) -> Result<Option<(E::Model, Option<F::Model>)>>
    where
        F: EntityTrait,
        F::Model: Send + Sync,
    {
        let exec = self.uow.executor().await;
        Ok(query.one(&exec).await?)
    }

    /// # Errors
    /// Propagates the driver error.
    pub async fn list_with_related<F>(
        &self,
        query: SelectTwo<E, F>,
    ) -> Result<Vec<(E::Model, Option<F::Model>)>>
    where
        F: EntityTrait,
        F::Model: Send + Sync,
    {
        let exec = self.uow.executor().await;
        Ok(query.all(&exec).await?)
    }

    /// Offset pagination: `page` is 1-based and rows are taken from
    /// `(page - 1) * page_size`. Order the query before calling this.
    /// A page beyond the last one comes back empty with the real totals.
    ///
    /// # Errors
    /// `DbError::InvalidPage` for `page == 0` or `page_size == 0`, otherwise
    /// the driver error.
    pub async fn page(&self, query: Select<E>, page: u64, page_size: u64) -> Result<Page<E::Model>> {
        if page == 0 {
            return Err(DbError::InvalidPage("page must be at least 1".to_owned()));
        }
        if page_size == 0 {
            return Err(DbError::InvalidPage("page size must be at least 1".to_owned()));
        }

        let exec = self.uow.executor().await;
        let total = query.clone().count(&exec).await?;
        // Past the last page there is no row query, so OFFSET always fits i64.
        let Some(offset) = (page - 1)
            .checked_mul(page_size)
            .filter(|offset| *offset < total)
        else {
            return Ok(Page::new(page, page_size, Vec::new(), total));
        };
        let rows = query
            .offset(offset)
            .limit(page_size.min(total - offset))
            .all(&exec)
            .await?;

        Ok(Page::new(page, page_size, rows, total))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::Page;

    #[test]
    fn page_count_rounds_up() {
        let p = Page::new(1, 10, vec![1, 2, 3], 21);
        assert_eq!(p.total_number_of_pages, 3);
        assert_eq!(Page::<u8>::new(1, 10, vec![], 0).total_number_of_pages, 0);
        assert_eq!(Page::<u8>::new(2, 5, vec![], 10).total_number_of_pages, 2);
    }

    #[test]
    fn map_keeps_totals() {
        let p = Page::new(2, 2, vec![1, 2], 5).map(|x| x * 10);
        assert_eq!(p.results, vec![10, 20]);
        assert_eq!(p.page_number, 2);
        assert_eq!(p.total_number_of_records, 5);
        assert_eq!(p.total_number_of_pages, 3);
    }
}
