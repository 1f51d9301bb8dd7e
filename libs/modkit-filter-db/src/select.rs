use std::marker::PhantomData;

use modkit_filter::{BoundPredicate, FilterTarget, QueryInterceptor, UnitOfWorkFilterState};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::cond::build_filter_condition;
use crate::entity::FilterableColumns;
use crate::error::FilterDbError;

/// Typestate marker: data filters have not been applied yet.
/// Cannot execute queries in this state.
#[derive(Debug, Clone, Copy)]
pub struct Unfiltered;

/// Typestate marker: the unit of work's data filters are part of the query.
#[derive(Debug, Clone, Copy)]
pub struct Filtered;

/// A `SeaORM` `Select` that cannot run until data filters are applied.
///
/// # Example
/// ```rust,ignore
/// use modkit_filter_db::FilteredEntityExt;
///
/// let people = person::Entity::find()
///     .filtered()                // FilteredSelect<E, Unfiltered>
///     .with_filters(&state)?     // FilteredSelect<E, Filtered>
///     .all(conn)
///     .await?;
/// ```
#[must_use]
#[derive(Clone, Debug)]
pub struct FilteredSelect<E: EntityTrait, S> {
    pub(crate) inner: sea_orm::Select<E>,
    pub(crate) _state: PhantomData<S>,
}

/// Converts a plain `SeaORM` `Select` into an [`Unfiltered`] [`FilteredSelect`].
pub trait FilteredEntityExt<E: EntityTrait>: Sized {
    fn filtered(self) -> FilteredSelect<E, Unfiltered>;
}

impl<E> FilteredEntityExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn filtered(self) -> FilteredSelect<E, Unfiltered> {
        FilteredSelect {
            inner: self,
            _state: PhantomData,
        }
    }
}

impl<E> FilterTarget for FilteredSelect<E, Unfiltered>
where
    E: FilterableColumns,
    E::Column: ColumnTrait + Copy,
{
    type Entity = E;
    type Error = FilterDbError;

    fn restrict(mut self, predicate: BoundPredicate) -> Result<Self, FilterDbError> {
        let cond = build_filter_condition::<E>(&predicate)?;
        self.inner = QueryFilter::filter(self.inner, cond);
        Ok(self)
    }
}

impl<E> FilteredSelect<E, Unfiltered>
where
    E: FilterableColumns,
    E::Column: ColumnTrait + Copy,
{
    /// Conjoin every filter enabled in `state` that applies to `E`.
    ///
    /// # Errors
    /// Returns `FilterDbError::Filter` for binding errors and
    /// `FilterDbError::UnmappedField` if `E` lacks a column a filter needs.
    pub fn with_filters(
        self,
        state: &UnitOfWorkFilterState,
    ) -> Result<FilteredSelect<E, Filtered>, FilterDbError> {
        let restricted = QueryInterceptor::apply(self, state)?;
        Ok(FilteredSelect {
            inner: restricted.inner,
            _state: PhantomData,
        })
    }
}

impl<E> FilteredSelect<E, Filtered>
where
    E: EntityTrait,
{
    /// # Errors
    /// Returns `FilterDbError::Db` if the database query fails.
    pub async fn all<C>(self, conn: &C) -> Result<Vec<E::Model>, FilterDbError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.all(conn).await?)
    }

    /// # Errors
    /// Returns `FilterDbError::Db` if the database query fails.
    pub async fn one<C>(self, conn: &C) -> Result<Option<E::Model>, FilterDbError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        Ok(self.inner.one(conn).await?)
    }

    /// # Errors
    /// Returns `FilterDbError::Db` if the database query fails.
    pub async fn count<C>(self, conn: &C) -> Result<u64, FilterDbError>
    where
        C: ConnectionTrait + Send + Sync,
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        Ok(self.inner.count(conn).await?)
    }

    /// Add a caller condition; the filter conditions remain in place.
    pub fn filter(mut self, filter: sea_orm::Condition) -> Self {
        self.inner = QueryFilter::filter(self.inner, filter);
        self
    }

    pub fn order_by<C>(mut self, col: C, order: sea_orm::Order) -> Self
    where
        C: sea_orm::IntoSimpleExpr,
    {
        self.inner = QueryOrder::order_by(self.inner, col, order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.inner = QuerySelect::limit(self.inner, limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.inner = QuerySelect::offset(self.inner, offset);
        self
    }

    /// Apply the filters of a joined entity as well.
    ///
    /// `J` must already be joined into the query (join before calling
    /// `filtered()`); this conjoins `J`'s enabled filters, qualified with
    /// `J`'s table.
    ///
    /// # Errors
    /// Same as [`FilteredSelect::with_filters`].
    pub fn and_filters_for<J>(
        mut self,
        state: &UnitOfWorkFilterState,
    ) -> Result<Self, FilterDbError>
    where
        J: FilterableColumns,
        J::Column: ColumnTrait + Copy,
    {
        if let Some(predicate) = QueryInterceptor::combined_predicate::<J>(state)? {
            let cond = build_filter_condition::<J>(&predicate)?;
            self.inner = QueryFilter::filter(self.inner, cond);
        }
        Ok(self)
    }

    /// Unwrap the inner `SeaORM` `Select`.
    ///
    /// The filter conditions are already part of the returned query; callers
    /// must not rebuild it from scratch.
    #[must_use]
    pub fn into_inner(self) -> sea_orm::Select<E> {
        self.inner
    }
}
