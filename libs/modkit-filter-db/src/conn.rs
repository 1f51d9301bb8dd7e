//! Database connection wrapper whose every retrieval path is filtered.
//!
//! Repositories receive a `FilteredConn` and a unit of work's
//! [`UnitOfWorkFilterState`] instead of a raw `DatabaseConnection`:
//!
//! ```rust,ignore
//! pub struct PeopleRepo<'a> {
//!     db: &'a FilteredConn,
//! }
//!
//! impl PeopleRepo<'_> {
//!     pub async fn list(
//!         &self,
//!         state: &UnitOfWorkFilterState,
//!     ) -> Result<Vec<person::Model>, FilterDbError> {
//!         self.db.find::<person::Entity>(state)?.all(self.db.conn()).await
//!     }
//!
//!     pub async fn list_with_deleted(
//!         &self,
//!         state: &mut UnitOfWorkFilterState,
//!     ) -> Result<Vec<person::Model>, FilterDbError> {
//!         let guard = state.disable([builtin::SOFT_DELETE])?;
//!         self.db.find::<person::Entity>(&guard)?.all(self.db.conn()).await
//!     }
//! }
//! ```

use std::sync::Arc;

use modkit_filter::{Capability, FilterRegistry, QueryInterceptor, UnitOfWorkFilterState, fields};
use modkit_security::SessionProvider;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, ModelTrait, QueryFilter, Related,
    sea_query::Expr,
};

use crate::cond::build_filter_condition;
use crate::entity::FilterableColumns;
use crate::error::FilterDbError;
use crate::select::{Filtered, FilteredEntityExt, FilteredSelect};

/// Filtered database connection wrapper.
///
/// Holds the connection and the frozen filter registry. Queries take the
/// unit of work's state per call, so one `FilteredConn` serves any number of
/// concurrent units of work.
#[derive(Clone)]
pub struct FilteredConn {
    conn: DatabaseConnection,
    registry: Arc<FilterRegistry>,
}

impl FilteredConn {
    #[must_use]
    pub fn new(conn: DatabaseConnection, registry: Arc<FilterRegistry>) -> Self {
        Self { conn, registry }
    }

    /// Underlying connection, for executing queries built through this wrapper.
    ///
    /// Queries built directly on it bypass the data filters.
    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// Start a unit of work for `session`.
    ///
    /// # Errors
    /// Returns `FilterDbError::Filter` if the registry is not frozen.
    pub fn begin(
        &self,
        session: &dyn SessionProvider,
    ) -> Result<UnitOfWorkFilterState, FilterDbError> {
        Ok(UnitOfWorkFilterState::begin(Arc::clone(&self.registry), session)?)
    }

    /// Filtered select over all rows of `E`.
    ///
    /// # Errors
    /// Returns binding or column-mapping errors from the filters.
    #[allow(clippy::unused_self)] // Keep fluent &FilteredConn API even when method only delegates
    pub fn find<E>(
        &self,
        state: &UnitOfWorkFilterState,
    ) -> Result<FilteredSelect<E, Filtered>, FilterDbError>
    where
        E: FilterableColumns,
        E::Column: ColumnTrait + Copy,
    {
        E::find().filtered().with_filters(state)
    }

    /// Filtered select for the row with identifier `id`.
    ///
    /// A row hidden by an enabled filter is not found.
    ///
    /// # Errors
    /// Returns `FilterDbError::Invalid` if `E` has no id column, or the errors
    /// of [`find`](Self::find).
    pub fn find_by_id<E>(
        &self,
        state: &UnitOfWorkFilterState,
        id: impl Into<sea_orm::Value>,
    ) -> Result<FilteredSelect<E, Filtered>, FilterDbError>
    where
        E: FilterableColumns,
        E::Column: ColumnTrait + Copy,
    {
        let cond = id_condition::<E>(id, "Entity must have an id_col to use find_by_id()")?;
        Ok(self.find::<E>(state)?.filter(cond))
    }

    /// Number of rows of `E` visible in this unit of work.
    ///
    /// # Errors
    /// Returns filter errors or `FilterDbError::Db`.
    pub async fn count<E>(&self, state: &UnitOfWorkFilterState) -> Result<u64, FilterDbError>
    where
        E: FilterableColumns,
        E::Column: ColumnTrait + Copy,
        E::Model: sea_orm::FromQueryResult + Send + Sync,
    {
        self.find::<E>(state)?.count(&self.conn).await
    }

    /// Navigate from `model` to its related `R` rows, filtered for `R`.
    ///
    /// # Errors
    /// Returns binding or column-mapping errors from `R`'s filters.
    #[allow(clippy::unused_self)] // Same shape as the other retrieval paths
    pub fn find_related<M, R>(
        &self,
        state: &UnitOfWorkFilterState,
        model: &M,
    ) -> Result<FilteredSelect<R, Filtered>, FilterDbError>
    where
        M: ModelTrait,
        M::Entity: Related<R>,
        R: FilterableColumns,
        R::Column: ColumnTrait + Copy,
    {
        model
            .find_related(R::default())
            .filtered()
            .with_filters(state)
    }

    /// Mark the row with identifier `id` as deleted instead of removing it.
    ///
    /// The update is restricted by the filters enabled in `state`, so a row
    /// this unit of work cannot see (including one already soft-deleted
    /// while the soft-delete filter is on) is left alone.
    ///
    /// Returns `true` if a row was marked.
    ///
    /// # Errors
    /// - `FilterDbError::NotSoftDeletable` if `E` lacks the soft-deletable capability
    /// - `FilterDbError::Invalid` if `E` has no id column
    /// - `FilterDbError::Db` if the update fails
    pub async fn soft_delete_by_id<E>(
        &self,
        state: &UnitOfWorkFilterState,
        id: impl Into<sea_orm::Value>,
    ) -> Result<bool, FilterDbError>
    where
        E: FilterableColumns,
        E::Column: ColumnTrait + Copy,
    {
        let cond = id_condition::<E>(id, "Entity must have an id_col to use soft_delete_by_id()")?;
        Ok(self.soft_delete_many::<E>(state, cond).await? > 0)
    }

    /// Mark every visible row matching `condition` as deleted.
    ///
    /// Returns the number of rows marked.
    ///
    /// # Errors
    /// Same as [`soft_delete_by_id`](Self::soft_delete_by_id).
    pub async fn soft_delete_many<E>(
        &self,
        state: &UnitOfWorkFilterState,
        condition: Condition,
    ) -> Result<u64, FilterDbError>
    where
        E: FilterableColumns,
        E::Column: ColumnTrait + Copy,
    {
        if !E::declares(Capability::SOFT_DELETABLE) {
            return Err(FilterDbError::NotSoftDeletable(E::NAME));
        }
        let flag = E::column(fields::IS_DELETED).ok_or(FilterDbError::UnmappedField {
            entity: E::NAME,
            field: fields::IS_DELETED,
        })?;

        let mut update = E::update_many()
            .col_expr(flag, Expr::value(true))
            .filter(condition);
        if let Some(predicate) = QueryInterceptor::combined_predicate::<E>(state)? {
            update = update.filter(build_filter_condition::<E>(&predicate)?);
        }

        let result = update.exec(&self.conn).await?;
        tracing::debug!(
            entity = E::NAME,
            rows_affected = result.rows_affected,
            "Soft-deleted rows"
        );
        Ok(result.rows_affected)
    }
}

fn id_condition<E>(
    id: impl Into<sea_orm::Value>,
    missing: &'static str,
) -> Result<Condition, FilterDbError>
where
    E: FilterableColumns,
    E::Column: ColumnTrait + Copy,
{
    let id_col = E::id_col().ok_or(FilterDbError::Invalid(missing))?;
    Ok(Condition::all().add(Expr::col((E::default(), id_col)).eq(id.into())))
}
