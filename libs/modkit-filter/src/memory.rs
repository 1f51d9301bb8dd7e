//! In-memory query target over a slice of loaded entities.
//!
//! Useful for caches and fixtures that must honour the same data filters as
//! the database: rows are kept only when every attached predicate holds.

use crate::capability::FieldAccess;
use crate::error::{FilterError, FilterResult};
use crate::interceptor::{FilterTarget, QueryInterceptor};
use crate::predicate::BoundPredicate;
use crate::state::UnitOfWorkFilterState;

#[derive(Debug, Clone)]
pub struct MemoryQuery<'r, E> {
    rows: &'r [E],
    predicates: Vec<BoundPredicate>,
}

impl<'r, E: FieldAccess> MemoryQuery<'r, E> {
    /// Unrestricted query over `rows`.
    #[must_use]
    pub fn new(rows: &'r [E]) -> Self {
        Self {
            rows,
            predicates: Vec::new(),
        }
    }

    /// Query over `rows` restricted by the filters active in `state`.
    ///
    /// # Errors
    /// Returns binding errors from the interceptor.
    pub fn filtered(rows: &'r [E], state: &UnitOfWorkFilterState) -> FilterResult<Self> {
        QueryInterceptor::apply(Self::new(rows), state)
    }

    /// Add a caller condition on top of the filters.
    #[must_use]
    pub fn and_where(mut self, predicate: BoundPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Every visible row, in input order.
    ///
    /// # Errors
    /// Returns `MissingField` if a predicate references a field the entity does not expose.
    pub fn list(&self) -> FilterResult<Vec<&'r E>> {
        let mut out = Vec::new();
        for row in self.rows {
            if self.visible(row)? {
                out.push(row);
            }
        }
        Ok(out)
    }

    /// First visible row satisfying `key`.
    ///
    /// # Errors
    /// Returns `MissingField` as [`list`](Self::list) does.
    pub fn get(&self, key: impl Fn(&E) -> bool) -> FilterResult<Option<&'r E>> {
        for row in self.rows.iter().filter(|&r| key(r)) {
            if self.visible(row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// Number of visible rows.
    ///
    /// # Errors
    /// Returns `MissingField` as [`list`](Self::list) does.
    pub fn count(&self) -> FilterResult<usize> {
        let mut n = 0;
        for row in self.rows {
            if self.visible(row)? {
                n += 1;
            }
        }
        Ok(n)
    }

    fn visible(&self, row: &E) -> FilterResult<bool> {
        for predicate in &self.predicates {
            let keep = predicate
                .matches(row)
                .map_err(|field| FilterError::MissingField {
                    entity: E::NAME,
                    field,
                })?;
            if !keep {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<E: FieldAccess> FilterTarget for MemoryQuery<'_, E> {
    type Entity = E;
    type Error = FilterError;

    fn restrict(mut self, predicate: BoundPredicate) -> FilterResult<Self> {
        self.predicates.push(predicate);
        Ok(self)
    }
}
