//! Injects the predicates of active filters into queries.

use crate::capability::FilterableEntity;
use crate::error::{FilterError, FilterResult};
use crate::predicate::BoundPredicate;
use crate::state::UnitOfWorkFilterState;

/// A query over one entity type that can take an extra conjunct.
///
/// Implemented by every retrieval path a storage binding exposes (list,
/// single-get, count, traversal to related entities) so that none of them
/// can skip interception.
pub trait FilterTarget: Sized {
    type Entity: FilterableEntity;
    type Error: From<FilterError>;

    /// Conjoin `predicate` to the query's existing condition.
    ///
    /// # Errors
    /// Implementation-defined, e.g. a predicate field the entity cannot map.
    fn restrict(self, predicate: BoundPredicate) -> Result<Self, Self::Error>;
}

/// Computes and attaches the combined predicate of the enabled filters.
pub struct QueryInterceptor;

impl QueryInterceptor {
    /// The conjunction of every enabled filter whose capability `E` declares,
    /// bound with the state's current parameter values. `None` means no
    /// filter applies and the query is left unrestricted.
    ///
    /// # Errors
    /// Returns `UnknownParameter` if a template references an unbound parameter.
    pub fn combined_predicate<E: FilterableEntity>(
        state: &UnitOfWorkFilterState,
    ) -> FilterResult<Option<BoundPredicate>> {
        let registry = state.registry();
        let mut seen = Vec::new();
        let mut parts = Vec::new();

        for &capability in E::CAPABILITIES {
            for &index in registry.indices_for(capability) {
                if seen.contains(&index) || !state.is_enabled_at(index) {
                    continue;
                }
                seen.push(index);

                let definition = registry.definition_at(index);
                let bound = definition
                    .predicate()
                    .bind(definition.params(), state.values_at(index))
                    .map_err(|unbound| FilterError::UnknownParameter {
                        filter: definition.name().to_owned(),
                        param: unbound.0.to_owned(),
                    })?;
                tracing::trace!(
                    entity = E::NAME,
                    filter = definition.name(),
                    predicate = ?bound,
                    "Conjoining data filter"
                );
                parts.push(bound);
            }
        }
        Ok(BoundPredicate::conjoin(parts))
    }

    /// Attach the combined predicate to `query`; unchanged when no filter applies.
    ///
    /// # Errors
    /// Propagates binding errors and the target's own `restrict` errors.
    pub fn apply<Q: FilterTarget>(query: Q, state: &UnitOfWorkFilterState) -> Result<Q, Q::Error> {
        match Self::combined_predicate::<Q::Entity>(state)? {
            Some(predicate) => query.restrict(predicate),
            None => Ok(query),
        }
    }
}
