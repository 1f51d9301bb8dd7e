//! Per-unit-of-work filter flags and parameter values.
//!
//! A [`UnitOfWorkFilterState`] is created when a unit of work begins, is
//! threaded explicitly through every retrieval issued in that unit of work,
//! and is dropped when the unit of work ends. Nothing is shared between two
//! states except the frozen registry.
//!
//! Toggles return a [`ScopeGuard`] that borrows the state exclusively and
//! dereferences to it, so nested toggles are issued through the outer guard:
//!
//! ```rust
//! use modkit_filter::{FilterRegistry, UnitOfWorkFilterState, builtin::SOFT_DELETE};
//! use modkit_security::SecurityContext;
//!
//! let registry = FilterRegistry::with_builtins()?.into_shared();
//! let mut state = UnitOfWorkFilterState::begin(registry, &SecurityContext::anonymous())?;
//! {
//!     let mut outer = state.disable([SOFT_DELETE])?;
//!     assert!(!outer.is_enabled(SOFT_DELETE)?);
//!     {
//!         let inner = outer.enable([SOFT_DELETE])?;
//!         assert!(inner.is_enabled(SOFT_DELETE)?);
//!     }
//!     assert!(!outer.is_enabled(SOFT_DELETE)?);
//! }
//! assert!(state.is_enabled(SOFT_DELETE)?);
//! # Ok::<(), modkit_filter::FilterError>(())
//! ```

use std::sync::Arc;

use modkit_security::{SessionProvider, TenantId};

use crate::builtin::{MAY_HAVE_TENANT, MUST_HAVE_TENANT, TENANT_ID_PARAM};
use crate::error::{FilterError, FilterResult};
use crate::guard::ScopeGuard;
use crate::registry::FilterRegistry;
use crate::value::Value;

/// Enabled flags and parameter values of every registered filter for one unit of work.
///
/// `Clone` produces an independent copy; use it to give fanned-out subtasks
/// their own unit of work seeded with the current values.
#[derive(Debug, Clone)]
pub struct UnitOfWorkFilterState {
    registry: Arc<FilterRegistry>,
    enabled: Vec<bool>,
    params: Vec<Vec<Value>>,
}

impl UnitOfWorkFilterState {
    /// Seed state from registry defaults only, ignoring any session.
    ///
    /// # Errors
    /// Returns `RegistryNotFrozen` if registration is still open.
    pub fn with_defaults(registry: Arc<FilterRegistry>) -> FilterResult<Self> {
        if !registry.is_frozen() {
            return Err(FilterError::RegistryNotFrozen);
        }
        let enabled = registry.definitions().map(|d| d.default_enabled()).collect();
        let params = registry.definitions().map(|d| d.default_values()).collect();
        Ok(Self {
            registry,
            enabled,
            params,
        })
    }

    /// Seed state from registry defaults, then apply each filter's session binding.
    ///
    /// # Errors
    /// Returns `RegistryNotFrozen` if registration is still open, or a
    /// parameter error if a session binding produces an invalid value.
    pub fn begin(
        registry: Arc<FilterRegistry>,
        session: &dyn SessionProvider,
    ) -> FilterResult<Self> {
        let mut state = Self::with_defaults(Arc::clone(&registry))?;
        for (index, definition) in registry.definitions().enumerate() {
            let Some(binding) = definition.session_binding() else {
                continue;
            };
            let seed = binding(session);
            if let Some(enabled) = seed.force_enabled {
                state.enabled[index] = enabled;
            }
            for (param, value) in seed.params {
                let p = definition.param_index(param)?;
                definition.params()[p].check(definition.name(), &value)?;
                state.params[index][p] = value;
            }
        }
        tracing::debug!(
            tenant_id = ?session.current_tenant_id(),
            host = session.is_host_actor(),
            "Unit of work filter state initialized"
        );
        Ok(state)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<FilterRegistry> {
        &self.registry
    }

    /// # Errors
    /// Returns `UnknownFilter` if `name` is not registered.
    pub fn is_enabled(&self, name: &str) -> FilterResult<bool> {
        Ok(self.enabled[self.registry.index_of(name)?])
    }

    /// Names of the filters currently enabled, in registration order.
    pub fn enabled_filters(&self) -> impl Iterator<Item = &str> {
        self.registry
            .definitions()
            .zip(&self.enabled)
            .filter(|(_, on)| **on)
            .map(|(d, _)| d.name())
    }

    /// Current value of a filter parameter.
    ///
    /// # Errors
    /// Returns `UnknownFilter` or `UnknownParameter`.
    pub fn parameter(&self, name: &str, param: &str) -> FilterResult<&Value> {
        let index = self.registry.index_of(name)?;
        let p = self.registry.definition_at(index).param_index(param)?;
        Ok(&self.params[index][p])
    }

    /// Overwrite a parameter value for the rest of the unit of work.
    ///
    /// Parameter values are not captured by [`ScopeGuard`]s created with
    /// [`disable`](Self::disable) or [`enable`](Self::enable).
    ///
    /// # Errors
    /// Returns `UnknownFilter`, `UnknownParameter` or `TypeMismatch`; on error
    /// the stored value is unchanged.
    pub fn set_parameter(
        &mut self,
        name: &str,
        param: &str,
        value: impl Into<Value>,
    ) -> FilterResult<()> {
        let value = value.into();
        let index = self.registry.index_of(name)?;
        let definition = self.registry.definition_at(index);
        let p = definition.param_index(param)?;
        definition.params()[p].check(name, &value)?;
        tracing::debug!(filter = name, param, %value, "Setting data filter parameter");
        self.params[index][p] = value;
        Ok(())
    }

    /// Disable the named filters until the returned guard is released.
    ///
    /// # Errors
    /// Returns `UnknownFilter` for the first unregistered name; no flag is
    /// changed in that case.
    pub fn disable<I, S>(&mut self, names: I) -> FilterResult<ScopeGuard<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.toggle(names, false)
    }

    /// Enable the named filters until the returned guard is released.
    ///
    /// # Errors
    /// Returns `UnknownFilter` for the first unregistered name; no flag is
    /// changed in that case.
    pub fn enable<I, S>(&mut self, names: I) -> FilterResult<ScopeGuard<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.toggle(names, true)
    }

    fn toggle<I, S>(&mut self, names: I, target: bool) -> FilterResult<ScopeGuard<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let indices = names
            .into_iter()
            .map(|n| self.registry.index_of(n.as_ref()))
            .collect::<FilterResult<Vec<_>>>()?;

        let mut prior = Vec::with_capacity(indices.len());
        for index in indices {
            prior.push((index, self.enabled[index]));
            tracing::debug!(
                filter = self.registry.definition_at(index).name(),
                from = self.enabled[index],
                to = target,
                "Toggling data filter"
            );
            self.enabled[index] = target;
        }
        Ok(ScopeGuard::new(self, prior, Vec::new()))
    }

    /// Act as `tenant` (or as the host for `None`) until the guard is released.
    ///
    /// Binds the tenant parameter of both tenant filters and enables the
    /// must-have-tenant filter only when a tenant is given. The guard restores
    /// the flag and the parameter values.
    ///
    /// # Errors
    /// Returns `UnknownFilter` when neither tenant filter is registered.
    pub fn switch_tenant(&mut self, tenant: Option<TenantId>) -> FilterResult<ScopeGuard<'_>> {
        let must = self.registry.index_of(MUST_HAVE_TENANT).ok();
        let may = self.registry.index_of(MAY_HAVE_TENANT).ok();
        if must.is_none() && may.is_none() {
            return Err(FilterError::UnknownFilter(MUST_HAVE_TENANT.to_owned()));
        }

        let value = Value::from(tenant);
        let mut params = Vec::with_capacity(2);
        for index in [must, may].into_iter().flatten() {
            let definition = self.registry.definition_at(index);
            let p = definition.param_index(TENANT_ID_PARAM)?;
            definition.params()[p].check(definition.name(), &value)?;
            params.push((index, p, self.params[index][p].clone()));
        }
        let flags: Vec<_> = must.map(|i| (i, self.enabled[i])).into_iter().collect();

        tracing::debug!(tenant_id = ?tenant, "Switching unit of work tenant");
        for (index, p, _) in &params {
            self.params[*index][*p] = value.clone();
        }
        if let Some(index) = must {
            self.enabled[index] = tenant.is_some();
        }
        Ok(ScopeGuard::new(self, flags, params))
    }

    pub(crate) fn is_enabled_at(&self, index: usize) -> bool {
        self.enabled[index]
    }

    pub(crate) fn values_at(&self, index: usize) -> &[Value] {
        &self.params[index]
    }

    pub(crate) fn restore(&mut self, flags: &[(usize, bool)], params: &[(usize, usize, Value)]) {
        for (index, prior) in flags.iter().rev() {
            tracing::debug!(
                filter = self.registry.definition_at(*index).name(),
                restored = *prior,
                "Restoring data filter"
            );
            self.enabled[*index] = *prior;
        }
        for (index, p, prior) in params.iter().rev() {
            self.params[*index][*p] = prior.clone();
        }
    }
}
