use std::collections::HashMap;
use std::sync::Arc;

use crate::builtin;
use crate::capability::Capability;
use crate::definition::FilterDefinition;
use crate::error::{FilterError, FilterResult};
use crate::value::Value;

/// Process-wide catalog of named filter definitions.
///
/// Built once at startup: register built-in and custom definitions, apply
/// overrides, then [`freeze`](Self::freeze). After freezing the registry is
/// read-only and is shared between units of work behind an `Arc`.
///
/// ```rust
/// use modkit_filter::{FilterRegistry, builtin};
///
/// let registry = FilterRegistry::with_builtins()?.into_shared();
/// assert!(registry.is_frozen());
/// assert!(registry.lookup(builtin::SOFT_DELETE)?.default_enabled());
/// # Ok::<(), modkit_filter::FilterError>(())
/// ```
#[derive(Debug, Default)]
pub struct FilterRegistry {
    definitions: Vec<FilterDefinition>,
    by_name: HashMap<String, usize>,
    by_capability: HashMap<Capability, Vec<usize>>,
    frozen: bool,
}

impl FilterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with soft-delete and both tenant filters.
    ///
    /// # Errors
    /// Never fails on a fresh registry; the `Result` carries registration errors through.
    pub fn with_builtins() -> FilterResult<Self> {
        let mut registry = Self::new();
        for definition in builtin::all() {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Add a filter definition.
    ///
    /// # Errors
    /// - `RegistrationClosed` once the registry is frozen
    /// - `DuplicateFilterName` if the name is taken
    /// - `UnknownParameter` / `TypeMismatch` if the definition is internally inconsistent
    pub fn register(&mut self, definition: FilterDefinition) -> FilterResult<()> {
        if self.frozen {
            return Err(FilterError::RegistrationClosed(definition.name().to_owned()));
        }
        if self.by_name.contains_key(definition.name()) {
            return Err(FilterError::DuplicateFilterName(definition.name().to_owned()));
        }
        definition.validate()?;

        let index = self.definitions.len();
        tracing::debug!(
            filter = definition.name(),
            capability = %definition.capability(),
            default_enabled = definition.default_enabled(),
            "Registering data filter"
        );
        self.by_name.insert(definition.name().to_owned(), index);
        self.by_capability
            .entry(definition.capability())
            .or_default()
            .push(index);
        self.definitions.push(definition);
        Ok(())
    }

    /// Change a registered filter's default enabled state before freezing.
    ///
    /// # Errors
    /// Returns `RegistrationClosed` after freezing or `UnknownFilter`.
    pub fn override_default(&mut self, name: &str, enabled: bool) -> FilterResult<()> {
        let definition = self.definition_mut(name)?;
        tracing::debug!(filter = name, enabled, "Overriding data filter default");
        definition.set_default_enabled(enabled);
        Ok(())
    }

    /// Change a parameter's default value before freezing.
    ///
    /// # Errors
    /// Returns `RegistrationClosed`, `UnknownFilter`, `UnknownParameter` or `TypeMismatch`.
    pub fn override_param_default(
        &mut self,
        name: &str,
        param: &str,
        value: impl Into<Value>,
    ) -> FilterResult<()> {
        let value = value.into();
        let definition = self.definition_mut(name)?;
        let index = definition.param_index(param)?;
        let filter = definition.name().to_owned();
        if let Some(decl) = definition.param_mut(index) {
            decl.check(&filter, &value)?;
            tracing::debug!(
                filter = %filter,
                param,
                %value,
                "Overriding data filter parameter default"
            );
            decl.set_default(value);
        }
        Ok(())
    }

    fn definition_mut(&mut self, name: &str) -> FilterResult<&mut FilterDefinition> {
        if self.frozen {
            return Err(FilterError::RegistrationClosed(name.to_owned()));
        }
        let index = self.index_of(name)?;
        Ok(&mut self.definitions[index])
    }

    /// Close registration. Idempotent.
    pub fn freeze(&mut self) {
        if !self.frozen {
            self.frozen = true;
            tracing::info!(
                filters = self.definitions.len(),
                "Data filter registry frozen"
            );
        }
    }

    /// Freeze and wrap for sharing across units of work.
    #[must_use]
    pub fn into_shared(mut self) -> Arc<Self> {
        self.freeze();
        Arc::new(self)
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// # Errors
    /// Returns `UnknownFilter` if no definition has this name.
    pub fn lookup(&self, name: &str) -> FilterResult<&FilterDefinition> {
        self.index_of(name).map(|i| &self.definitions[i])
    }

    /// All definitions declared against `capability`, in registration order.
    pub fn definitions_for(
        &self,
        capability: Capability,
    ) -> impl Iterator<Item = &FilterDefinition> {
        self.indices_for(capability)
            .iter()
            .map(|&i| &self.definitions[i])
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.definitions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub(crate) fn index_of(&self, name: &str) -> FilterResult<usize> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| FilterError::UnknownFilter(name.to_owned()))
    }

    pub(crate) fn indices_for(&self, capability: Capability) -> &[usize] {
        self.by_capability
            .get(&capability)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(crate) fn definition_at(&self, index: usize) -> &FilterDefinition {
        &self.definitions[index]
    }
}
