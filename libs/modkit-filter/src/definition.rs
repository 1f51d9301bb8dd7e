use std::fmt;

use modkit_security::SessionProvider;

use crate::capability::Capability;
use crate::error::{FilterError, FilterResult};
use crate::predicate::Predicate;
use crate::value::{Value, ValueKind};

/// Declared filter parameter: name, type, nullability and default value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    name: &'static str,
    kind: ValueKind,
    nullable: bool,
    default: Value,
}

impl ParamDecl {
    #[must_use]
    pub fn new(name: &'static str, kind: ValueKind, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            default: default.into(),
        }
    }

    /// Allow `Value::Null` as a binding for this parameter.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    #[must_use]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub(crate) fn set_default(&mut self, value: Value) {
        self.default = value;
    }

    /// Check that `value` can be bound to this parameter of filter `filter`.
    ///
    /// # Errors
    /// Returns `FilterError::TypeMismatch` if the kinds differ or a null is
    /// bound to a non-nullable parameter.
    pub fn check(&self, filter: &str, value: &Value) -> FilterResult<()> {
        let ok = match value.kind() {
            None => self.nullable,
            Some(kind) => kind == self.kind,
        };
        if ok {
            Ok(())
        } else {
            Err(FilterError::TypeMismatch {
                filter: filter.to_owned(),
                param: self.name.to_owned(),
                expected: self.kind,
                got: value.type_name(),
            })
        }
    }
}

/// Adjustments a filter requests from the session when a unit of work begins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSeed {
    /// Overrides the registry default for this unit of work when set.
    pub force_enabled: Option<bool>,
    /// Parameter values taken from the session.
    pub params: Vec<(&'static str, Value)>,
}

/// Derives a [`SessionSeed`] from the current session.
pub type SessionBinding = fn(&dyn SessionProvider) -> SessionSeed;

/// One named filter: capability, condition template, parameters and default state.
#[derive(Clone)]
pub struct FilterDefinition {
    name: String,
    capability: Capability,
    predicate: Predicate,
    params: Vec<ParamDecl>,
    default_enabled: bool,
    session_binding: Option<SessionBinding>,
}

impl FilterDefinition {
    /// New definition, enabled by default, without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, capability: Capability, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            capability,
            predicate,
            params: Vec::new(),
            default_enabled: true,
            session_binding: None,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.default_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_session_binding(mut self, binding: SessionBinding) -> Self {
        self.session_binding = Some(binding);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    #[must_use]
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }

    #[must_use]
    pub fn default_enabled(&self) -> bool {
        self.default_enabled
    }

    #[must_use]
    pub fn session_binding(&self) -> Option<SessionBinding> {
        self.session_binding
    }

    /// Position of `param` in the declaration order.
    ///
    /// # Errors
    /// Returns `FilterError::UnknownParameter` if the parameter is not declared.
    pub fn param_index(&self, param: &str) -> FilterResult<usize> {
        self.params
            .iter()
            .position(|p| p.name == param)
            .ok_or_else(|| FilterError::UnknownParameter {
                filter: self.name.clone(),
                param: param.to_owned(),
            })
    }

    /// Declared defaults in declaration order.
    #[must_use]
    pub fn default_values(&self) -> Vec<Value> {
        self.params.iter().map(|p| p.default.clone()).collect()
    }

    pub(crate) fn set_default_enabled(&mut self, enabled: bool) {
        self.default_enabled = enabled;
    }

    pub(crate) fn param_mut(&mut self, index: usize) -> Option<&mut ParamDecl> {
        self.params.get_mut(index)
    }

    /// Reject definitions whose parts disagree with each other.
    pub(crate) fn validate(&self) -> FilterResult<()> {
        for (i, p) in self.params.iter().enumerate() {
            if self.params[..i].iter().any(|q| q.name == p.name) {
                return Err(FilterError::Config(format!(
                    "filter '{}' declares parameter '{}' twice",
                    self.name, p.name
                )));
            }
            p.check(&self.name, &p.default)?;
        }
        for referenced in self.predicate.params() {
            self.param_index(referenced)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FilterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDefinition")
            .field("name", &self.name)
            .field("capability", &self.capability)
            .field("predicate", &self.predicate)
            .field("params", &self.params)
            .field("default_enabled", &self.default_enabled)
            .field("session_bound", &self.session_binding.is_some())
            .finish()
    }
}
