//! Startup configuration for data filters.
//!
//! Lets deployments change filter defaults without code:
//!
//! ```yaml
//! data_filters:
//!   filters:
//!     SoftDelete:
//!       enabled: false
//!     MayHaveTenant:
//!       params:
//!         tenant_id: null
//! ```
//!
//! The configuration is applied to the registry before it is frozen.

use std::collections::BTreeMap;

use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};
use crate::registry::FilterRegistry;
use crate::value::Value;

/// Per-filter overrides keyed by filter name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: BTreeMap<String, FilterOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterOverride {
    /// New default enabled state.
    #[serde(default)]
    pub enabled: Option<bool>,
    /// New parameter defaults, coerced to each parameter's declared kind.
    #[serde(default)]
    pub params: BTreeMap<String, serde_json::Value>,
}

impl FilterConfig {
    /// Extract the configuration stored under `key`; a missing key yields an empty config.
    ///
    /// # Errors
    /// Returns `FilterError::Config` if the value under `key` has the wrong shape.
    pub fn from_figment(figment: &Figment, key: &str) -> FilterResult<Self> {
        if !figment.contains(key) {
            return Ok(Self::default());
        }
        figment
            .extract_inner(key)
            .map_err(|e| FilterError::Config(e.to_string()))
    }
}

impl FilterRegistry {
    /// Apply configured overrides. Must run before [`freeze`](Self::freeze).
    ///
    /// Overrides of filters with a session binding are applied but logged at
    /// warn level: the session seed wins when a unit of work begins.
    ///
    /// # Errors
    /// Returns `RegistrationClosed`, `UnknownFilter`, `UnknownParameter` or
    /// `TypeMismatch` for the first override that cannot be applied.
    pub fn apply_config(&mut self, config: &FilterConfig) -> FilterResult<()> {
        for (name, over) in &config.filters {
            let session_bound = self.lookup(name)?.session_binding().is_some();
            if let Some(enabled) = over.enabled {
                if session_bound {
                    tracing::warn!(
                        filter = %name,
                        enabled,
                        "Session may override the configured default of a data filter"
                    );
                }
                self.override_default(name, enabled)?;
            }
            for (param, json) in &over.params {
                let definition = self.lookup(name)?;
                let decl = &definition.params()[definition.param_index(param)?];
                let value = Value::from_json(decl.kind(), json).ok_or_else(|| {
                    FilterError::TypeMismatch {
                        filter: name.clone(),
                        param: param.clone(),
                        expected: decl.kind(),
                        got: json_type_name(json),
                    }
                })?;
                if session_bound {
                    tracing::warn!(
                        filter = %name,
                        param = %param,
                        "Session may replace the configured parameter default of a data filter"
                    );
                }
                self.override_param_default(name, param, value)?;
            }
        }
        Ok(())
    }
}

fn json_type_name(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "Null",
        serde_json::Value::Bool(_) => "Bool",
        serde_json::Value::Number(_) => "Number",
        serde_json::Value::String(_) => "String",
        serde_json::Value::Array(_) => "Array",
        serde_json::Value::Object(_) => "Object",
    }
}
