//! Static capability declarations for entity types.
//!
//! An entity type opts into automatic filtering by listing the capabilities
//! it exposes. The list is a `const` on the type, so the interceptor never
//! inspects values at runtime to decide which filters apply.
//!
//! ```rust
//! use modkit_filter::{Capability, FieldAccess, FilterableEntity, Value, fields};
//!
//! struct Person {
//!     name: String,
//!     is_deleted: bool,
//! }
//!
//! impl FilterableEntity for Person {
//!     const NAME: &'static str = "person";
//!     const CAPABILITIES: &'static [Capability] = &[Capability::SOFT_DELETABLE];
//! }
//!
//! impl FieldAccess for Person {
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             fields::IS_DELETED => Some(Value::Bool(self.is_deleted)),
//!             "name" => Some(Value::from(self.name.as_str())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! assert!(Person::declares(Capability::SOFT_DELETABLE));
//! assert!(!Person::declares(Capability::TENANT_BOUND));
//! ```

use std::fmt;

use crate::value::Value;

/// Well-known field names exposed by the built-in capabilities.
pub mod fields {
    /// Boolean deleted-flag of a soft-deletable entity.
    pub const IS_DELETED: &str = "is_deleted";
    /// Tenant column of tenant-bound and tenant-optional entities.
    pub const TENANT_ID: &str = "tenant_id";
}

/// Marker tag an entity type declares to make matching filters applicable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(&'static str);

impl Capability {
    /// Entity exposes a boolean `is_deleted` field.
    pub const SOFT_DELETABLE: Capability = Capability::new("soft-deletable");
    /// Entity exposes a non-nullable `tenant_id` field.
    pub const TENANT_BOUND: Capability = Capability::new("tenant-bound");
    /// Entity exposes a nullable `tenant_id` field; null rows are host-owned.
    pub const TENANT_OPTIONAL: Capability = Capability::new("tenant-optional");

    #[must_use]
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Per-type declaration of the capabilities an entity exposes.
pub trait FilterableEntity {
    /// Stable entity name used in logs and errors.
    const NAME: &'static str;

    /// Capabilities declared by this entity type.
    const CAPABILITIES: &'static [Capability];

    #[must_use]
    fn declares(capability: Capability) -> bool {
        Self::CAPABILITIES.contains(&capability)
    }
}

/// Field accessors used to evaluate bound predicates against loaded values.
///
/// Return `Some(Value::Null)` for a field that exists but holds no value and
/// `None` for a field the entity does not expose.
pub trait FieldAccess: FilterableEntity {
    fn field(&self, name: &str) -> Option<Value>;
}
