#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `ModKit` automatic data filters.
//!
//! Named filters (soft-delete, tenant isolation, or any custom condition) are
//! registered once at startup and then applied to every retrieval of an
//! entity type that declares the matching capability. Each unit of work
//! carries its own [`UnitOfWorkFilterState`]; filters can be switched off or
//! on for a lexical scope through a [`ScopeGuard`], which restores the prior
//! flags when dropped.
//!
//! # Example
//! ```rust
//! use modkit_filter::{
//!     Capability, FieldAccess, FilterRegistry, FilterableEntity, MemoryQuery,
//!     UnitOfWorkFilterState, Value, builtin::SOFT_DELETE, fields,
//! };
//! use modkit_security::SecurityContext;
//!
//! struct Note {
//!     id: i64,
//!     is_deleted: bool,
//! }
//!
//! impl FilterableEntity for Note {
//!     const NAME: &'static str = "note";
//!     const CAPABILITIES: &'static [Capability] = &[Capability::SOFT_DELETABLE];
//! }
//!
//! impl FieldAccess for Note {
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "id" => Some(Value::I64(self.id)),
//!             fields::IS_DELETED => Some(Value::Bool(self.is_deleted)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let notes = vec![
//!     Note { id: 1, is_deleted: false },
//!     Note { id: 2, is_deleted: true },
//! ];
//!
//! let registry = FilterRegistry::with_builtins()?.into_shared();
//! let mut state = UnitOfWorkFilterState::begin(registry, &SecurityContext::anonymous())?;
//!
//! assert_eq!(MemoryQuery::filtered(&notes, &state)?.count()?, 1);
//! {
//!     let guard = state.disable([SOFT_DELETE])?;
//!     assert_eq!(MemoryQuery::filtered(&notes, &guard)?.count()?, 2);
//! }
//! assert_eq!(MemoryQuery::filtered(&notes, &state)?.count()?, 1);
//! # Ok::<(), modkit_filter::FilterError>(())
//! ```

pub mod builtin;
pub mod capability;
pub mod config;
pub mod definition;
pub mod error;
pub mod guard;
pub mod interceptor;
pub mod memory;
pub mod predicate;
pub mod registry;
pub mod state;
pub mod value;

pub use capability::{Capability, FieldAccess, FilterableEntity, fields};
pub use config::{FilterConfig, FilterOverride};
pub use definition::{FilterDefinition, ParamDecl, SessionBinding, SessionSeed};
pub use error::{FilterError, FilterResult};
pub use guard::ScopeGuard;
pub use interceptor::{FilterTarget, QueryInterceptor};
pub use memory::MemoryQuery;
pub use predicate::{BoundPredicate, Operand, Predicate, UnboundParam};
pub use registry::FilterRegistry;
pub use state::UnitOfWorkFilterState;
pub use value::{Value, ValueKind};
