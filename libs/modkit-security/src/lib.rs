#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Session primitives consumed by the data-filter engine.
//!
//! The engine never looks at who the caller is directly. It asks a
//! [`SessionProvider`] for the current tenant and whether the actor is a
//! host (cross-tenant) actor, and seeds per-unit-of-work filter state from
//! those two facts.

pub mod context;
pub mod session;

pub use context::{ROOT_SUBJECT_ID, SecurityContext, SecurityContextBuilder};
pub use session::{SessionProvider, TenantId};
