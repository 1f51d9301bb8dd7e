#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! `SeaORM` binding for `ModKit` data filters.
//!
//! Every retrieval built through this crate (list, single-get, count and
//! navigation to related entities) carries the conjunction of the filters
//! enabled in the caller's unit of work, lowered into a `SeaORM` condition.
//! Queries cannot be executed before the filters are applied: the
//! [`FilteredSelect`] typestate only exposes `all` / `one` / `count` once it
//! is [`Filtered`].
//!
//! # Example
//! ```rust,ignore
//! use modkit_filter::{FilterRegistry, builtin};
//! use modkit_filter_db::FilteredConn;
//!
//! let db = FilteredConn::new(conn, FilterRegistry::with_builtins()?.into_shared());
//! let mut state = db.begin(&ctx)?;
//!
//! let visible = db.find::<person::Entity>(&state)?.all(db.conn()).await?;
//! db.soft_delete_by_id::<person::Entity>(&state, 42_i64).await?;
//!
//! let guard = state.disable([builtin::SOFT_DELETE])?;
//! let everything = db.find::<person::Entity>(&guard)?.all(db.conn()).await?;
//! ```

pub mod cond;
pub mod conn;
pub mod entity;
pub mod error;
pub mod select;

pub use cond::build_filter_condition;
pub use conn::FilteredConn;
pub use entity::FilterableColumns;
pub use error::FilterDbError;
pub use select::{Filtered, FilteredEntityExt, FilteredSelect, Unfiltered};
