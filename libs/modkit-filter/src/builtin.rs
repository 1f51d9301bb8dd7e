//! Built-in filter definitions: soft-delete and the two tenant filters.
//!
//! They are ordinary [`FilterDefinition`]s; the only thing that sets the
//! tenant filters apart is a session binding that reads the current tenant
//! when a unit of work begins.

use modkit_security::SessionProvider;

use crate::capability::{Capability, fields};
use crate::definition::{FilterDefinition, ParamDecl, SessionSeed};
use crate::predicate::{Operand, Predicate};
use crate::value::{Value, ValueKind};

/// Excludes rows whose `is_deleted` flag is set.
pub const SOFT_DELETE: &str = "SoftDelete";
/// Restricts tenant-bound rows to the current tenant.
pub const MUST_HAVE_TENANT: &str = "MustHaveTenant";
/// Restricts tenant-optional rows to the current tenant plus host-owned rows.
pub const MAY_HAVE_TENANT: &str = "MayHaveTenant";
/// Parameter both tenant filters bind the current tenant to.
pub const TENANT_ID_PARAM: &str = "tenant_id";

#[must_use]
pub fn soft_delete() -> FilterDefinition {
    FilterDefinition::new(
        SOFT_DELETE,
        Capability::SOFT_DELETABLE,
        Predicate::field_eq(fields::IS_DELETED, false),
    )
}

#[must_use]
pub fn must_have_tenant() -> FilterDefinition {
    FilterDefinition::new(
        MUST_HAVE_TENANT,
        Capability::TENANT_BOUND,
        Predicate::field_eq(fields::TENANT_ID, Operand::param(TENANT_ID_PARAM)),
    )
    .with_param(tenant_param())
    .with_session_binding(must_have_tenant_seed)
}

#[must_use]
pub fn may_have_tenant() -> FilterDefinition {
    FilterDefinition::new(
        MAY_HAVE_TENANT,
        Capability::TENANT_OPTIONAL,
        Predicate::any(vec![
            Predicate::field_eq(fields::TENANT_ID, Operand::param(TENANT_ID_PARAM)),
            Predicate::field_is_null(fields::TENANT_ID),
        ]),
    )
    .with_param(tenant_param())
    .with_session_binding(may_have_tenant_seed)
}

/// All built-in definitions in registration order.
#[must_use]
pub fn all() -> Vec<FilterDefinition> {
    vec![soft_delete(), must_have_tenant(), may_have_tenant()]
}

fn tenant_param() -> ParamDecl {
    ParamDecl::new(TENANT_ID_PARAM, ValueKind::Uuid, Value::Null).nullable()
}

fn must_have_tenant_seed(session: &dyn SessionProvider) -> SessionSeed {
    match session.current_tenant_id() {
        Some(tenant) if !session.is_host_actor() => SessionSeed {
            force_enabled: None,
            params: vec![(TENANT_ID_PARAM, Value::Uuid(tenant))],
        },
        // No tenant context: rows of every tenant are visible.
        _ => SessionSeed {
            force_enabled: Some(false),
            params: Vec::new(),
        },
    }
}

fn may_have_tenant_seed(session: &dyn SessionProvider) -> SessionSeed {
    let tenant = if session.is_host_actor() {
        None
    } else {
        session.current_tenant_id()
    };
    SessionSeed {
        force_enabled: None,
        params: vec![(TENANT_ID_PARAM, Value::from(tenant))],
    }
}
