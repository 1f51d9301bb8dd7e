use std::sync::Arc;

use uuid::Uuid;

/// Tenant identifier as carried by sessions and stored in `tenant_id` columns.
pub type TenantId = Uuid;

/// Supplies the identity facts that built-in data filters depend on.
///
/// Implementations are cheap, synchronous lookups. They are consulted once
/// when a unit of work begins; later changes to the session are not observed
/// by an already running unit of work.
pub trait SessionProvider: Send + Sync {
    /// Tenant of the current actor, `None` for anonymous and host actors.
    fn current_tenant_id(&self) -> Option<TenantId>;

    /// True when the actor operates across tenants (host/admin).
    fn is_host_actor(&self) -> bool;

    /// True when the actor is bound to exactly one tenant.
    fn has_tenant_context(&self) -> bool {
        !self.is_host_actor() && self.current_tenant_id().is_some()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for &T {
    fn current_tenant_id(&self) -> Option<TenantId> {
        (**self).current_tenant_id()
    }

    fn is_host_actor(&self) -> bool {
        (**self).is_host_actor()
    }
}

impl<T: SessionProvider + ?Sized> SessionProvider for Arc<T> {
    fn current_tenant_id(&self) -> Option<TenantId> {
        (**self).current_tenant_id()
    }

    fn is_host_actor(&self) -> bool {
        (**self).is_host_actor()
    }
}
