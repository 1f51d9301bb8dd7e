use crate::session::{SessionProvider, TenantId};
use uuid::{Uuid, uuid};

/// Subject id of the system actor used for bootstrap and maintenance work.
pub const ROOT_SUBJECT_ID: Uuid = uuid!("11111111-6a88-4768-9dfc-6bcd5187d9ed");

/// `SecurityContext` encapsulates the identity of the actor behind a request or operation
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    tenant_id: Option<TenantId>,
    subject_id: Uuid,
    subject_type: Option<String>,
    host: bool,
}

impl SecurityContext {
    /// Create a new `SecurityContext` builder
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Create an anonymous `SecurityContext` with no tenant and no subject
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    /// Context of a user acting inside one tenant.
    #[must_use]
    pub fn for_tenant(tenant_id: TenantId, subject_id: Uuid) -> Self {
        Self::builder()
            .tenant_id(tenant_id)
            .subject_id(subject_id)
            .build()
    }

    /// Context of a host (cross-tenant) actor.
    #[must_use]
    pub fn host(subject_id: Uuid) -> Self {
        Self::builder().subject_id(subject_id).host().build()
    }

    /// Context of the root/system subject. Root acts as a host.
    #[must_use]
    pub fn root() -> Self {
        Self::host(ROOT_SUBJECT_ID)
    }

    /// Get the tenant ID associated with the security context, if any
    #[must_use]
    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// Get the subject ID (user, service, or system) associated with the security context
    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.subject_id == ROOT_SUBJECT_ID
    }

    #[must_use]
    pub fn subject_type(&self) -> Option<&str> {
        self.subject_type.as_deref()
    }

    #[must_use]
    pub fn is_host(&self) -> bool {
        self.host
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.subject_id.is_nil()
    }
}

impl SessionProvider for SecurityContext {
    fn current_tenant_id(&self) -> Option<TenantId> {
        // A host actor is never bound to a tenant, even if one was recorded.
        if self.host { None } else { self.tenant_id }
    }

    fn is_host_actor(&self) -> bool {
        self.host
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    tenant_id: Option<TenantId>,
    subject_id: Option<Uuid>,
    subject_type: Option<String>,
    host: bool,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    #[must_use]
    pub fn subject_id(mut self, subject_id: Uuid) -> Self {
        self.subject_id = Some(subject_id);
        self
    }

    #[must_use]
    pub fn subject_type(mut self, subject_type: &str) -> Self {
        self.subject_type = Some(subject_type.to_owned());
        self
    }

    /// Mark the actor as a host (cross-tenant) actor.
    #[must_use]
    pub fn host(mut self) -> Self {
        self.host = true;
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            tenant_id: self.tenant_id,
            subject_id: self.subject_id.unwrap_or_default(),
            subject_type: self.subject_type,
            host: self.host,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_security_context_builder_full() {
        let tenant_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let subject_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap();

        let ctx = SecurityContext::builder()
            .tenant_id(tenant_id)
            .subject_id(subject_id)
            .subject_type("user")
            .build();

        assert_eq!(ctx.tenant_id(), Some(tenant_id));
        assert_eq!(ctx.subject_id(), subject_id);
        assert_eq!(ctx.subject_type(), Some("user"));
        assert!(!ctx.is_host());
        assert_eq!(ctx.current_tenant_id(), Some(tenant_id));
        assert!(ctx.has_tenant_context());
    }

    #[test]
    fn test_security_context_anonymous() {
        let ctx = SecurityContext::anonymous();

        assert!(ctx.is_anonymous());
        assert_eq!(ctx.tenant_id(), None);
        assert!(!ctx.is_host_actor());
        assert!(!ctx.has_tenant_context());
    }

    #[test]
    fn test_host_context_hides_recorded_tenant() {
        let tenant_id = Uuid::new_v4();
        let ctx = SecurityContext::builder()
            .tenant_id(tenant_id)
            .subject_id(Uuid::new_v4())
            .host()
            .build();

        assert_eq!(ctx.tenant_id(), Some(tenant_id));
        assert_eq!(ctx.current_tenant_id(), None);
        assert!(ctx.is_host_actor());
        assert!(!ctx.has_tenant_context());
    }

    #[test]
    fn test_root_context_is_host() {
        let ctx = SecurityContext::root();
        assert!(ctx.is_host_actor());
        assert!(ctx.is_root());
    }
}
