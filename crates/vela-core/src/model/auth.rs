//! Credencial opaca del workflow.
//!
//! Se obtiene una vez por workflow (ver `vela-adapters::auth`), se entrega al
//! `ExecutionContext` en construcción y no cambia después. El core sólo
//! necesita el bearer token.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    token: String,
    tenant_id: Option<String>,
}

impl AuthInfo {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(),
               tenant_id: None }
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}
