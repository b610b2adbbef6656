use stayhub_auth::{Principal, PrincipalId, Role};

/// Principal context for a request, inserted by the auth middleware.
///
/// Immutable for the rest of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal.id()
    }

    pub fn role(&self) -> Role {
        self.principal.role()
    }
}
