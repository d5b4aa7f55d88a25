use uuid::Uuid;

use dwell_types::api::Claims;

/// The authenticated caller of an operation. Resolved once per request by the
/// HTTP layer and passed in explicitly; `None` means an anonymous caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn owns(&self, owner_id: &Uuid) -> bool {
        &self.user_id == owner_id
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        }
    }
}
