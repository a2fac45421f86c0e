use std::fmt;

use crate::errors::ServiceError;

/// Shared-secret check guarding `DELETE /aus/:id`.
///
/// There is exactly one secret for the whole deployment. It is an
/// administrator bypass, not a per-user credential: anyone holding the
/// token can delete any entry.
#[derive(Clone, Default)]
pub struct AdminGate {
    secret: Option<String>,
}

impl AdminGate {
    /// An empty secret leaves the gate closed for every caller.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self { secret: (!secret.is_empty()).then_some(secret) }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Allowed iff `supplied` is present, non-empty and exactly the configured secret.
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), ServiceError> {
        match (self.secret.as_deref(), supplied) {
            (Some(secret), Some(token)) if !token.is_empty() && token == secret => Ok(()),
            _ => Err(ServiceError::Forbidden),
        }
    }
}

impl fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.is_configured())
            .finish()
    }
}
