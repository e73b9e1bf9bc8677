use serde::Serialize;
use uuid::Uuid;

use super::Claims;

/// Role of a user within their law office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Papel {
    Admin,
    Advogado,
    Estagiario,
}

impl Papel {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "advogado" => Some(Self::Advogado),
            "estagiario" => Some(Self::Estagiario),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Advogado => "advogado",
            Self::Estagiario => "estagiario",
        }
    }

    /// Review actions (approve/reject) are restricted to admins and
    /// attorneys; interns can draft but not sign off.
    pub fn pode_revisar(&self) -> bool {
        matches!(self, Self::Admin | Self::Advogado)
    }
}

/// Authenticated user context extracted from a verified JWT.
///
/// Every tenant-scoped query downstream filters by `escritorio_id` taken
/// from here, never from a client-supplied payload field.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub escritorio_id: Uuid,
    pub papel: Papel,
    pub email: Option<String>,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Result<Self, &'static str> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| "Invalid user ID in token")?;

        let metadata = claims
            .app_metadata
            .as_ref()
            .ok_or("Token missing app metadata")?;

        let escritorio_id = metadata
            .escritorio_id
            .ok_or("Token missing escritorio binding")?;

        let papel = metadata
            .papel
            .as_deref()
            .and_then(Papel::parse)
            .ok_or("Token missing or invalid papel")?;

        Ok(Self {
            user_id,
            escritorio_id,
            papel,
            email: claims.email.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::AppMetadata;

    fn claims_base() -> Claims {
        Claims {
            sub: "6f2d8c4e-1d22-4a57-9a41-1df0a3b0f7aa".to_string(),
            aud: "authenticated".to_string(),
            iss: "https://auth.example".to_string(),
            iat: 0,
            exp: i64::MAX,
            nbf: None,
            email: Some("ana@escritorio.adv.br".to_string()),
            app_metadata: Some(AppMetadata {
                escritorio_id: Some(uuid::Uuid::new_v4()),
                papel: Some("advogado".to_string()),
            }),
            user_metadata: None,
        }
    }

    #[test]
    fn builds_context_from_complete_claims() {
        let ctx = AuthContext::from_claims(&claims_base()).expect("valid claims");
        assert_eq!(ctx.papel, Papel::Advogado);
        assert!(ctx.papel.pode_revisar());
    }

    #[test]
    fn rejects_claims_without_tenant() {
        let mut claims = claims_base();
        claims.app_metadata = Some(AppMetadata {
            escritorio_id: None,
            papel: Some("admin".to_string()),
        });
        assert!(AuthContext::from_claims(&claims).is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let mut claims = claims_base();
        claims.app_metadata = Some(AppMetadata {
            escritorio_id: Some(uuid::Uuid::new_v4()),
            papel: Some("gerente".to_string()),
        });
        assert!(AuthContext::from_claims(&claims).is_err());
    }

    #[test]
    fn estagiario_cannot_review() {
        assert!(!Papel::Estagiario.pode_revisar());
        assert!(Papel::Admin.pode_revisar());
    }
}
