use serde::{Deserialize, Serialize};

/// JWT claims issued by the managed auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Audience
    pub aud: String,

    /// Issuer
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    #[serde(default)]
    pub nbf: Option<i64>,

    #[serde(default)]
    pub email: Option<String>,

    /// App metadata set server-side at signup; carries the tenant binding.
    #[serde(default)]
    pub app_metadata: Option<AppMetadata>,

    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

/// Server-controlled metadata. Users cannot edit these fields through the
/// auth provider's client API, which is what makes them safe to trust for
/// tenancy and role decisions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppMetadata {
    /// Tenant (law office) this user belongs to.
    #[serde(default)]
    pub escritorio_id: Option<uuid::Uuid>,

    /// Role within the office: admin, advogado or estagiario.
    #[serde(default)]
    pub papel: Option<String>,
}
