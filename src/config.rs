use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

/// LLM completion settings.
///
/// `api_key` is optional on purpose: routes that never touch the completion
/// gateway must keep working on an instance deployed without AI credentials,
/// so the gateway raises `MissingCredentials` on first use instead of
/// failing at boot.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub modelo: String,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
    /// Price per 1k input tokens, in the billing currency.
    pub preco_entrada_por_mil: Decimal,
    /// Price per 1k output tokens.
    pub preco_saida_por_mil: Decimal,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // Database
    pub database_url: String,
    pub database_max_connections: u32,

    // Redis
    pub redis_url: String,
    pub redis_cache_ttl_seconds: u64,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Auth provider (Supabase-style JWKS)
    pub jwt_jwks_url: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwks_cache_ttl_seconds: u64,

    // LLM completions
    pub llm: LlmSettings,

    // Document export renderer
    pub exportador_url: String,
    pub exportador_token: String,
    pub exportador_timeout_seconds: u64,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // Database
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        // Redis
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://redis:6379/0".to_string());
        let redis_cache_ttl_seconds = env::var("REDIS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Auth provider
        let jwt_jwks_url = env::var("JWT_JWKS_URL").context("JWT_JWKS_URL must be set")?;
        let jwt_issuer = env::var("JWT_ISSUER").context("JWT_ISSUER must be set")?;
        let jwt_audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());
        let jwks_cache_ttl_seconds = env::var("JWKS_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1800);

        // LLM completions
        let llm = LlmSettings {
            base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            api_key: env::var("LLM_API_KEY").ok().filter(|s| !s.is_empty()),
            modelo: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            max_output_tokens: env::var("LLM_MAX_OUTPUT_TOKENS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(4096),
            timeout_seconds: env::var("LLM_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(120),
            preco_entrada_por_mil: parse_preco("LLM_PRECO_ENTRADA_POR_MIL", Decimal::new(25, 4)),
            preco_saida_por_mil: parse_preco("LLM_PRECO_SAIDA_POR_MIL", Decimal::new(1, 2)),
        };

        // Export renderer
        let exportador_url =
            env::var("EXPORTADOR_URL").unwrap_or_else(|_| "http://exportador:9000".to_string());
        let exportador_token =
            env::var("EXPORTADOR_TOKEN").context("EXPORTADOR_TOKEN must be set")?;
        let exportador_timeout_seconds = env::var("EXPORTADOR_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        Ok(Settings {
            env,
            server_addr,
            database_url,
            database_max_connections,
            redis_url,
            redis_cache_ttl_seconds,
            cors_allow_origins,
            jwt_jwks_url,
            jwt_issuer,
            jwt_audience,
            jwks_cache_ttl_seconds,
            llm,
            exportador_url,
            exportador_token,
            exportador_timeout_seconds,
        })
    }
}

fn parse_preco(var: &str, default: Decimal) -> Decimal {
    env::var(var)
        .ok()
        .and_then(|s| Decimal::from_str(&s).ok())
        .unwrap_or(default)
}
