use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed by the CORS layer. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/coursehub.db, or COURSEHUB__DATABASE__URL
    #[serde(default)]
    pub max_connections: Option<u32>,
}

// --- Auth Config ---
// Bearer tokens are minted by the external auth provider and signed with a shared HS256 secret.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String, // "secret_from_env" -> AUTH_JWT_SECRET
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

fn default_stripe_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "usd".to_string()
}

fn default_webhook_tolerance() -> i64 {
    300
}

fn default_true() -> bool {
    true
}

// --- Stripe Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StripeConfig {
    pub secret_key: String,     // "secret_from_env" -> STRIPE_SECRET_KEY
    pub webhook_secret: String, // "secret_from_env" -> STRIPE_WEBHOOK_SECRET
    #[serde(default = "default_stripe_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_version: Option<String>,
    /// Currency used when a price has to be created for a course.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Fallback redirect targets when the client does not send its own.
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_seconds: i64,
    #[serde(default = "default_true")]
    pub allow_promotion_codes: bool,
}

// --- Logging Config ---
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by RUST_LOG.
    #[serde(default)]
    pub level: Option<String>,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server, database and auth are mandatory
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_stripe: bool,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub stripe: Option<StripeConfig>,
    #[serde(default)]
    pub logging: LoggingConfig,
}
