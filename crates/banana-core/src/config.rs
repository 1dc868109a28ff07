//! Process-wide configuration.
//!
//! Every external credential and endpoint the server touches is read from the
//! environment exactly once at startup and held in a typed [`AppConfig`].
//! Handlers never read env vars directly.

use serde::{Deserialize, Serialize};

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Canonical-site and platform-hostname configuration used by origin resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Operator-configured canonical site URL (`SITE_URL`).
    pub site_url: Option<String>,
    /// Secondary public site URL (`PUBLIC_SITE_URL`), checked after `site_url`.
    pub public_site_url: Option<String>,
    /// Platform-assigned preview hostname (`VERCEL_URL`), no scheme.
    pub vercel_url: Option<String>,
    /// True when `APP_ENV=production`.
    pub production: bool,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        Self {
            site_url: env_opt("SITE_URL"),
            public_site_url: env_opt("PUBLIC_SITE_URL"),
            vercel_url: env_opt("VERCEL_URL"),
            production: env_opt("APP_ENV").as_deref() == Some("production"),
        }
    }
}

/// AI image-generation router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    /// API root, overridable for tests (`OPENROUTER_BASE_URL`).
    pub base_url: String,
    /// Optional attribution headers sent upstream.
    pub site_url: Option<String>,
    pub app_name: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            site_url: None,
            app_name: None,
        }
    }
}

impl OpenRouterConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("OPENROUTER_API_KEY"),
            base_url: env_opt("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            site_url: env_opt("OPENROUTER_SITE_URL"),
            app_name: env_opt("OPENROUTER_APP_NAME"),
        }
    }
}

/// Creem payments configuration: credentials plus the plan/cycle product map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreemConfig {
    pub api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub enable_payments: bool,
    pub webhook_secret: Option<String>,
    pub basic_monthly: Option<String>,
    pub basic_yearly: Option<String>,
    pub pro_monthly: Option<String>,
    pub pro_yearly: Option<String>,
    pub max_monthly: Option<String>,
    pub max_yearly: Option<String>,
    pub pack_starter: Option<String>,
    pub pack_growth: Option<String>,
    pub pack_professional: Option<String>,
    pub pack_enterprise: Option<String>,
}

impl CreemConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_opt("CREEM_API_KEY"),
            api_base_url: env_opt("CREEM_API_BASE_URL"),
            enable_payments: env_opt("CREEM_ENABLE_PAYMENTS")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(false),
            // Legacy deployments exported the secret under a name with a
            // space in it; accept both spellings.
            webhook_secret: env_opt("CREEM_WEBHOOK_SECRET").or_else(|| env_opt("CREEM WEBHOOK SECRET")),
            basic_monthly: env_opt("CREEM_BASIC_MONTHLY_PRODUCT_ID"),
            basic_yearly: env_opt("CREEM_BASIC_YEARLY_PRODUCT_ID"),
            pro_monthly: env_opt("CREEM_PRO_MONTHLY_PRODUCT_ID"),
            pro_yearly: env_opt("CREEM_PRO_YEARLY_PRODUCT_ID"),
            max_monthly: env_opt("CREEM_MAX_MONTHLY_PRODUCT_ID"),
            max_yearly: env_opt("CREEM_MAX_YEARLY_PRODUCT_ID"),
            pack_starter: env_opt("CREEM_CREDIT_PACK_STARTER_PRODUCT_ID"),
            pack_growth: env_opt("CREEM_CREDIT_PACK_GROWTH_PRODUCT_ID"),
            pack_professional: env_opt("CREEM_CREDIT_PACK_PROFESSIONAL_PRODUCT_ID"),
            pack_enterprise: env_opt("CREEM_CREDIT_PACK_ENTERPRISE_PRODUCT_ID"),
        }
    }
}

/// Auth provider (Supabase-style) configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupabaseConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl SupabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_opt("SUPABASE_URL"),
            anon_key: env_opt("SUPABASE_ANON_KEY"),
        }
    }
}

/// Top-level application configuration, populated once at process start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub openrouter: OpenRouterConfig,
    pub creem: CreemConfig,
    pub supabase: SupabaseConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            site: SiteConfig::from_env(),
            openrouter: OpenRouterConfig::from_env(),
            creem: CreemConfig::from_env(),
            supabase: SupabaseConfig::from_env(),
        }
    }
}
