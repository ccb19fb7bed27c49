//! Environment-driven settings, grounded on `settings.py`'s
//! `Settings(BaseSettings)` field list — selection strings for the
//! pluggable families (auth method, identity store, logging/observability
//! sink) plus their per-variant configuration. Loading config from the
//! environment is itself out of scope for the core per spec.md §1; this is
//! the ambient ameniity the teacher crate's own `cli.rs`/`config.rs` provide
//! for the equivalent role, reimplemented against plain env vars the way
//! the distillation's origin reads them.

use std::env;

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_opt(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_bool(name: &str, default: bool) -> bool {
    match env::var(name) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u8(name: &str, default: u8) -> u8 {
    env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub app_requests_timeout: u64,
    pub debug_level: u8,

    pub auth_method: String,
    pub auth_method_apikey_header_name: String,
    pub auth_method_jwt_header_name: String,
    pub auth_method_jwt_id_key: String,
    pub auth_method_jwt_verify_signature: bool,
    pub auth_method_jwt_jwks_uri: Option<String>,
    pub auth_method_jwt_issuer: Option<String>,
    pub auth_method_jwt_audience: Option<String>,

    pub identity_store: String,
    pub identity_store_json_filename: String,

    pub logging_client: String,
    pub logging_client_http_url: Option<String>,

    pub observability_client: String,
    pub observability_client_http_url: Option<String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            app_name: env_or("APP_NAME", "llamaxing"),
            app_requests_timeout: env_u64("APP_REQUESTS_TIMEOUT", 300),
            debug_level: env_u8("DEBUG_LEVEL", 0),

            auth_method: env_or("AUTH_METHOD", "none"),
            auth_method_apikey_header_name: env_or("AUTH_METHOD_APIKEY_HEADER_NAME", "Authorization"),
            auth_method_jwt_header_name: env_or("AUTH_METHOD_JWT_HEADER_NAME", "Authorization"),
            auth_method_jwt_id_key: env_or("AUTH_METHOD_JWT_ID_KEY", "oid"),
            auth_method_jwt_verify_signature: env_bool("AUTH_METHOD_JWT_VERIFY_SIGNATURE", false),
            auth_method_jwt_jwks_uri: env_opt("AUTH_METHOD_JWT_JWKS_URI"),
            auth_method_jwt_issuer: env_opt("AUTH_METHOD_JWT_ISSUER"),
            auth_method_jwt_audience: env_opt("AUTH_METHOD_JWT_AUDIENCE"),

            identity_store: env_or("IDENTITY_STORE", "none"),
            identity_store_json_filename: env_or("IDENTITY_STORE_JSON_FILENAME", "identities.json"),

            logging_client: env_or("LOGGING_CLIENT", "none"),
            logging_client_http_url: env_opt("LOGGING_CLIENT_HTTP_URL"),

            observability_client: env_or("OBSERVABILITY_CLIENT", "none"),
            observability_client_http_url: env_opt("OBSERVABILITY_CLIENT_HTTP_URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_settings() {
        unsafe {
            for key in [
                "APP_NAME",
                "AUTH_METHOD",
                "IDENTITY_STORE",
                "LOGGING_CLIENT",
                "OBSERVABILITY_CLIENT",
            ] {
                env::remove_var(key);
            }
        }
        let settings = Settings::from_env();
        assert_eq!(settings.app_name, "llamaxing");
        assert_eq!(settings.auth_method, "none");
        assert_eq!(settings.identity_store, "none");
        assert_eq!(settings.app_requests_timeout, 300);
        assert!(!settings.auth_method_jwt_verify_signature);
    }
}
