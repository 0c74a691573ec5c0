use std::env;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: String,
    pub api_prefix: String,
    pub fallback_enabled: bool,
    pub request_timeout_secs: u64,
    pub session_secret: String,
    pub session_max_age_hours: i64,
    pub bind_addr: String,
    pub cors_origin: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            api_prefix: "/api".to_string(),
            fallback_enabled: true,
            request_timeout_secs: 10,
            session_secret: String::new(),
            session_max_age_hours: 12,
            bind_addr: "0.0.0.0:3000".to_string(),
            cors_origin: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            backend_url: env::var("HKARE_BACKEND_URL")
                .unwrap_or_else(|_| {
                    warn!("HKARE_BACKEND_URL not set, using {}", defaults.backend_url);
                    defaults.backend_url.clone()
                }),
            api_prefix: env::var("HKARE_API_PREFIX")
                .unwrap_or_else(|_| defaults.api_prefix.clone()),
            fallback_enabled: env::var("HKARE_BACKEND_FALLBACK")
                .ok()
                .map(|raw| parse_flag(&raw).unwrap_or_else(|| {
                    warn!("HKARE_BACKEND_FALLBACK has unrecognised value '{}', keeping fallback on", raw);
                    true
                }))
                .unwrap_or(defaults.fallback_enabled),
            request_timeout_secs: parse_number("HKARE_REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            session_secret: env::var("HKARE_SESSION_SECRET")
                .unwrap_or_else(|_| {
                    warn!("HKARE_SESSION_SECRET not set, every session will be rejected");
                    String::new()
                }),
            session_max_age_hours: parse_number("HKARE_SESSION_MAX_AGE_HOURS", defaults.session_max_age_hours),
            bind_addr: env::var("HKARE_BIND_ADDR")
                .unwrap_or_else(|_| defaults.bind_addr.clone()),
            cors_origin: env::var("HKARE_CORS_ORIGIN")
                .ok()
                .filter(|origin| !origin.trim().is_empty()),
        };

        if !config.is_configured() {
            warn!("Dashboard gateway not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.backend_url.is_empty() && !self.session_secret.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Base URL without a trailing slash.
    pub fn backend_base(&self) -> &str {
        self.backend_url.trim_end_matches('/')
    }
}

fn parse_number<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} is not a number ('{}'), using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
