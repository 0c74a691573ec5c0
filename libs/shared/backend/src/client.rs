use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;

use crate::error::BackendError;

/// HTTP client for the hospital REST backend.
///
/// Every call goes to `{base}{prefix}/{path}` first. Backend builds disagree
/// on whether routes live under the prefix, so an eligible failure is retried
/// once against `{base}/{path}`.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    fallback_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthProbe {
    pub reachable: bool,
    pub url: Option<String>,
    pub status: Option<Value>,
    pub error: Option<String>,
}

impl BackendClient {
    pub fn new(config: &AppConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build backend client with timeout ({}), using defaults", e);
                Client::new()
            });

        let prefix = config.api_prefix.trim().trim_matches('/');

        Self {
            client,
            base_url: config.backend_base().to_string(),
            api_prefix: if prefix.is_empty() {
                String::new()
            } else {
                format!("/{}", prefix)
            },
            fallback_enabled: config.fallback_enabled,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn primary_url(&self, path: &str) -> String {
        format!("{}{}/{}", self.base_url, self.api_prefix, path.trim_start_matches('/'))
    }

    /// `None` when there is nothing different to fall back to.
    pub fn fallback_url(&self, path: &str) -> Option<String> {
        if !self.fallback_enabled || self.api_prefix.is_empty() {
            return None;
        }
        Some(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
    }

    fn headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| BackendError::InvalidRequest("Session token contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn dispatch(
        &self,
        method: &Method,
        url: &str,
        headers: &HeaderMap,
        body: Option<&Value>,
    ) -> Result<Option<Value>, BackendError> {
        debug!("{} {}", method, url);

        let mut req = self.client.request(method.clone(), url).headers(headers.clone());

        if let Some(body_data) = body {
            req = req.json(body_data);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message(&text)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("Backend error").to_string());
            debug!("Backend error ({}) from {}: {}", status, url, message);
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(parse_body(&text))
    }

    /// Sends one request with dual-endpoint fallback and returns the payload
    /// together with the URL that produced it.
    async fn exchange(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(Option<Value>, String), BackendError> {
        let headers = self.headers(auth_token)?;
        let primary = self.primary_url(path);

        match self.dispatch(&method, &primary, &headers, body.as_ref()).await {
            Ok(payload) => Ok((payload, primary)),
            Err(err) => match self.fallback_url(path) {
                Some(fallback) if should_fall_back(&method, &err) => {
                    warn!("{} {} failed ({}), retrying {}", method, primary, err, fallback);
                    let payload = self.dispatch(&method, &fallback, &headers, body.as_ref()).await?;
                    Ok((payload, fallback))
                }
                _ => Err(err),
            },
        }
    }

    /// Raw payload of a call; `None` for an empty body.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Option<Value>, BackendError> {
        self.exchange(method, path, auth_token, body)
            .await
            .map(|(payload, _)| payload)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        auth_token: Option<&str>,
        body: Option<Value>,
    ) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let payload = self.send(method, path, auth_token, body).await?.unwrap_or(Value::Null);
        serde_json::from_value(payload).map_err(|e| BackendError::Decode(format!("{}: {}", path, e)))
    }

    /// GET a collection. A missing or non-list payload is an empty list and
    /// rows that fail to decode are skipped.
    pub async fn fetch_list<T>(&self, path: &str, auth_token: Option<&str>) -> Result<Vec<T>, BackendError>
    where
        T: DeserializeOwned,
    {
        let rows = match self.send(Method::GET, path, auth_token, None).await? {
            Some(Value::Array(rows)) => rows,
            None => {
                debug!("{} returned no body, treating as empty", path);
                return Ok(Vec::new());
            }
            Some(other) => {
                warn!("{} returned a non-list payload ({}), treating as empty", path, kind(&other));
                return Ok(Vec::new());
            }
        };

        let items = rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Skipping row from {} that failed to decode: {}", path, e);
                    None
                }
            })
            .collect();

        Ok(items)
    }

    pub async fn probe_health(&self) -> HealthProbe {
        match self.exchange(Method::GET, "health", None, None).await {
            Ok((status, url)) => HealthProbe {
                reachable: true,
                url: Some(url),
                status,
                error: None,
            },
            Err(e) => {
                warn!("Backend health probe failed: {}", e);
                HealthProbe {
                    reachable: false,
                    url: None,
                    status: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::PUT | Method::DELETE
    )
}

/// Whether a failed call may be replayed on the unprefixed route.
/// POST/PATCH are only replayed when the first request never reached the
/// backend or the route did not exist there.
pub fn should_fall_back(method: &Method, err: &BackendError) -> bool {
    let idempotent = is_idempotent(method);
    match err {
        BackendError::Transport(e) => idempotent || e.is_connect(),
        BackendError::Status { status, .. } => {
            matches!(*status, 404 | 405) || (idempotent && *status >= 500)
        }
        BackendError::Decode(_) | BackendError::InvalidRequest(_) => false,
    }
}

fn parse_body(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        // plain-text confirmations such as "Department deleted successfully"
        Err(_) => Some(Value::String(trimmed.to_string())),
    }
}

fn error_message(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|msg| !msg.is_empty())
            .map(str::to_string)
            .or_else(|| Some(trimmed.to_string())),
        Ok(Value::String(msg)) => Some(msg),
        _ => Some(trimmed.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Appends URL-encoded query parameters to a backend path.
pub fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", path, query)
}
