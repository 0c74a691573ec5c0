use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::BackendClient;
use crate::error::BackendError;

/// A backend collection, addressed as `{COLLECTION}` and `{COLLECTION}/{id}`.
pub trait Resource: DeserializeOwned {
    const COLLECTION: &'static str;
    const LABEL: &'static str;
}

pub fn segment(raw: &str) -> String {
    urlencoding::encode(raw.trim()).into_owned()
}

pub fn item_path<R: Resource>(id: &str) -> String {
    format!("{}/{}", R::COLLECTION, segment(id))
}

/// `{COLLECTION}/{scope}/{id}`, e.g. `appointments/doctor/DOC-1`.
pub fn scoped_path<R: Resource>(scope: &str, id: &str) -> String {
    format!("{}/{}/{}", R::COLLECTION, scope, segment(id))
}

impl BackendClient {
    pub async fn list<R: Resource>(&self, auth_token: &str) -> Result<Vec<R>, BackendError> {
        self.fetch_list(R::COLLECTION, Some(auth_token)).await
    }

    pub async fn list_scoped<R: Resource>(
        &self,
        scope: &str,
        id: &str,
        auth_token: &str,
    ) -> Result<Vec<R>, BackendError> {
        self.fetch_list(&scoped_path::<R>(scope, id), Some(auth_token)).await
    }

    pub async fn get_one<R: Resource>(&self, id: &str, auth_token: &str) -> Result<R, BackendError> {
        let payload = self
            .send(Method::GET, &item_path::<R>(id), Some(auth_token), None)
            .await?
            .ok_or_else(|| BackendError::Status {
                status: 404,
                message: format!("{} {} not found", R::LABEL, id),
            })?;

        serde_json::from_value(payload)
            .map_err(|e| BackendError::Decode(format!("{} {}: {}", R::LABEL, id, e)))
    }

    /// POST to the collection. The backend's answer is passed through as-is.
    pub async fn create<R: Resource>(&self, payload: Value, auth_token: &str) -> Result<Value, BackendError> {
        self.send(Method::POST, R::COLLECTION, Some(auth_token), Some(payload))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn update<R: Resource>(
        &self,
        id: &str,
        payload: Value,
        auth_token: &str,
    ) -> Result<Value, BackendError> {
        self.send(Method::PUT, &item_path::<R>(id), Some(auth_token), Some(payload))
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn remove<R: Resource>(&self, id: &str, auth_token: &str) -> Result<(), BackendError> {
        self.send(Method::DELETE, &item_path::<R>(id), Some(auth_token), None)
            .await
            .map(|_| ())
    }
}
