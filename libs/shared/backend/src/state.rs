use std::sync::Arc;

use shared_config::AppConfig;

use crate::client::BackendClient;

/// State shared by every screen router.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let backend = BackendClient::new(&config);
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    pub fn shared(config: AppConfig) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}
