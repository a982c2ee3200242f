use crate::config::Config;
use crate::errors::AppError;
use crate::models::AppData;
use crate::storage::Store;
use crate::vision::VisionClient;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn Store>,
    pub data: Arc<Mutex<AppData>>,
    pub http: reqwest::Client,
    pub vision: VisionClient,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, data: AppData) -> Self {
        let http = reqwest::Client::new();
        let vision = VisionClient::new(http.clone(), &config);
        Self {
            config: Arc::new(config),
            store,
            data: Arc::new(Mutex::new(data)),
            http,
            vision,
        }
    }

    /// Runs `mutate` under the data lock and persists the result before the
    /// lock is released. Nothing is saved when `mutate` fails.
    pub async fn update<T>(
        &self,
        mutate: impl FnOnce(&mut AppData) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut data = self.data.lock().await;
        let mut draft = data.clone();
        let value = mutate(&mut draft)?;
        self.store.save(&draft).await?;
        *data = draft;
        Ok(value)
    }

    pub async fn read(&self) -> MutexGuard<'_, AppData> {
        self.data.lock().await
    }
}
