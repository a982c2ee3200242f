use crate::errors::AppError;
use crate::models::AppData;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, error};

/// Persistence seam for the application state.
#[async_trait]
pub trait Store: Send + Sync {
    /// Never fails: unreadable or corrupt data yields an empty state.
    async fn load(&self) -> AppData;
    async fn save(&self, data: &AppData) -> Result<(), AppError>;
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn load(&self) -> AppData {
        load_data(&self.path).await
    }

    async fn save(&self, data: &AppData) -> Result<(), AppError> {
        persist_data(&self.path, data).await
    }
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(data) => data,
            Err(err) => {
                error!("failed to parse data file: {err}");
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    debug!(path = %path.display(), "state persisted");
    Ok(())
}

/// Keeps the state in process memory.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<AppData>,
}

impl MemoryStore {
    pub fn new(data: AppData) -> Self {
        Self {
            data: Mutex::new(data),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn load(&self) -> AppData {
        self.data
            .lock()
            .map(|data| data.clone())
            .unwrap_or_default()
    }

    async fn save(&self, data: &AppData) -> Result<(), AppError> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| AppError::internal(std::io::Error::other("memory store poisoned")))?;
        *guard = data.clone();
        Ok(())
    }
}
