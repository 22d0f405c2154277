//! Runtime configuration store.
//!
//! Replaces the usual "mutable global + rewrite the config file wherever
//! convenient" pattern with one component owning the state: reads see a
//! consistent snapshot, updates persist to disk before they return, and
//! dependents can watch for reloads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, RwLock};

use crate::utils::errors::ApiError;

/// User-tunable trading configuration, persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub trading_pair: String,
    pub default_interval: String,
    pub default_strategy: String,
    pub position_size: f64,
    pub stop_loss_percentage: f64,
    pub take_profit_percentage: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            trading_pair: "BTC_USDT".into(),
            default_interval: "5M".into(),
            default_strategy: "ADVANCED_STRATEGY".into(),
            position_size: 0.01,
            stop_loss_percentage: 2.0,
            take_profit_percentage: 4.0,
        }
    }
}

pub struct ConfigStore {
    inner: RwLock<AppConfig>,
    path: PathBuf,
    tx: watch::Sender<AppConfig>,
}

impl ConfigStore {
    /// Load from `path`, falling back to defaults when the file does not
    /// exist yet. A corrupt file is an error, not a silent reset.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref().to_path_buf();
        let config = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(e) => return Err(ApiError::Other(format!("read {}: {e}", path.display()))),
        };
        let (tx, _) = watch::channel(config.clone());
        Ok(Self {
            inner: RwLock::new(config),
            path,
            tx,
        })
    }

    /// Snapshot of the current configuration.
    pub async fn get(&self) -> AppConfig {
        self.inner.read().await.clone()
    }

    /// Apply `mutate` and persist the result before returning. The write
    /// lock is held across the file write so no reader can observe a value
    /// that never reached disk; readers always see either the old or the
    /// new config, never a partial one.
    pub async fn update<F>(&self, mutate: F) -> Result<AppConfig, ApiError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        mutate(&mut next);
        persist(&self.path, &next).await?;
        *guard = next.clone();
        drop(guard);

        // Reload notification; nobody listening is fine.
        let _ = self.tx.send(next.clone());
        Ok(next)
    }

    /// Subscribe to configuration reloads.
    pub fn watch(&self) -> watch::Receiver<AppConfig> {
        self.tx.subscribe()
    }
}

/// Temp-file-and-rename so a crash mid-write never leaves a torn file.
async fn persist(path: &Path, config: &AppConfig) -> Result<(), ApiError> {
    let tmp = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(config)?;
    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| ApiError::Other(format!("write {}: {e}", tmp.display())))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| ApiError::Other(format!("rename {}: {e}", path.display())))?;
    Ok(())
}
