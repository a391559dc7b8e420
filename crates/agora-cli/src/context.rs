//! Dataset-backed execution context.

use agora_core::{AgoraConfig, PhysicalTime};
use agora_effects::{AgoraEffectSystem, Dataset, FixedClock};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration plus an effect system loaded from a dataset file.
#[derive(Debug)]
pub struct CliContext {
    /// Effective configuration
    pub config: AgoraConfig,
    /// Stores populated from the dataset
    pub effects: AgoraEffectSystem,
    data_path: PathBuf,
    unreadable: Vec<serde_json::Value>,
}

impl CliContext {
    /// Load configuration and dataset.
    ///
    /// A missing config file means defaults; a missing dataset means empty
    /// stores. `now_ms` pins the clock. Unreadable item records are set aside
    /// and written back by `persist`.
    pub async fn load(config_path: &Path, data_path: &Path, now_ms: Option<u64>) -> Result<Self> {
        let config = AgoraConfig::load(Some(config_path))
            .with_context(|| format!("loading config {}", config_path.display()))?;

        let mut dataset = if data_path.exists() {
            Dataset::load(data_path)
                .with_context(|| format!("loading dataset {}", data_path.display()))?
        } else {
            Dataset::default()
        };

        let mut effects = AgoraEffectSystem::new();
        if let Some(ms) = now_ms {
            effects = effects.with_clock(FixedClock::new(PhysicalTime::from_millis(ms)));
        }
        let unreadable = std::mem::take(&mut dataset.unreadable);
        effects.import(dataset).await;

        Ok(Self {
            config,
            effects,
            data_path: data_path.to_path_buf(),
            unreadable,
        })
    }

    /// Write the current store contents back to the dataset file.
    pub async fn persist(&self) -> Result<()> {
        let mut dataset = self
            .effects
            .export()
            .await
            .context("exporting stores")?;
        dataset.unreadable.clone_from(&self.unreadable);
        dataset
            .save(&self.data_path)
            .with_context(|| format!("writing dataset {}", self.data_path.display()))?;
        tracing::debug!(path = %self.data_path.display(), "dataset written");
        Ok(())
    }
}
