//! Command implementations.

pub mod check;
pub mod show;

use std::{path::Path, sync::Arc};

use color_eyre::eyre::{Result, WrapErr};
use folio_content::{ContentService, MemoryStore, load_dir};
use folio_core::Config;

/// A loaded site: its configuration and an accessor service over its content.
pub struct Site {
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub service: ContentService<MemoryStore>,
}

impl Site {
    /// Load the configuration at `config_path` and the content directory it names.
    pub fn open(config_path: &Path) -> Result<Self> {
        let config = Config::load_with_env(config_path)
            .wrap_err_with(|| format!("loading {}", config_path.display()))?;
        Self::from_config(config, config_path)
    }

    pub fn from_config(config: Config, config_path: &Path) -> Result<Self> {
        let dir = config.content_dir(config_path);
        let store = load_dir(&dir, &config.content)
            .wrap_err_with(|| format!("loading content from {}", dir.display()))?;
        let store = Arc::new(store);
        let service = ContentService::new(Arc::clone(&store));
        Ok(Self {
            config,
            store,
            service,
        })
    }
}
