//! Site configuration management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Content directory settings.
    #[serde(default)]
    pub content: ContentConfig,

    /// Default sizes of the derived views.
    #[serde(default)]
    pub views: ViewConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    pub base_url: String,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,
}

/// Content directory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Root of the content tree, relative to the configuration file.
    #[serde(default = "default_content_dir")]
    pub dir: PathBuf,

    /// Whether draft blog posts are loaded.
    #[serde(default)]
    pub drafts: bool,
}

/// Counts used when a view is requested without an explicit size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_featured_count")]
    pub featured_projects: usize,

    #[serde(default = "default_featured_count")]
    pub featured_case_studies: usize,

    #[serde(default = "default_featured_count")]
    pub recent_posts: usize,

    #[serde(default = "default_featured_count")]
    pub featured_posts: usize,

    #[serde(default = "default_services_preview")]
    pub services_preview: usize,

    /// Blog posts per listing page.
    #[serde(default = "default_posts_per_page")]
    pub posts_per_page: usize,
}

// Default value functions
fn default_content_dir() -> PathBuf {
    PathBuf::from("content")
}

fn default_featured_count() -> usize {
    2
}

fn default_services_preview() -> usize {
    3
}

fn default_posts_per_page() -> usize {
    10
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_content_dir(),
            drafts: false,
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            featured_projects: default_featured_count(),
            featured_case_studies: default_featured_count(),
            recent_posts: default_featured_count(),
            featured_posts: default_featured_count(),
            services_preview: default_services_preview(),
            posts_per_page: default_posts_per_page(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `FOLIO__` environment overrides
    /// (e.g. `FOLIO__CONTENT__DRAFTS=true`).
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.base_url.is_empty() {
            return Err(CoreError::config("site.base_url cannot be empty"));
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        if self.views.posts_per_page == 0 {
            return Err(CoreError::config("views.posts_per_page must be at least 1"));
        }

        Ok(())
    }

    /// Resolve the content directory against the directory holding the config file.
    pub fn content_dir(&self, config_path: &Path) -> PathBuf {
        if self.content.dir.is_absolute() {
            return self.content.dir.clone();
        }
        config_path
            .parent()
            .unwrap_or(Path::new(""))
            .join(&self.content.dir)
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}
