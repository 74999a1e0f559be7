use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const ENV_PREFIX: &str = "BLOG_MIGRATE";

pub const DEFAULT_CSV: &str = "Pranav's Radical Site - Blog Posts.csv";
pub const DEFAULT_OUT_DIR: &str = "content";
pub const DEFAULT_EXTENSION: &str = "mdx";
pub const DEFAULT_SITEMAP_URL: &str = "https://www.mercity.ai/sitemap.xml";
pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_CONTENT_COLUMN: &str = "scraped_content";
pub const DEFAULT_USER_AGENT: &str = "webflow_migrate/0.1";

/// Runtime settings: built-in defaults overlaid with `BLOG_MIGRATE_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub csv_path: PathBuf,
    pub out_dir: PathBuf,
    pub extension: String,
    pub sitemap_url: String,
    pub delay_ms: u64,
    pub content_column: String,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix(ENV_PREFIX))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("csv_path", DEFAULT_CSV)?
            .set_default("out_dir", DEFAULT_OUT_DIR)?
            .set_default("extension", DEFAULT_EXTENSION)?
            .set_default("sitemap_url", DEFAULT_SITEMAP_URL)?
            .set_default("delay_ms", DEFAULT_DELAY_MS)?
            .set_default("content_column", DEFAULT_CONTENT_COLUMN)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .add_source(env.try_parsing(true))
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Apply CLI overrides on top of the loaded settings.
    pub fn with_overrides(
        mut self,
        csv_path: Option<PathBuf>,
        out_dir: Option<PathBuf>,
        extension: Option<String>,
    ) -> Self {
        if let Some(p) = csv_path {
            self.csv_path = p;
        }
        if let Some(d) = out_dir {
            self.out_dir = d;
        }
        if let Some(e) = extension {
            self.extension = e.trim_start_matches('.').to_string();
        }
        self
    }
}
