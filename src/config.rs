//! Configuration file handling.
//!
//! The configuration file is stored at `$LEDGER_TREE_HOME/config.json` and holds the ledger API
//! location, the page sizes and default sort of the tree view, and where exports are written.

use crate::tree::{PageSizes, SortKey};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "ledger-tree";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPORTS: &str = "exports";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$LEDGER_TREE_HOME` and from there it loads `$LEDGER_TREE_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Option<Url>,
}

impl Config {
    /// Creates the home directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/ledger-tree`
    /// - `api_url` - The base URL of the ledger API. Without it, data can only be read from files.
    ///
    /// # Errors
    /// - Returns an error if the URL is invalid, a config file already exists, or any file
    ///   operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: Option<&str>) -> Result<Self> {
        let api_url = api_url.map(parse_api_url).transpose()?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the ledger-tree home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let config_file = ConfigFile {
            api_url: api_url.as_ref().map(Url::to_string),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    /// Validates that the home directory and its config file exist, then loads the config file.
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The ledger-tree home directory is missing, run init first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = config_file
            .api_url
            .as_deref()
            .map(parse_api_url)
            .transpose()?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The base URL of the ledger API, if one is configured.
    pub fn api_url(&self) -> Option<&Url> {
        self.api_url.as_ref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.config_file.api_token.as_deref()
    }

    pub fn page_sizes(&self) -> PageSizes {
        self.config_file.page_sizes
    }

    /// The sort key used when none is given on the command line.
    pub fn sort(&self) -> SortKey {
        self.config_file.sort
    }

    /// Returns the configured exports directory, resolving a relative path against the home
    /// directory. Defaults to `$LEDGER_TREE_HOME/exports`.
    pub fn exports_dir(&self) -> PathBuf {
        match &self.config_file.exports_dir {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => self.root.join(p),
            None => self.root.join(EXPORTS),
        }
    }
}

fn parse_api_url(s: &str) -> Result<Url> {
    let url = Url::parse(s).with_context(|| format!("Invalid API URL '{s}'"))?;
    if url.cannot_be_a_base() {
        bail!("The API URL '{s}' cannot be used as a base URL")
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "ledger-tree",
///   "config_version": 1,
///   "api_url": "https://finance.example.org/api/v1",
///   "api_token": null,
///   "page_sizes": { "mothers": 10, "children": 10, "grandchildren": 10 },
///   "sort": "value",
///   "exports_dir": null
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "ledger-tree"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the ledger API
    #[serde(default)]
    api_url: Option<String>,

    /// Bearer token sent to the ledger API
    #[serde(default)]
    api_token: Option<String>,

    #[serde(default)]
    page_sizes: PageSizes,

    #[serde(default)]
    sort: SortKey,

    /// Where exports are written (optional, relative to the home directory or absolute)
    #[serde(default)]
    exports_dir: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: None,
            api_token: None,
            page_sizes: PageSizes::default(),
            sort: SortKey::default(),
            exports_dir: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from `path`, checking that it belongs to this application.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}
