use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::search_query::{Limits, MAX_NESTING_DEPTH, MAX_QUERY_TOKENS};

const CONFIG_FILE: &str = "config.yaml";

/// What to do with a query that fails to parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Report the error.
    Strict,
    /// Fall back to a plain substring search.
    #[default]
    Lenient,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub mode: MatchMode,

    /// Deepest parenthesis nesting a query may use
    #[serde(default = "max_nesting_depth")]
    pub max_nesting_depth: usize,

    /// Most tokens a query may have, implicit ANDs included
    #[serde(default = "max_query_tokens")]
    pub max_query_tokens: usize,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: MatchMode::default(),
            max_nesting_depth: MAX_NESTING_DEPTH,
            max_query_tokens: MAX_QUERY_TOKENS,
            base_path: PathBuf::new(),
        }
    }
}

fn max_nesting_depth() -> usize {
    MAX_NESTING_DEPTH
}

fn max_query_tokens() -> usize {
    MAX_QUERY_TOKENS
}

impl Config {
    fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            bail!("max_nesting_depth must be greater than 0");
        }
        if self.max_query_tokens == 0 {
            bail!("max_query_tokens must be greater than 0");
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_nesting_depth,
            max_tokens: self.max_query_tokens,
        }
    }

    /// `BQ_BASE_PATH`, else `~/.config/bq`.
    pub fn base_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("BQ_BASE_PATH") {
            return Ok(PathBuf::from(path));
        }
        let home = my_home()
            .context("could not determine home directory")?
            .context("home directory path is empty")?;
        Ok(home.join(".config").join("bq"))
    }

    pub fn load() -> Result<Self> {
        Self::load_with(Self::base_path()?)
    }

    /// Read `config.yaml` under `base_path`, writing defaults if it is missing.
    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref();
        let file = base_path.join(CONFIG_FILE);

        if !file.exists() {
            let config = Self {
                base_path: base_path.to_path_buf(),
                ..Self::default()
            };
            config.save()?;
            return Ok(config);
        }

        let config_str = std::fs::read_to_string(&file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("config is malformed: {}", file.display()))?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        log::debug!("loaded config from {}", file.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.base_path)
            .with_context(|| format!("failed to create {}", self.base_path.display()))?;

        let config_str = serde_yml::to_string(&self)?;
        let file = self.base_path.join(CONFIG_FILE);
        std::fs::write(&file, config_str)
            .with_context(|| format!("failed to write {}", file.display()))?;
        Ok(())
    }
}
