//! Shared setup for commands: configuration, store and patch set.

use std::path::{Path, PathBuf};

use tdp_migrate::{PatchEngine, PatchSet, PatchStore};
use tdp_sqlite::{SqliteConfig, SqliteStore};
use tracing::debug;

use crate::cli::{Cli, PatchArgs};
use crate::config::{CONFIG_FILE_NAME, Config};
use crate::error::{CliError, CliResult};

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    config: Config,
    base_dir: PathBuf,
    database_url: Option<String>,
    config_file: Option<PathBuf>,
}

impl Context {
    /// Build the context from command-line options and the config file.
    ///
    /// An explicit `--config` must exist; the default `tdp.toml` is optional.
    pub fn from_cli(cli: &Cli) -> CliResult<Self> {
        let (config, base_dir, config_file) = match &cli.config {
            Some(path) => (Config::load(path)?, parent_dir(path), Some(path.clone())),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    (Config::load(path)?, PathBuf::new(), Some(path.to_path_buf()))
                } else {
                    (Config::default(), PathBuf::new(), None)
                }
            }
        };

        let database_url = cli
            .database
            .clone()
            .or_else(|| config.database.url.clone());

        let mut ctx = Self::new(config, base_dir, database_url);
        ctx.config_file = config_file;
        Ok(ctx)
    }

    /// Create a context from already resolved settings.
    pub fn new(config: Config, base_dir: PathBuf, database_url: Option<String>) -> Self {
        Self {
            config,
            base_dir,
            database_url,
            config_file: None,
        }
    }

    /// Config file the settings were read from, if any.
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    /// Starter configuration holding the resolved database settings.
    pub fn starter_config(&self) -> Config {
        let mut config = self.config.clone();
        config.database.url = self.database_url.clone();
        config
    }

    /// SQLite settings for the configured database.
    pub fn sqlite_config(&self) -> CliResult<SqliteConfig> {
        let url = self.database_url.as_deref().ok_or_else(|| {
            CliError::Config(
                "no database URL: pass --database, set TDP_DATABASE_URL or add [database] url to tdp.toml"
                    .to_string(),
            )
        })?;

        let mut config = SqliteConfig::from_url(url)?;
        if let Some(table) = &self.config.database.table {
            config = config.table(table.clone());
        }
        Ok(config)
    }

    /// Open the store and make sure the history table exists.
    pub async fn store(&self) -> CliResult<SqliteStore> {
        let store = SqliteStore::open(self.sqlite_config()?).await?;
        store.ensure_initialized().await?;
        Ok(store)
    }

    /// Patch sources: command-line paths, or the configured ones.
    pub fn patch_paths(&self, args: &PatchArgs) -> CliResult<Vec<PathBuf>> {
        if !args.paths.is_empty() {
            return Ok(args.paths.clone());
        }

        let paths = self.config.patch_paths(&self.base_dir);
        if paths.is_empty() {
            return Err(CliError::Config(
                "no patch paths: pass them as arguments or add [patches] paths to tdp.toml"
                    .to_string(),
            ));
        }
        Ok(paths)
    }

    /// Open the store and load the patches into an engine.
    pub async fn engine(&self, args: &PatchArgs) -> CliResult<PatchEngine<SqliteStore>> {
        let paths = self.patch_paths(args)?;
        let store = self.store().await?;
        let patches = PatchSet::from_paths(&paths).await?;
        debug!(count = patches.len(), "Loaded patches");

        Ok(PatchEngine::new(store, patches))
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
