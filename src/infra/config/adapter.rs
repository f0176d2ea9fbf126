use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::infra::config::{load, AppConfig};

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV_VAR: &str = "CHATROOM_CONFIG";

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Loads TOML config from the flag path, then `$CHATROOM_CONFIG`, then `./config.toml`.
#[derive(Debug, Clone, Default)]
pub struct FileConfigAdapter {
    path: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn new(path: Option<&Path>) -> Self {
        Self {
            path: path
                .map(Path::to_path_buf)
                .or_else(|| env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)),
        }
    }
}

impl ConfigAdapter for FileConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(load(self.path.as_deref())?)
    }
}
