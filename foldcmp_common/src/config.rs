use crate::{AppConfig, FoldCmpError};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "foldcmp.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub path: PathBuf,
    pub exists: bool,
    pub portable: bool,
}

pub fn load_config(prefer_portable: bool) -> Result<LoadedConfig, FoldCmpError> {
    let (path, portable) = resolve_config_path(prefer_portable)?;
    let mut loaded = load_config_from(&path)?;
    loaded.portable = portable;
    loaded.config.portable_mode = portable;
    Ok(loaded)
}

/// Load configuration from an explicit file, falling back to defaults when it is missing
pub fn load_config_from(path: &Path) -> Result<LoadedConfig, FoldCmpError> {
    let exists = path.exists();

    let config = if exists {
        let data = fs::read_to_string(path)?;
        toml::from_str(&data).map_err(|e| FoldCmpError::Serialization(e.to_string()))?
    } else {
        AppConfig::default()
    };

    Ok(LoadedConfig {
        config,
        path: path.to_path_buf(),
        exists,
        portable: false,
    })
}

pub fn ensure_config(prefer_portable: bool) -> Result<LoadedConfig, FoldCmpError> {
    let loaded = load_config(prefer_portable)?;
    if !loaded.exists {
        save_config(&loaded.path, &loaded.config)?;
    }
    Ok(loaded)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), FoldCmpError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let data = toml::to_string_pretty(config)
        .map_err(|e| FoldCmpError::Serialization(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

fn resolve_config_path(prefer_portable: bool) -> Result<(PathBuf, bool), FoldCmpError> {
    if let Some(portable_path) = portable_config_path() {
        if prefer_portable || portable_path.exists() {
            return Ok((portable_path, true));
        }
    }

    let dirs = ProjectDirs::from("", "foldcmp", "foldcmp")
        .ok_or_else(|| FoldCmpError::Config("Unable to determine config directory".to_string()))?;
    Ok((dirs.config_dir().join(CONFIG_FILE_NAME), false))
}

fn portable_config_path() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
}
