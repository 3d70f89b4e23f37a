use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::config::themes::ThemeRegistry;

pub mod themes;

const APP_DOMAIN: &str = "io";
const APP_ORG: &str = "Calnote";
const APP_NAME: &str = "calnote";

pub struct ConfigLoader {
    paths: ConfigPaths,
}

impl ConfigLoader {
    pub fn discover() -> Result<Self> {
        let paths = ConfigPaths::discover()?;
        Ok(Self { paths })
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn load_or_init(&self) -> Result<AppConfig> {
        self.paths.ensure_directories()?;
        if !self.paths.config_file.exists() {
            let mut default_cfg = AppConfig::default();
            default_cfg.post_load(&self.paths)?;
            self.write_default_config(&default_cfg)?;
            return Ok(default_cfg);
        }

        self.load()
    }

    pub fn load(&self) -> Result<AppConfig> {
        let raw = fs::read_to_string(&self.paths.config_file)
            .with_context(|| format!("reading config {}", self.paths.config_file.display()))?;
        let mut cfg: AppConfig = toml::from_str(&raw).context("parsing config toml")?;
        cfg.post_load(&self.paths)?;
        Ok(cfg)
    }

    fn write_default_config(&self, cfg: &AppConfig) -> Result<()> {
        let toml = toml::to_string_pretty(cfg).context("serializing default config")?;
        if let Some(parent) = self.paths.config_file.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let mut file = fs::File::create(&self.paths.config_file)
            .with_context(|| format!("creating config {}", self.paths.config_file.display()))?;
        file.write_all(toml.as_bytes())
            .context("writing default config")?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub data_dir: PathBuf,
    pub notes_path: PathBuf,
    pub state_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl ConfigPaths {
    pub fn discover() -> Result<Self> {
        let override_config = env::var("CALNOTE_CONFIG").ok().map(PathBuf::from);
        let override_data = env::var("CALNOTE_DATA").ok().map(PathBuf::from);

        let project_dirs = ProjectDirs::from(APP_DOMAIN, APP_ORG, APP_NAME)
            .context("resolving XDG project directories")?;

        let config_dir = override_config
            .clone()
            .map(|p| {
                if p.is_dir() {
                    p
                } else {
                    p.parent().map(Path::to_path_buf).unwrap_or(p)
                }
            })
            .unwrap_or_else(|| project_dirs.config_dir().to_path_buf());

        let config_file = override_config
            .filter(|p| p.is_file() || p.extension().is_some())
            .unwrap_or_else(|| config_dir.join("config.toml"));

        let data_root = override_data.unwrap_or_else(|| project_dirs.data_dir().to_path_buf());
        let notes_path = data_root.join("notes.json");

        let state_dir = project_dirs
            .state_dir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| data_root.join("state"));
        let log_dir = state_dir.join("logs");

        Ok(Self {
            config_dir,
            config_file,
            data_dir: data_root,
            notes_path,
            state_dir,
            log_dir,
        })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        for dir in [
            &self.config_dir,
            &self.data_dir,
            &self.state_dir,
            &self.log_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating application directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeName,
    /// Maximum notes rendered inside one day cell. 0 shows as many as fit;
    /// set 3 to cap busy days at three entries.
    pub cell_note_limit: usize,
    pub confirm_clear_day: bool,
    pub storage: StorageOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            cell_note_limit: 0,
            confirm_clear_day: true,
            storage: StorageOptions::default(),
        }
    }
}

impl AppConfig {
    fn post_load(&mut self, paths: &ConfigPaths) -> Result<()> {
        self.storage
            .resolve(paths)
            .context("resolving storage paths")?;
        if !ThemeRegistry::default().contains(&self.theme) {
            tracing::warn!(theme = ?self.theme, "unknown theme in config, falling back to Dark");
            self.theme = ThemeName::Dark;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageOptions {
    #[serde(skip)]
    pub notes_path: PathBuf,
    pub pretty_json: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            notes_path: PathBuf::new(),
            pretty_json: true,
        }
    }
}

impl StorageOptions {
    fn resolve(&mut self, paths: &ConfigPaths) -> Result<()> {
        if self.notes_path.as_os_str().is_empty() {
            self.notes_path = paths.notes_path.clone();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, std::hash::Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    Dark,
    Light,
    HighContrast,
}

impl Default for ThemeName {
    fn default() -> Self {
        ThemeName::Dark
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn paths_in(root: &Path) -> ConfigPaths {
        ConfigPaths {
            config_dir: root.join("config"),
            config_file: root.join("config/config.toml"),
            data_dir: root.join("data"),
            notes_path: root.join("data/notes.json"),
            state_dir: root.join("state"),
            log_dir: root.join("state/logs"),
        }
    }

    #[test]
    fn first_run_writes_a_default_config() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = paths_in(temp.path());
        let loader = ConfigLoader { paths };

        let cfg = loader.load_or_init()?;
        assert!(loader.paths().config_file.exists());
        assert_eq!(cfg.cell_note_limit, 0);
        assert!(cfg.confirm_clear_day);
        assert_eq!(cfg.storage.notes_path, loader.paths().notes_path);

        // the written file parses back to the same settings
        let reloaded = loader.load()?;
        assert_eq!(reloaded.cell_note_limit, cfg.cell_note_limit);
        Ok(())
    }

    #[test]
    fn partial_config_fills_in_defaults() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = paths_in(temp.path());
        fs::create_dir_all(&paths.config_dir)?;
        fs::write(&paths.config_file, "cell_note_limit = 3\n")?;

        let loader = ConfigLoader { paths };
        let cfg = loader.load()?;
        assert_eq!(cfg.cell_note_limit, 3);
        assert_eq!(cfg.theme, ThemeName::Dark);
        assert!(cfg.storage.pretty_json);
        Ok(())
    }

    #[test]
    fn explicit_storage_path_is_not_overwritten() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = paths_in(temp.path());
        let mut cfg = AppConfig::default();
        cfg.storage.notes_path = temp.path().join("elsewhere.json");
        cfg.post_load(&paths)?;
        assert_eq!(cfg.storage.notes_path, temp.path().join("elsewhere.json"));
        Ok(())
    }
}
