use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub fn config_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("rift")
        .join("taskbar.toml")
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("taskbar height must be a finite, non-negative length (got {0})")]
    InvalidHeight(f64),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub settings: Settings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub taskbar: TaskbarSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpacesToShow {
    /// Only windows on a space that is visible on the panel's display.
    #[default]
    Visible,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ShowWindows {
    #[default]
    Show,
    Hide,
}

impl ShowWindows {
    pub fn hides(self) -> bool { self == ShowWindows::Hide }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskbarSettings {
    pub enabled: bool,
    pub spaces_to_show: SpacesToShow,
    pub show_minimized_windows: ShowWindows,
    pub show_hidden_windows: ShowWindows,
    pub show_fullscreen_windows: ShowWindows,
    /// Height of the taskbar band in points.
    pub height: f64,
}

impl Default for TaskbarSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            spaces_to_show: SpacesToShow::default(),
            show_minimized_windows: ShowWindows::Show,
            show_hidden_windows: ShowWindows::Show,
            show_fullscreen_windows: ShowWindows::Show,
            height: 40.0,
        }
    }
}

impl TaskbarSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.height.is_finite() || self.height < 0.0 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        Ok(())
    }
}

impl Config {
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let buf = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> Result<Config, ConfigError> {
        let config: Config = toml::from_str(buf)?;
        config.settings.taskbar.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> { toml::to_string(self) }
}
