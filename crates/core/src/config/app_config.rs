use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::action::domain::action_descriptor::{ActionDescriptor, ActionKind, ActionTable};
use crate::config::settings::Settings;
use crate::shared::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_EYEBROW_URL, DEFAULT_MUSIC_FILE,
    DEFAULT_SMILE_URL, EYEBROW_RAISE, SMILE, WINK,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// On-disk layout. Both sections are optional.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    expressions: Option<BTreeMap<String, RawExpression>>,
    settings: Settings,
}

#[derive(Deserialize)]
struct RawExpression {
    action: Option<String>,
    media_path: Option<String>,
    #[serde(default)]
    description: String,
}

/// Validated configuration, immutable after startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub settings: Settings,
    pub actions: ActionTable,
    /// File the configuration came from; `None` for built-in defaults.
    pub origin: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            actions: default_actions(),
            origin: None,
        }
    }
}

impl AppConfig {
    /// Loads an explicit path, or searches the default locations when
    /// `path` is `None`. Finding nothing in the default locations is not an
    /// error; a missing explicit path is.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if !p.exists() => Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => Self::load_file(p),
            None => Self::load_first(&Self::search_paths()),
        }
    }

    /// `./config.json`, then the per-user config directory.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        paths
    }

    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        match candidates.iter().find(|p| p.is_file()) {
            Some(path) => Self::load_file(path),
            None => {
                log::info!("No config file found, using built-in defaults");
                let config = Self::default();
                config.warn_missing_media();
                Ok(config)
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&text, path)?;
        config.origin = Some(path.to_path_buf());
        log::info!(
            "Loaded config from {} ({} actions)",
            path.display(),
            config.actions.len()
        );
        config.warn_missing_media();
        Ok(config)
    }

    /// Parses and validates config text. `origin` is only used in errors.
    pub fn from_json(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        file.settings.validate()?;

        let actions = match file.expressions {
            Some(raw) => build_actions(raw),
            None => default_actions(),
        };

        Ok(Self {
            settings: file.settings,
            actions,
            origin: None,
        })
    }

    /// Local media files named by the actions that do not exist.
    pub fn missing_media(&self) -> Vec<&Path> {
        self.actions
            .iter()
            .filter_map(|a| a.kind.local_path())
            .filter(|p| !p.is_file())
            .collect()
    }

    fn warn_missing_media(&self) {
        for path in self.missing_media() {
            log::warn!("Media file not found: {}", path.display());
        }
    }
}

/// Converts raw entries, dropping any that cannot be dispatched.
///
/// Rejected entries leave their expression inert rather than failing
/// startup.
fn build_actions(raw: BTreeMap<String, RawExpression>) -> ActionTable {
    let mut descriptors = Vec::with_capacity(raw.len());
    for (expression, entry) in raw {
        let Some(action) = entry.action.as_deref() else {
            log::warn!("Expression '{expression}' has no action; it will not trigger anything");
            continue;
        };
        let Some(media) = entry.media_path.as_deref().filter(|m| !m.trim().is_empty()) else {
            log::warn!("Expression '{expression}' has no media_path; it will not trigger anything");
            continue;
        };
        match ActionKind::from_config(action, media) {
            Some(kind) => descriptors.push(ActionDescriptor {
                expression,
                kind,
                description: entry.description,
            }),
            None => log::warn!(
                "Expression '{expression}' has unknown action '{action}' (expected one of: {}); \
                 it will not trigger anything",
                ActionKind::NAMES.join(", ")
            ),
        }
    }
    ActionTable::new(descriptors)
}

/// Actions used when the config has no `expressions` section.
pub fn default_actions() -> ActionTable {
    ActionTable::new([
        ActionDescriptor {
            expression: EYEBROW_RAISE.to_string(),
            kind: ActionKind::PlayYoutube {
                url: DEFAULT_EYEBROW_URL.to_string(),
            },
            description: "Eyebrow raise opens a YouTube video".to_string(),
        },
        ActionDescriptor {
            expression: WINK.to_string(),
            kind: ActionKind::PlayLocal {
                path: PathBuf::from(DEFAULT_MUSIC_FILE),
            },
            description: "Wink plays local music".to_string(),
        },
        ActionDescriptor {
            expression: SMILE.to_string(),
            kind: ActionKind::PlayYoutube {
                url: DEFAULT_SMILE_URL.to_string(),
            },
            description: "Smile opens a YouTube video".to_string(),
        },
    ])
}
