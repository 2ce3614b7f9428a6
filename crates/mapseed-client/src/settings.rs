//! Process settings read from the environment, and the documents they
//! point at.

use std::path::{Path, PathBuf};

use mapseed_core::config::ClientConfig;
use mapseed_core::host::Viewport;
use mapseed_i18n::ResourceBundle;
use serde_json::Value;

use crate::error::AppError;

/// Path of the client configuration document (`.json`, `.yaml` or `.yml`).
pub const CONFIG_VAR: &str = "MAPSEED_CONFIG";
/// Path of the JSON resource bundle.
pub const LOCALES_VAR: &str = "MAPSEED_LOCALES";
/// Overrides `app.apiRoot`.
pub const API_ROOT_VAR: &str = "MAPSEED_API_ROOT";
/// Translation service endpoint.
pub const TRANSLATE_URL_VAR: &str = "MAPSEED_TRANSLATE_URL";
/// Initial client-side location.
pub const PATH_VAR: &str = "MAPSEED_PATH";
/// Viewport width in CSS pixels.
pub const VIEWPORT_WIDTH_VAR: &str = "MAPSEED_VIEWPORT_WIDTH";

const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 800;

/// Settings for one client run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Client configuration document.
    pub config_path: PathBuf,
    /// Resource bundle; without it every lookup misses.
    pub locales_path: Option<PathBuf>,
    /// Replacement for `app.apiRoot`.
    pub api_root: Option<String>,
    /// Translation service endpoint; without it translation is disabled.
    pub translate_url: Option<String>,
    /// Initial location.
    pub initial_path: String,
    /// Viewport width.
    pub viewport_width: u32,
    /// Viewport height.
    pub viewport_height: u32,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_lookup`].
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Setting` if `MAPSEED_CONFIG` is unset or
    /// `MAPSEED_VIEWPORT_WIDTH` is not a positive integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let config_path = get(CONFIG_VAR).map(PathBuf::from).ok_or(AppError::Setting {
            name: CONFIG_VAR,
            reason: "must be set".into(),
        })?;
        let viewport_width = match get(VIEWPORT_WIDTH_VAR) {
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(width) if width > 0 => width,
                Ok(_) => {
                    return Err(AppError::Setting {
                        name: VIEWPORT_WIDTH_VAR,
                        reason: "must be positive".into(),
                    });
                }
                Err(e) => {
                    return Err(AppError::Setting {
                        name: VIEWPORT_WIDTH_VAR,
                        reason: e.to_string(),
                    });
                }
            },
            None => DEFAULT_VIEWPORT_WIDTH,
        };

        Ok(Self {
            config_path,
            locales_path: get(LOCALES_VAR).map(PathBuf::from),
            api_root: get(API_ROOT_VAR),
            translate_url: get(TRANSLATE_URL_VAR),
            initial_path: get(PATH_VAR).unwrap_or_else(|| "/".to_owned()),
            viewport_width,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
        })
    }

    /// The initial viewport.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
        }
    }

    /// Loads and validates the client configuration, applying the API root
    /// override.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// resulting configuration is invalid.
    pub fn load_config(&self) -> Result<ClientConfig, AppError> {
        let contents = read(&self.config_path)?;
        let mut config = parse_config(&self.config_path, &contents)?;
        if let Some(api_root) = &self.api_root {
            config.app.api_root.clone_from(api_root);
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads the resource bundle, or an empty bundle when none is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a
    /// `{language: {namespace: {key: text}}}` document.
    pub fn load_locales(&self) -> Result<ResourceBundle, AppError> {
        let Some(path) = &self.locales_path else {
            return Ok(ResourceBundle::new());
        };
        let contents = read(path)?;
        let document: Value = serde_json::from_str(&contents).map_err(|source| AppError::Json {
            path: path.clone(),
            source,
        })?;
        Ok(ResourceBundle::from_json(&document)?)
    }
}

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses a configuration document, choosing YAML for `.yaml`/`.yml` paths
/// and JSON otherwise.
///
/// # Errors
///
/// Returns `AppError::Json` or `AppError::Yaml` when the document does not
/// parse.
pub fn parse_config(path: &Path, contents: &str) -> Result<ClientConfig, AppError> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(contents).map_err(|source| AppError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_json::from_str(contents).map_err(|source| AppError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
