use crate::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, ENV_PREFIX, ElmwatchConfig};
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use std::path::{Path, PathBuf};

/// Environment keys (after the prefix) that map onto config fields.
const ENV_KEYS: &[&str] = &[
    "watch",
    "command",
    "server_root",
    "reload_files",
    "host",
    "port",
    "open",
    "notify",
    "history_fallback",
    "clear_screen",
];

impl ElmwatchConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    ///
    /// `config_path` must exist when given; without it `elmwatch.json` in
    /// `root` is used if present.
    pub fn load(
        root: &Path,
        config_path: Option<&Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = Self::config_file(root, config_path)? {
            tracing::debug!("loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        // ELMWATCH_PORT, ELMWATCH_SERVER_ROOT -> port, serverRoot
        // Other ELMWATCH_* variables are not ours and are skipped.
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .only(ENV_KEYS)
                .map(|key| env_key_to_field(key.as_str()).into()),
        );

        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract().map_err(|e| {
            ConfigError::InvalidValue {
                field: "configuration".to_string(),
                value: e.to_string(),
                hint: format!("Check {} syntax and field types", DEFAULT_CONFIG_FILE),
            }
            .into()
        })
    }

    fn config_file(root: &Path, config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) if path.is_file() => Ok(Some(path.to_path_buf())),
            Some(path) => Err(ConfigError::NotFound(path.to_path_buf()).into()),
            None => {
                let default_path = root.join(DEFAULT_CONFIG_FILE);
                Ok(default_path.is_file().then_some(default_path))
            }
        }
    }
}

/// `SERVER_ROOT` -> `serverRoot`
fn env_key_to_field(key: &str) -> String {
    let mut field = String::with_capacity(key.len());
    let mut upper_next = false;

    for c in key.chars() {
        if c == '_' {
            upper_next = !field.is_empty();
        } else if upper_next {
            field.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            field.push(c.to_ascii_lowercase());
        }
    }
    field
}
