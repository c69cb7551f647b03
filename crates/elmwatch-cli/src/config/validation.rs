use crate::config::ElmwatchConfig;
use crate::dev::WatchSet;
use crate::error::{ConfigError, Result};
use std::path::Path;

impl ElmwatchConfig {
    /// Validate configuration for logical consistency.
    ///
    /// `root` is the project root the globs are resolved against.
    pub fn validate(&self, root: &Path) -> Result<()> {
        if self.watch.is_empty() {
            return Err(ConfigError::MissingField {
                field: "watch".to_string(),
                hint: "Provide at least one source glob, e.g. \"src/*.elm\"".to_string(),
            }
            .into());
        }

        if self.command.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "command".to_string(),
                hint: "Provide the compiler command line to run on every change".to_string(),
            }
            .into());
        }

        if self.server_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "serverRoot".to_string(),
                hint: "Provide the directory to serve, e.g. \"public\"".to_string(),
            }
            .into());
        }

        WatchSet::new(root, &self.watch).map_err(|e| invalid_glob("watch", e))?;
        WatchSet::new(root, &self.reload_files).map_err(|e| invalid_glob("reloadFiles", e))?;

        Ok(())
    }
}

fn invalid_glob(field: &str, err: crate::error::CliError) -> crate::error::CliError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: err.to_string(),
        hint: "Globs use gitignore syntax, e.g. \"src/*.elm\" or \"src/**/*.elm\"".to_string(),
    }
    .into()
}
