//! Check command implementation.
//!
//! Loads and validates the configuration without running the compiler or
//! binding a port, then prints the resolved settings.

use crate::cli::CheckArgs;
use crate::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, ElmwatchConfig};
use crate::dev::config::resolve_project_root;
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Errors
///
/// Returns errors for an invalid `--cwd`, a missing `--config` file, or a
/// configuration that fails validation.
pub async fn execute(args: CheckArgs) -> Result<()> {
    let root = resolve_project_root(args.cwd.as_deref())?;

    match args.config.as_deref() {
        Some(path) => ui::info(&format!("Checking {}", path.display())),
        None if root.join(DEFAULT_CONFIG_FILE).is_file() => {
            ui::info(&format!("Checking {}", DEFAULT_CONFIG_FILE))
        }
        None => ui::info(&format!("No {} found, using defaults", DEFAULT_CONFIG_FILE)),
    }

    let config = ElmwatchConfig::load(&root, args.config.as_deref(), &ConfigOverrides::default())?;
    config.validate(&root)?;

    let server_root = root.join(&config.server_root);
    if !server_root.is_dir() {
        ui::warning(&format!(
            "Server root does not exist yet: {}",
            server_root.display()
        ));
    }

    println!("{}", config.to_pretty_json()?);
    ui::success("Configuration is valid");

    Ok(())
}
