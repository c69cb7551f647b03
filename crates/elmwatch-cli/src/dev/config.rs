//! Development session configuration.
//!
//! Extends the base ElmwatchConfig with the resolved project root and the
//! socket address the server will bind.

use crate::cli::DevArgs;
use crate::config::{ConfigOverrides, ElmwatchConfig};
use crate::dev::WatchSet;
use crate::error::{CliError, ConfigError, Result, ResultExt};
use std::net::{IpAddr, SocketAddr, TcpListener};
use std::path::{Path, PathBuf};

/// How many ports above the requested one are tried before giving up.
const PORT_SEARCH_RANGE: u16 = 10;

/// Development session configuration.
#[derive(Debug, Clone)]
pub struct DevConfig {
    /// Merged file/env/CLI configuration
    pub base: ElmwatchConfig,

    /// Project root; globs, the compiler and the server root resolve against it
    pub root: PathBuf,

    /// Server socket address (IP + port actually available)
    pub addr: SocketAddr,
}

impl DevConfig {
    /// Create DevConfig from CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns error if `--cwd` is invalid, the configuration cannot be
    /// loaded or fails validation, or no port in range is free
    pub fn from_args(args: &DevArgs) -> Result<Self> {
        let root = resolve_project_root(args.cwd.as_deref())?;
        let base = ElmwatchConfig::load(&root, args.config.as_deref(), &overrides_from(args))?;
        Self::new(base, root)
    }

    /// Create DevConfig from an already loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns error if validation fails or no port in range is free
    pub fn new(base: ElmwatchConfig, root: PathBuf) -> Result<Self> {
        base.validate(&root)?;
        let addr = Self::find_available_port(base.host, base.port)?;
        Ok(Self { base, root, addr })
    }

    /// Find an available port starting from the requested port.
    ///
    /// Tries the requested port first, then the next ten. Port 0 asks the OS
    /// for any free port.
    pub fn find_available_port(host: IpAddr, requested_port: u16) -> Result<SocketAddr> {
        if requested_port != 0 && requested_port < 1024 {
            crate::ui::warning(&format!(
                "Port {} is in privileged range, may require root access",
                requested_port
            ));
        }

        if let Some(addr) = probe(host, requested_port) {
            return Ok(addr);
        }

        for offset in 1..=PORT_SEARCH_RANGE {
            let Some(port) = requested_port.checked_add(offset) else {
                break;
            };
            if let Some(addr) = probe(host, port) {
                crate::ui::warning(&format!(
                    "Port {} is busy, using port {} instead",
                    requested_port, port
                ));
                return Ok(addr);
            }
        }

        Err(ConfigError::InvalidValue {
            field: "port".to_string(),
            value: requested_port.to_string(),
            hint: format!(
                "Ports {}-{} are all in use. Try a different port with --port.",
                requested_port,
                requested_port.saturating_add(PORT_SEARCH_RANGE)
            ),
        }
        .into())
    }

    /// Absolute path of the served directory.
    pub fn server_root(&self) -> PathBuf {
        if self.base.server_root.is_absolute() {
            self.base.server_root.clone()
        } else {
            self.root.join(&self.base.server_root)
        }
    }

    /// Globs that trigger a rebuild.
    pub fn source_watch_set(&self) -> Result<WatchSet> {
        WatchSet::new(&self.root, &self.base.watch)
    }

    /// Globs that trigger a browser reload.
    pub fn reload_watch_set(&self) -> Result<WatchSet> {
        WatchSet::new(&self.root, &self.base.reload_files)
    }

    /// Get the server URL as a string.
    ///
    /// A wildcard bind address is shown as `localhost`.
    pub fn server_url(&self) -> String {
        if self.addr.ip().is_unspecified() {
            format!("http://localhost:{}", self.addr.port())
        } else {
            format!("http://{}", self.addr)
        }
    }
}

/// Bind once to check the port is free; returns the bound address.
fn probe(host: IpAddr, port: u16) -> Option<SocketAddr> {
    TcpListener::bind(SocketAddr::new(host, port))
        .and_then(|listener| listener.local_addr())
        .ok()
}

fn overrides_from(args: &DevArgs) -> ConfigOverrides {
    ConfigOverrides {
        host: args.host,
        port: args.port,
        open: args.open.then_some(true),
        clear_screen: args.no_clear.then_some(false),
        history_fallback: args.no_fallback.then_some(false),
    }
}

/// Resolve the project root from `--cwd` or the current directory.
///
/// The result is canonicalized so paths reported by the file watcher can be
/// compared against it.
pub fn resolve_project_root(explicit_cwd: Option<&Path>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Failed to read the current directory")?;

    let Some(cwd_path) = explicit_cwd else {
        return Ok(current_dir.canonicalize().unwrap_or(current_dir));
    };

    let absolute = if cwd_path.is_absolute() {
        cwd_path.to_path_buf()
    } else {
        current_dir.join(cwd_path)
    };

    if !absolute.exists() {
        return Err(CliError::InvalidArgument(format!(
            "Specified --cwd directory does not exist: {}",
            absolute.display()
        )));
    }

    if !absolute.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "Specified --cwd is not a directory: {}",
            absolute.display()
        )));
    }

    absolute.canonicalize().with_path(&absolute)
}
