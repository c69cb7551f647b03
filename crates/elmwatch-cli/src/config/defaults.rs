use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Config file looked up in the project root when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "elmwatch.json";

/// Prefix for environment variable overrides (`ELMWATCH_PORT`, ...).
pub const ENV_PREFIX: &str = "ELMWATCH_";

pub fn default_watch() -> Vec<String> {
    vec!["src/*.elm".to_string()]
}

pub fn default_command() -> String {
    "elm-make src/Main.elm --warn --output=public/main.js --yes".to_string()
}

pub fn default_server_root() -> PathBuf {
    PathBuf::from("public")
}

pub fn default_reload_files() -> Vec<String> {
    vec!["public/*".to_string()]
}

pub fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

pub fn default_port() -> u16 {
    8001
}

pub fn default_true() -> bool {
    true
}
