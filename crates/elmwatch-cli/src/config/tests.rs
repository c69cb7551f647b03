#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_defaults_match_classic_script() {
        let config = ElmwatchConfig::default();
        assert_eq!(config.watch, vec!["src/*.elm"]);
        assert_eq!(
            config.command,
            "elm-make src/Main.elm --warn --output=public/main.js --yes"
        );
        assert_eq!(config.server_root, PathBuf::from("public"));
        assert_eq!(config.reload_files, vec!["public/*"]);
        assert_eq!(config.port, 8001);
        assert!(!config.open);
        assert!(!config.notify);
        assert!(config.history_fallback);
        assert!(config.clear_screen);
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let json_val = serde_json::to_value(ElmwatchConfig::default()).unwrap();
        assert!(json_val.get("serverRoot").is_some());
        assert!(json_val.get("reloadFiles").is_some());
        assert!(json_val.get("historyFallback").is_some());
        assert!(json_val.get("server_root").is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ElmwatchConfig = serde_json::from_str(r#"{ "port": 9000 }"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.watch, default_watch());
        assert!(config.history_fallback);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let result: Result<ElmwatchConfig, _> = serde_json::from_str(r#"{ "prot": 9000 }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_skip_unset_fields() {
        let overrides = ConfigOverrides {
            port: Some(3000),
            ..ConfigOverrides::default()
        };
        let json_val = serde_json::to_value(&overrides).unwrap();
        assert_eq!(json_val.get("port").and_then(|v| v.as_u64()), Some(3000));
        assert!(json_val.get("open").is_none());
        assert!(json_val.get("clearScreen").is_none());
    }

    #[test]
    fn test_validation() {
        let root = Path::new("/project");

        assert!(ElmwatchConfig::default().validate(root).is_ok());

        // Empty watch list fails
        assert!(ElmwatchConfig {
            watch: vec![],
            ..ElmwatchConfig::default()
        }
        .validate(root)
        .is_err());

        // Blank command fails
        assert!(ElmwatchConfig {
            command: "   ".to_string(),
            ..ElmwatchConfig::default()
        }
        .validate(root)
        .is_err());

        // Empty server root fails
        assert!(ElmwatchConfig {
            server_root: PathBuf::new(),
            ..ElmwatchConfig::default()
        }
        .validate(root)
        .is_err());

        // Malformed glob fails
        assert!(ElmwatchConfig {
            watch: vec!["src/[.elm".to_string()],
            ..ElmwatchConfig::default()
        }
        .validate(root)
        .is_err());
    }
}
