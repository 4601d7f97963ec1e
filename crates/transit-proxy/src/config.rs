//! Proxy configuration, loadable from TOML.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// When disabled, transactions are left to the host's default handling.
    pub enabled: bool,
    /// Component whose frame defines the window size of its surface.
    pub root_component_name: String,
    /// Full-screen transition containers; exits inside them are not animated.
    pub screen_component_names: Vec<String>,
    /// Prop holding the identifier used to transfer an animation config.
    pub native_id_prop: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root_component_name: "RootView".to_string(),
            screen_component_names: vec!["RNSScreen".to_string()],
            native_id_prop: "nativeID".to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Loads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                log::debug!("using default proxy config: {err}");
                Self::default()
            }
        }
    }

    pub fn is_root_component(&self, component_name: &str) -> bool {
        self.root_component_name == component_name
    }

    pub fn is_screen_component(&self, component_name: &str) -> bool {
        self.screen_component_names
            .iter()
            .any(|name| name == component_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_recognizes_host_components() {
        let config = ProxyConfig::default();
        assert!(config.enabled);
        assert!(config.is_root_component("RootView"));
        assert!(config.is_screen_component("RNSScreen"));
        assert!(!config.is_screen_component("View"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ProxyConfig::from_toml_str(
            r#"
            enabled = false
            screen_component_names = ["RNSScreen", "RNSModalScreen"]
            "#,
        )
        .expect("valid config");

        assert!(!config.enabled);
        assert!(config.is_screen_component("RNSModalScreen"));
        assert_eq!(config.root_component_name, "RootView");
        assert_eq!(config.native_id_prop, "nativeID");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = ProxyConfig::from_toml_str("enabled = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = ProxyConfig::load_or_default("definitely/not/here/transit.toml");
        assert_eq!(config, ProxyConfig::default());
    }

    #[test]
    fn toml_round_trip() {
        let config = ProxyConfig::default();
        let source = toml::to_string_pretty(&config).expect("serialize");
        assert_eq!(ProxyConfig::from_toml_str(&source).expect("parse"), config);
    }
}
