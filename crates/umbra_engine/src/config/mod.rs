//! Configuration system
//!
//! Configuration structs implement [`Config`] to gain loading and saving in
//! TOML or RON, selected by file extension.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("ron") => Self::from_ron_str(&contents),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => self.to_toml_string()?,
            Some("ron") => self.to_ron_string()?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Parse configuration from a TOML document
    fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parse configuration from a RON document
    fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration as pretty TOML
    fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Serialize configuration as pretty RON
    fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value failed validation
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct WindowSettings {
        title: String,
        width: u32,
        vsync: bool,
    }

    impl Default for WindowSettings {
        fn default() -> Self {
            Self {
                title: "Umbra".to_string(),
                width: 1280,
                vsync: true,
            }
        }
    }

    impl Config for WindowSettings {}

    #[test]
    fn test_missing_toml_fields_use_defaults() {
        let settings = WindowSettings::from_toml_str("width = 640").expect("parse");
        assert_eq!(settings.width, 640);
        assert_eq!(settings.title, "Umbra");
        assert!(settings.vsync);
    }

    #[test]
    fn test_ron_string_parses_back() {
        let settings = WindowSettings {
            title: "Shadows".to_string(),
            width: 800,
            vsync: false,
        };
        let text = settings.to_ron_string().expect("serialize");
        assert_eq!(WindowSettings::from_ron_str(&text).expect("parse"), settings);
    }

    #[test]
    fn test_malformed_toml_is_a_parse_error() {
        let result = WindowSettings::from_toml_str("width = \"wide\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_format_follows_extension() {
        let dir = std::env::temp_dir().join(format!("umbra_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");

        let settings = WindowSettings {
            width: 1920,
            ..WindowSettings::default()
        };
        let toml_path = dir.join("window.toml");
        settings.save_to_file(&toml_path).expect("save");
        assert_eq!(WindowSettings::load_from_file(&toml_path).expect("load"), settings);

        let result = settings.save_to_file(dir.join("window.ini"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));

        let missing = WindowSettings::load_from_file(dir.join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));

        std::fs::remove_dir_all(&dir).ok();
    }
}
