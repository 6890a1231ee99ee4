use crate::inject::REQUIRED_VARIABLES;
use crate::notify::APP_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default cap on characters read from standard input.
pub const NOTIFICATION_SIZE_LIMIT: usize = 1024;

/// Top-level tasknotify configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasknotifyConfig {
    pub notification: NotificationConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// App name reported to the notification server.
    pub app_name: String,
    /// Read at most this many characters of body text from stdin.
    pub body_limit: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            body_limit: NOTIFICATION_SIZE_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Variables borrowed from other processes when missing here.
    pub variables: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variables: REQUIRED_VARIABLES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

const SYSTEM_CONFIG: &str = "/etc/tasknotify/config.toml";

/// Parse a TOML file; a missing or malformed file counts as absent.
fn read_toml(path: &Path) -> Option<toml::Value> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// `~/.config/tasknotify/config.toml`
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasknotify").join("config.toml"))
}

/// Recursively merge two TOML values. Tables are merged key-by-key;
/// all other types in `overlay` replace `base`.
fn merge_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_values(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load config from a specific path, ignoring system/user files.
fn load_from_path(path: &Path) -> TasknotifyConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            warn!("failed to parse config at {}: {}", path.display(), e);
            TasknotifyConfig::default()
        }),
        Err(e) => {
            warn!("failed to read config at {}: {}", path.display(), e);
            TasknotifyConfig::default()
        }
    }
}

/// Load the merged config: system defaults, then user overrides.
/// If `override_path` is provided, use only that file instead.
pub fn load(override_path: Option<&PathBuf>) -> TasknotifyConfig {
    if let Some(path) = override_path {
        return load_from_path(path);
    }

    let system = read_toml(Path::new(SYSTEM_CONFIG));
    let user = user_config_path().and_then(|path| read_toml(&path));

    let merged = match (system, user) {
        (Some(s), Some(u)) => Some(merge_values(s, u)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    };

    match merged {
        Some(value) => value.try_into().unwrap_or_else(|e| {
            warn!("failed to deserialize config: {}", e);
            TasknotifyConfig::default()
        }),
        None => TasknotifyConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TasknotifyConfig::default();
        assert_eq!(config.notification.app_name, "tasknotify");
        assert_eq!(config.notification.body_limit, 1024);
        assert_eq!(
            config.session.variables,
            vec!["DISPLAY", "DBUS_SESSION_BUS_ADDRESS"]
        );
    }

    #[test]
    fn test_merge_values_tables() {
        let base: toml::Value = toml::from_str(
            r#"
            [notification]
            app_name = "backup"
            body_limit = 512
            [session]
            variables = ["DISPLAY"]
        "#,
        )
        .unwrap();

        let overlay: toml::Value = toml::from_str(
            r#"
            [notification]
            body_limit = 2048
        "#,
        )
        .unwrap();

        let merged = merge_values(base, overlay);
        let table = merged.as_table().unwrap();

        // notification.body_limit overridden, app_name preserved
        let notification = table["notification"].as_table().unwrap();
        assert_eq!(notification["body_limit"].as_integer(), Some(2048));
        assert_eq!(notification["app_name"].as_str(), Some("backup"));

        let session = table["session"].as_table().unwrap();
        assert_eq!(session["variables"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_merge_values_overlay_replaces_scalar() {
        let base: toml::Value = toml::from_str("value = 1").unwrap();
        let overlay: toml::Value = toml::from_str("value = 2").unwrap();
        let merged = merge_values(base, overlay);
        assert_eq!(merged["value"].as_integer(), Some(2));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
            [session]
            variables = ["WAYLAND_DISPLAY", "DBUS_SESSION_BUS_ADDRESS"]
        "#;
        let config: TasknotifyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.variables[0], "WAYLAND_DISPLAY");
        // Defaults for everything else
        assert_eq!(config.notification.app_name, "tasknotify");
        assert_eq!(config.notification.body_limit, 1024);
    }

    #[test]
    fn test_load_from_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[notification]\napp_name = \"nightly-build\"\n").unwrap();

        let config = load(Some(&path));
        assert_eq!(config.notification.app_name, "nightly-build");
        assert_eq!(config.notification.body_limit, 1024);
    }

    #[test]
    fn test_load_invalid_file_falls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[notification\nbroken").unwrap();

        assert_eq!(load(Some(&path)), TasknotifyConfig::default());
    }

    #[test]
    fn test_read_toml_missing_or_broken() {
        let tmp = tempfile::tempdir().unwrap();
        let broken = tmp.path().join("broken.toml");
        std::fs::write(&broken, "[session\n").unwrap();

        assert!(read_toml(&tmp.path().join("absent.toml")).is_none());
        assert!(read_toml(&broken).is_none());
    }

    #[test]
    fn test_user_config_path() {
        if let Some(path) = user_config_path() {
            assert!(path.ends_with("tasknotify/config.toml"));
        }
    }

    #[test]
    fn test_load_from_nonexistent_path() {
        let config = load_from_path(Path::new("/nonexistent/config.toml"));
        // Should return defaults without panicking
        assert_eq!(config, TasknotifyConfig::default());
    }

    #[test]
    fn test_roundtrip_serialize() {
        let config = TasknotifyConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: TasknotifyConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
