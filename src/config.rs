use anyhow::{anyhow, Result};
use config::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::database::{DatabaseConn, Properties, PropertiesTable, SchemaDefinitions};

pub struct AppDbConfig {
    /// Path to the directory holding the database file
    pub data_dir: String,

    /// File name of the database inside `data_dir`
    pub database_file: String,

    /// Properties every database file is expected to carry
    pub properties: Properties,
}

const DEFAULT_DATABASE_FILE: &str = "app.sqlite3";

const EMPTY_CONFIG: &str = r#"### appdb configuration file

### directory holding the database file
# data_dir = "~/.appdb"

### database file name inside data_dir
# database_file = "app.sqlite3"

### properties stamped into new databases and checked when opening
# [properties]
# application_name = "myapp"
# database_version = "1"
"#;

/// Shape of the configuration file and environment
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    data_dir: Option<String>,
    database_file: Option<String>,
    #[serde(default)]
    properties: Properties,
}

fn default_data_dir() -> String {
    let home_dir = dirs::home_dir()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    format!("{}/.appdb", home_dir)
}

impl Default for AppDbConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_file: DEFAULT_DATABASE_FILE.to_string(),
            properties: Properties::new(),
        }
    }
}

impl AppDbConfig {
    /// Function to create and initialize a new configuration
    pub fn new(path: &Option<String>) -> Result<AppDbConfig> {
        let mut builder = Config::builder();

        // By default use $HOME/.appdb/appdb.toml as the configuration file path
        let config_path = match path {
            Some(p) => p.clone(),
            None => {
                let home_dir = dirs::home_dir()
                    .ok_or_else(|| anyhow!("Could not find home directory"))?
                    .to_str()
                    .ok_or_else(|| anyhow!("Could not convert home directory path to string"))?
                    .to_owned();
                let appdb_dir = format!("{}/.appdb", home_dir);
                std::fs::create_dir_all(appdb_dir.as_str())
                    .map_err(|e| anyhow!("Unable to create appdb directory: {}", e))?;
                format!("{}/appdb.toml", appdb_dir)
            }
        };

        // Add in toml configuration file, writing a template if there is none
        if Path::new(config_path.as_str()).exists() {
            builder = builder.add_source(
                config::File::with_name(config_path.as_str()).format(config::FileFormat::Toml),
            );
        } else {
            std::fs::write(config_path.as_str(), EMPTY_CONFIG).map_err(|e| {
                anyhow!("Unable to create config file {}: {}", config_path.as_str(), e)
            })?;
        }

        // Add in settings from the environment (with a prefix of APPDB)
        // E.g., `APPDB_DATA_DIR=/var/lib/myapp ./appdb check` would set the data directory
        builder = builder.add_source(config::Environment::with_prefix("APPDB"));

        let settings = builder
            .build()
            .map_err(|e| anyhow!("Failed to build configuration: {}", e))?;

        let raw = settings
            .try_deserialize::<RawConfig>()
            .map_err(|e| anyhow!("Failed to deserialize configuration: {}", e))?;

        let data_dir = match raw.data_dir {
            Some(dir) => expand_home(&dir),
            None => default_data_dir(),
        };

        Ok(AppDbConfig {
            data_dir,
            database_file: raw
                .database_file
                .unwrap_or_else(|| DEFAULT_DATABASE_FILE.to_string()),
            properties: raw.properties,
        })
    }

    /// Get the path to the SQLite database file
    pub fn database_path(&self) -> String {
        let data_dir = self.data_dir.trim_end_matches('/');
        format!("{}/{}", data_dir, self.database_file)
    }

    /// Database path and expected properties for one command invocation
    ///
    /// An explicit path replaces the configured one. Each override replaces the
    /// configured property of the same key or adds a new one.
    pub fn resolve_target(
        &self,
        path: Option<PathBuf>,
        overrides: &[(String, String)],
    ) -> (PathBuf, Properties) {
        let path = path.unwrap_or_else(|| PathBuf::from(self.database_path()));

        let mut properties = self.properties.clone();
        for (key, value) in overrides {
            properties.insert(key.clone(), value.clone());
        }

        (path, properties)
    }

    /// Display configuration summary
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Data Directory:     {}", self.data_dir),
            format!("Database Path:      {}", self.database_path()),
        ];

        if self.properties.is_empty() {
            lines.push("Properties:         (none)".to_string());
        } else {
            lines.push("Properties:".to_string());
            for (key, value) in &self.properties {
                lines.push(format!("  {} = {}", key, value));
            }
        }

        lines.join("\n")
    }

    /// Get the config file path
    pub fn config_file_path() -> String {
        let home_dir = dirs::home_dir()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|| "~".to_string());
        format!("{}/.appdb/appdb.toml", home_dir)
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &str) -> String {
    match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => format!("{}{}", home.to_string_lossy(), rest),
            None => path.to_string(),
        },
        _ => path.to_string(),
    }
}

// =============================================================================
// Database file info (used by the config and check commands)
// =============================================================================

/// Information about a database file on disk
#[derive(Debug, Serialize, Clone)]
pub struct DatabaseFileInfo {
    pub path: String,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_property_count: Option<u64>,
}

/// Inspect a database file without going through a handle
///
/// The file is only opened if it exists and is never modified.
pub fn get_database_file_info(path: &str, expected: &Properties) -> DatabaseFileInfo {
    let exists = Path::new(path).exists();
    let size_bytes = if exists {
        std::fs::metadata(path).ok().map(|m| m.len())
    } else {
        None
    };

    let (valid, status, stored_property_count) = if exists {
        match DatabaseConn::open_existing(Path::new(path)) {
            Ok(db) => {
                let status = PropertiesTable::new(&db.conn).check(expected);
                let table = SchemaDefinitions::PROPERTIES_TABLE_NAME;
                let count = match db.table_exists(table) {
                    Ok(true) => db.table_count(table).ok(),
                    _ => None,
                };
                (
                    status.is_compatible(),
                    Some(status.to_string()),
                    count,
                )
            }
            Err(e) => (false, Some(e.to_string()), None),
        }
    } else {
        (false, None, None)
    };

    DatabaseFileInfo {
        path: path.to_string(),
        exists,
        size_bytes,
        valid,
        status,
        stored_property_count,
    }
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseHandle;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppDbConfig::default();
        assert_eq!(config.database_file, "app.sqlite3");
        assert!(config.data_dir.ends_with("/.appdb"));
        assert!(config.properties.is_empty());
    }

    #[test]
    fn test_paths() {
        let config = AppDbConfig {
            data_dir: "/test/dir/".to_string(),
            database_file: "ledger.sqlite3".to_string(),
            properties: Properties::new(),
        };

        assert_eq!(config.database_path(), "/test/dir/ledger.sqlite3");
    }

    #[test]
    fn test_resolve_target_overrides() {
        let mut properties = Properties::new();
        properties.insert("applicationName".to_string(), "ledger".to_string());
        properties.insert("databaseVersion".to_string(), "1".to_string());
        let config = AppDbConfig {
            data_dir: "/srv".to_string(),
            database_file: "ledger.sqlite3".to_string(),
            properties,
        };

        let (path, resolved) = config.resolve_target(None, &[]);
        assert_eq!(path, PathBuf::from("/srv/ledger.sqlite3"));
        assert_eq!(resolved, config.properties);

        let overrides = vec![
            ("databaseVersion".to_string(), "2".to_string()),
            ("owner".to_string(), String::new()),
        ];
        let (path, resolved) =
            config.resolve_target(Some(PathBuf::from("/tmp/other.sqlite3")), &overrides);
        assert_eq!(path, PathBuf::from("/tmp/other.sqlite3"));
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved["applicationName"], "ledger");
        assert_eq!(resolved["databaseVersion"], "2");
        assert_eq!(resolved["owner"], "");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("appdb.toml");
        std::fs::write(
            &path,
            r#"
data_dir = "/srv/ledger"
database_file = "ledger.sqlite3"

[properties]
application_name = "ledger"
database_version = "3"
"#,
        )
        .unwrap();

        let config = AppDbConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();

        assert_eq!(config.database_path(), "/srv/ledger/ledger.sqlite3");
        assert_eq!(
            config.properties.get("application_name"),
            Some(&"ledger".to_string())
        );
        assert_eq!(
            config.properties.get("database_version"),
            Some(&"3".to_string())
        );
    }

    #[test]
    fn test_missing_file_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("appdb.toml");

        let config = AppDbConfig::new(&Some(path.to_string_lossy().to_string())).unwrap();

        assert!(path.exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), EMPTY_CONFIG);
        assert_eq!(config.database_file, "app.sqlite3");
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), "/abs/path");
        assert_eq!(expand_home("~user/x"), "~user/x");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/data"),
                format!("{}/data", home.to_string_lossy())
            );
        }
    }

    #[test]
    fn test_summary_lists_properties() {
        let mut properties = Properties::new();
        properties.insert("applicationName".to_string(), "ledger".to_string());
        let config = AppDbConfig {
            data_dir: "/test".to_string(),
            database_file: "app.sqlite3".to_string(),
            properties,
        };

        let summary = config.summary();
        assert!(summary.contains("/test/app.sqlite3"));
        assert!(summary.contains("applicationName = ledger"));
    }

    #[test]
    fn test_database_file_info() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.sqlite3");
        let path_str = path.to_string_lossy().to_string();
        let mut properties = Properties::new();
        properties.insert("applicationName".to_string(), "ledger".to_string());

        let info = get_database_file_info(&path_str, &properties);
        assert!(!info.exists);
        assert!(!info.valid);

        let mut handle = DatabaseHandle::new(&path, properties.clone());
        handle.create_new("").unwrap();
        handle.close();

        let info = get_database_file_info(&path_str, &properties);
        assert!(info.exists);
        assert!(info.valid);
        assert_eq!(info.stored_property_count, Some(1));
        assert!(info.size_bytes.is_some());

        properties.insert("databaseVersion".to_string(), "1".to_string());
        let info = get_database_file_info(&path_str, &properties);
        assert!(!info.valid);
        assert_eq!(
            info.status.as_deref(),
            Some("stored 1 properties, expected 2")
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }
}
