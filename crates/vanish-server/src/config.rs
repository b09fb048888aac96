use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub plugins: PluginsSection,
    #[serde(default)]
    pub permissions: PermissionsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub name: String,
    pub max_players: u32,
    /// Milliseconds per tick. Default: 50 (20 TPS).
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

fn default_tick_millis() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct PluginsSection {
    /// Parent of each plugin's `<name>/config.json`.
    #[serde(default = "default_plugins_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub vanish: bool,
}

fn default_plugins_directory() -> String {
    "plugins".into()
}

fn default_true() -> bool {
    true
}

impl Default for PluginsSection {
    fn default() -> Self {
        Self {
            directory: default_plugins_directory(),
            vanish: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PermissionsSection {
    #[serde(default = "default_permissions_file")]
    pub file: String,
    /// Granted every permission node.
    #[serde(default)]
    pub ops: Vec<String>,
}

fn default_permissions_file() -> String {
    "permissions.json".into()
}

impl Default for PermissionsSection {
    fn default() -> Self {
        Self {
            file: default_permissions_file(),
            ops: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }
}
