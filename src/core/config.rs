//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.chatpro/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::scroll::ScrollPolicy;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub username: Option<String>,
    pub server_url: Option<String>,
    pub ws_url: Option<String>,
    pub session_cookie: Option<String>,
    pub ui_mode: Option<UiMode>,
    pub notifications: Option<NotificationPermission>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub auto_join_delay_ms: Option<u64>,
    pub typing_idle_ms: Option<u64>,
    pub toast_ms: Option<u64>,
    pub reload_delay_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub reconnect_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LayoutConfig {
    pub narrow_width: Option<u16>,
    pub auto_scroll_rows: Option<u16>,
    pub affordance_rows: Option<u16>,
    pub messages_per_page: Option<u32>,
}

/// Which controller to run. `Auto` lets the capability probe decide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    #[default]
    Auto,
    Full,
    Minimal,
}

/// Desktop notification permission. `Prompt` asks once on load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum NotificationPermission {
    #[default]
    #[serde(rename = "prompt")]
    Prompt,
    #[serde(rename = "on", alias = "granted")]
    Granted,
    #[serde(rename = "off", alias = "denied")]
    Denied,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
pub const DEFAULT_USERNAME: &str = "User";
pub const DEFAULT_AUTO_JOIN_DELAY_MS: u64 = 1000;
pub const DEFAULT_TYPING_IDLE_MS: u64 = 2000;
pub const DEFAULT_TOAST_MS: u64 = 5000;
pub const DEFAULT_RELOAD_DELAY_MS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 2000;
pub const DEFAULT_NARROW_WIDTH: u16 = 80;
pub const DEFAULT_AUTO_SCROLL_ROWS: u16 = 2;
pub const DEFAULT_AFFORDANCE_ROWS: u16 = 4;
pub const DEFAULT_MESSAGES_PER_PAGE: u32 = 50;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Timers and thresholds the controllers consult.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub auto_join_delay: Duration,
    pub typing_idle: Duration,
    pub toast_duration: Duration,
    pub reload_delay: Duration,
    /// Viewport width at or below which the room drawer auto-closes.
    pub narrow_width: u16,
    pub messages_per_page: u32,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            auto_join_delay: Duration::from_millis(DEFAULT_AUTO_JOIN_DELAY_MS),
            typing_idle: Duration::from_millis(DEFAULT_TYPING_IDLE_MS),
            toast_duration: Duration::from_millis(DEFAULT_TOAST_MS),
            reload_delay: Duration::from_millis(DEFAULT_RELOAD_DELAY_MS),
            narrow_width: DEFAULT_NARROW_WIDTH,
            messages_per_page: DEFAULT_MESSAGES_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub username: String,
    pub server_url: String,
    pub ws_url: String,
    pub session_cookie: Option<String>,
    pub ui_mode: UiMode,
    pub notifications: NotificationPermission,
    pub request_timeout: Duration,
    pub reconnect_delay: Duration,
    pub controller: ControllerSettings,
    pub scroll: ScrollPolicy,
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub username: Option<String>,
    pub server_url: Option<String>,
    pub ui_mode: Option<UiMode>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.chatpro/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".chatpro").join("config.toml"))
}

/// Load config from `~/.chatpro/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `ChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<ChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(ChatConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(ChatConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: ChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# ChatPro Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# username = "alice"                  # Or CHATPRO_USERNAME; falls back to $USER
# server_url = "http://localhost:5000" # Or CHATPRO_SERVER_URL
# ws_url = "ws://localhost:5000/ws"    # Derived from server_url when unset
# session_cookie = "session=..."       # Or CHATPRO_SESSION_COOKIE
# ui_mode = "auto"                     # "auto", "full", "minimal"
# notifications = "prompt"             # "prompt", "on", "off"

# [timing]
# auto_join_delay_ms = 1000
# typing_idle_ms = 2000
# toast_ms = 5000
# reload_delay_ms = 1000
# request_timeout_secs = 10
# reconnect_delay_ms = 2000

# [layout]
# narrow_width = 80                   # Drawer closes on join at or below this width
# auto_scroll_rows = 2
# affordance_rows = 4
# messages_per_page = 50
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &ChatConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with(config, cli, |key| std::env::var(key).ok())
}

/// `resolve` with an explicit environment lookup.
pub fn resolve_with<E>(config: &ChatConfig, cli: &CliOverrides, env: E) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    // Username: CLI → env → config → login name → default
    let username = cli
        .username
        .clone()
        .or_else(|| env("CHATPRO_USERNAME"))
        .or_else(|| config.general.username.clone())
        .or_else(|| env("USER"))
        .or_else(|| env("USERNAME"))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    // Server URL: CLI → env → config → default
    let server_url = cli
        .server_url
        .clone()
        .or_else(|| env("CHATPRO_SERVER_URL"))
        .or_else(|| config.general.server_url.clone())
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

    // WebSocket URL: env → config → derived from server URL
    let ws_url = env("CHATPRO_WS_URL")
        .or_else(|| config.general.ws_url.clone())
        .unwrap_or_else(|| derive_ws_url(&server_url));

    let session_cookie = env("CHATPRO_SESSION_COOKIE")
        .or_else(|| config.general.session_cookie.clone());

    let timing = &config.timing;
    let layout = &config.layout;
    let millis = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));

    ResolvedConfig {
        username,
        server_url,
        ws_url,
        session_cookie,
        ui_mode: cli
            .ui_mode
            .or(config.general.ui_mode)
            .unwrap_or_default(),
        notifications: config.general.notifications.unwrap_or_default(),
        request_timeout: Duration::from_secs(
            timing
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        reconnect_delay: millis(timing.reconnect_delay_ms, DEFAULT_RECONNECT_DELAY_MS),
        controller: ControllerSettings {
            auto_join_delay: millis(timing.auto_join_delay_ms, DEFAULT_AUTO_JOIN_DELAY_MS),
            typing_idle: millis(timing.typing_idle_ms, DEFAULT_TYPING_IDLE_MS),
            toast_duration: millis(timing.toast_ms, DEFAULT_TOAST_MS),
            reload_delay: millis(timing.reload_delay_ms, DEFAULT_RELOAD_DELAY_MS),
            narrow_width: layout.narrow_width.unwrap_or(DEFAULT_NARROW_WIDTH),
            messages_per_page: layout
                .messages_per_page
                .unwrap_or(DEFAULT_MESSAGES_PER_PAGE),
        },
        scroll: ScrollPolicy {
            auto_scroll_within: layout
                .auto_scroll_rows
                .unwrap_or(DEFAULT_AUTO_SCROLL_ROWS) as u32,
            affordance_beyond: layout.affordance_rows.unwrap_or(DEFAULT_AFFORDANCE_ROWS) as u32,
        },
    }
}

/// `http://host:port` → `ws://host:port/ws`, `https` → `wss`.
pub fn derive_ws_url(server_url: &str) -> String {
    let base = server_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/ws")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&ChatConfig::default(), &CliOverrides::default(), env_of(&[]));
        assert_eq!(resolved.username, DEFAULT_USERNAME);
        assert_eq!(resolved.server_url, DEFAULT_SERVER_URL);
        assert_eq!(resolved.ws_url, "ws://localhost:5000/ws");
        assert_eq!(resolved.ui_mode, UiMode::Auto);
        assert_eq!(resolved.notifications, NotificationPermission::Prompt);
        assert_eq!(resolved.request_timeout, Duration::from_secs(10));
        assert_eq!(resolved.controller, ControllerSettings::default());
        assert_eq!(resolved.scroll.auto_scroll_within, 2);
        assert_eq!(resolved.scroll.affordance_beyond, 4);
    }

    #[test]
    fn test_username_fallback_chain() {
        let config = ChatConfig {
            general: GeneralConfig {
                username: Some("from-config".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = env_of(&[("USER", "login"), ("CHATPRO_USERNAME", "from-env")]);
        let cli = CliOverrides {
            username: Some("from-cli".to_string()),
            ..Default::default()
        };
        assert_eq!(resolve_with(&config, &cli, &env).username, "from-cli");
        assert_eq!(
            resolve_with(&config, &CliOverrides::default(), &env).username,
            "from-env"
        );
        assert_eq!(
            resolve_with(&config, &CliOverrides::default(), env_of(&[("USER", "login")])).username,
            "from-config"
        );
        assert_eq!(
            resolve_with(
                &ChatConfig::default(),
                &CliOverrides::default(),
                env_of(&[("USER", "login")])
            )
            .username,
            "login"
        );
    }

    #[test]
    fn test_blank_username_falls_back_to_default() {
        let cli = CliOverrides {
            username: Some("   ".to_string()),
            ..Default::default()
        };
        let resolved = resolve_with(&ChatConfig::default(), &cli, env_of(&[]));
        assert_eq!(resolved.username, DEFAULT_USERNAME);
    }

    #[test]
    fn test_cli_ui_mode_wins() {
        let config = ChatConfig {
            general: GeneralConfig {
                ui_mode: Some(UiMode::Full),
                ..Default::default()
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            ui_mode: Some(UiMode::Minimal),
            ..Default::default()
        };
        assert_eq!(resolve_with(&config, &cli, env_of(&[])).ui_mode, UiMode::Minimal);
    }

    #[test]
    fn test_derive_ws_url() {
        assert_eq!(derive_ws_url("http://localhost:5000/"), "ws://localhost:5000/ws");
        assert_eq!(derive_ws_url("https://chat.example.com"), "wss://chat.example.com/ws");
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
username = "alice"
server_url = "https://chat.example.com"
ui_mode = "minimal"
notifications = "on"

[timing]
typing_idle_ms = 3000
request_timeout_secs = 5

[layout]
narrow_width = 100
messages_per_page = 20
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.username.as_deref(), Some("alice"));
        assert_eq!(config.general.ui_mode, Some(UiMode::Minimal));
        assert_eq!(
            config.general.notifications,
            Some(NotificationPermission::Granted)
        );

        let resolved = resolve_with(&config, &CliOverrides::default(), env_of(&[]));
        assert_eq!(resolved.ws_url, "wss://chat.example.com/ws");
        assert_eq!(resolved.controller.typing_idle, Duration::from_secs(3));
        assert_eq!(resolved.request_timeout, Duration::from_secs(5));
        assert_eq!(resolved.controller.narrow_width, 100);
        assert_eq!(resolved.controller.messages_per_page, 20);
    }

    #[test]
    fn test_sparse_toml_parses() {
        let config: ChatConfig = toml::from_str("[layout]\nnarrow_width = 60\n").unwrap();
        assert_eq!(config.layout.narrow_width, Some(60));
        assert!(config.general.username.is_none());
        assert!(config.timing.toast_ms.is_none());
    }

    #[test]
    fn test_generated_default_parses_as_empty() {
        let config: ChatConfig = toml::from_str(DEFAULT_CONFIG_CONTENT).unwrap();
        assert!(config.general.server_url.is_none());
        assert!(config.layout.narrow_width.is_none());
    }
}
