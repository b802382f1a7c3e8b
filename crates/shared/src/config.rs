//! Application configuration management.

use chrono_tz::Tz;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Leave engine settings.
    #[serde(default)]
    pub leave: LeaveConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Lock-wait limit applied to balance row locks, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

/// JWT settings as read from configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Leave engine settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveConfig {
    /// Holiday region used for principals without an explicit region.
    #[serde(default = "default_region")]
    pub default_region: String,
    /// IANA timezone used to determine "today" for notice-period rules.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Role names allowed to review any leave request.
    #[serde(default = "default_elevated_roles")]
    pub elevated_roles: Vec<String>,
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            default_region: default_region(),
            timezone: default_timezone(),
            elevated_roles: default_elevated_roles(),
        }
    }
}

fn default_region() -> String {
    "default".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_elevated_roles() -> Vec<String> {
    vec!["admin".to_string(), "hr_admin".to_string()]
}

impl LeaveConfig {
    /// Parses the configured timezone, falling back to UTC for unknown names.
    #[must_use]
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or(Tz::UTC)
    }

    /// Returns true if `role` is one of the elevated reviewer roles.
    #[must_use]
    pub fn is_elevated_role(&self, role: &str) -> bool {
        self.elevated_roles
            .iter()
            .any(|r| r.eq_ignore_ascii_case(role))
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("LEAVEBOOK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("leave.elevated_roles")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_config_defaults() {
        let leave = LeaveConfig::default();
        assert_eq!(leave.default_region, "default");
        assert_eq!(leave.tz(), Tz::UTC);
        assert!(leave.is_elevated_role("admin"));
        assert!(leave.is_elevated_role("HR_ADMIN"));
        assert!(!leave.is_elevated_role("manager"));
    }

    #[test]
    fn test_unknown_timezone_falls_back_to_utc() {
        let leave = LeaveConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..LeaveConfig::default()
        };
        assert_eq!(leave.tz(), Tz::UTC);
    }

    #[test]
    fn test_known_timezone_parses() {
        let leave = LeaveConfig {
            timezone: "Europe/Berlin".to_string(),
            ..LeaveConfig::default()
        };
        assert_eq!(leave.tz(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("LEAVEBOOK__DATABASE__URL", Some("postgres://localhost/leave")),
                ("LEAVEBOOK__DATABASE__LOCK_TIMEOUT_MS", Some("250")),
                ("LEAVEBOOK__JWT__SECRET", Some("secret")),
                ("LEAVEBOOK__LEAVE__DEFAULT_REGION", Some("de-be")),
                ("LEAVEBOOK__LEAVE__ELEVATED_ROLES", Some("admin,payroll")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/leave");
                assert_eq!(config.database.lock_timeout_ms, 250);
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.leave.default_region, "de-be");
                assert_eq!(config.leave.elevated_roles, vec!["admin", "payroll"]);
            },
        );
    }
}
