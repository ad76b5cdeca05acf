use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub engine: EngineConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Interval between movement ticks in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Optional topology scenario loaded into the repositories at startup.
    #[serde(default)]
    pub scenario_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_notification_timeout")]
    pub request_timeout_secs: u64,

    /// Success status a subscriber is expected to answer with.
    #[serde(default = "default_expected_status")]
    pub expected_status: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8888
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_connect_timeout() -> u64 {
    3
}
fn default_notification_timeout() -> u64 {
    27
}
fn default_expected_status() -> u16 {
    204
}

impl Config {
    /// Load configuration from `config/default`, an optional local override
    /// file and `NEF__`-prefixed environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("NEF").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.engine.tick_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                request_timeout_secs: default_request_timeout(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
            engine: EngineConfig {
                tick_interval_ms: default_tick_interval_ms(),
                scenario_file: None,
            },
            notifications: NotificationConfig {
                connect_timeout_secs: default_connect_timeout(),
                request_timeout_secs: default_notification_timeout(),
                expected_status: default_expected_status(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8888);
        assert_eq!(config.engine.tick_interval_ms, 1000);
        assert_eq!(config.notifications.expected_status, 204);
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_socket_addr() {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 9000;
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn test_deserialize_from_toml() {
        let raw = r#"
            [server]
            host = "127.0.0.1"
            port = 8081

            [logging]
            level = "debug"
            format = "pretty"

            [engine]
            tick_interval_ms = 250

            [notifications]
            expected_status = 200
        "#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.engine.tick_interval_ms, 250);
        assert_eq!(config.notifications.expected_status, 200);
        assert_eq!(config.notifications.connect_timeout_secs, 3);
    }
}
