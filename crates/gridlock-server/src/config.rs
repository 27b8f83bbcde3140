use serde::Deserialize;

/// Top-level server configuration, loaded from `gridlock.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub limits: LimitsConfig,
    pub rooms: RoomsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            limits: LimitsConfig::default(),
            rooms: RoomsConfig::default(),
        }
    }
}

/// Infrastructure limits (connection caps, buffer sizes, rate limits).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_ws_connections: usize,
    pub ws_rate_limit_per_sec: f64,
    pub ws_rate_limit_burst: f64,
    pub player_message_buffer: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_ws_connections: 500,
            ws_rate_limit_per_sec: 40.0,
            ws_rate_limit_burst: 60.0,
            player_message_buffer: 256,
        }
    }
}

/// Room lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    pub idle_timeout_secs: u64,
    pub idle_check_interval_secs: u64,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 1800,
            idle_check_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &str) -> Result<Self, String> {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let config: ServerConfig = toml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse {path}: {e}"))?;
                config.validate()?;
                Ok(config)
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path, "Config file not found, using defaults");
                Ok(Self::default())
            },
            Err(e) => Err(format!("Failed to read {path}: {e}")),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("Invalid listen_addr: {}", self.listen_addr));
        }
        if self.limits.max_ws_connections == 0 {
            return Err("limits.max_ws_connections must be positive".to_string());
        }
        if self.limits.ws_rate_limit_per_sec <= 0.0 || self.limits.ws_rate_limit_burst <= 0.0 {
            return Err("WebSocket rate limit values must be positive".to_string());
        }
        if self.limits.player_message_buffer == 0 {
            return Err("limits.player_message_buffer must be positive".to_string());
        }
        if self.rooms.idle_timeout_secs == 0 || self.rooms.idle_check_interval_secs == 0 {
            return Err("Room idle timings must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            listen_addr = "127.0.0.1:9000"

            [rooms]
            idle_timeout_secs = 120
            "#,
        )
        .unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.rooms.idle_timeout_secs, 120);
        assert_eq!(config.rooms.idle_check_interval_secs, 60);
        assert_eq!(config.limits.max_ws_connections, 500);
    }

    #[test]
    fn bad_listen_addr_is_rejected() {
        let config = ServerConfig {
            listen_addr: "not-an-addr".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
