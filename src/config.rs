use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub mqtt_broker_host: String,
    pub mqtt_broker_port: u16,
    /// Base topic; the subscriber listens on `<base>/#`.
    pub mqtt_base_topic: String,
    /// MQTT keep-alive interval in seconds.
    pub mqtt_keep_alive_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    /// Maximum number of rows returned by the history endpoint.
    pub history_limit: i64,
}

impl Config {
    /// Build configuration from the environment. Every key has a default, so
    /// the service starts with no environment at all — pointing at the public
    /// test broker and a local SQLite file.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite:sensores.db"),
            mqtt_broker_host: optional("MQTT_BROKER_HOST", "broker.hivemq.com"),
            mqtt_broker_port: optional("MQTT_BROKER_PORT", "1883")
                .parse()
                .context("MQTT_BROKER_PORT must be a valid port number")?,
            mqtt_base_topic: optional("MQTT_BASE_TOPIC", "A9/Isaac/Sensores"),
            mqtt_keep_alive_secs: optional("MQTT_KEEP_ALIVE_SECS", "60")
                .parse()
                .context("MQTT_KEEP_ALIVE_SECS must be a positive integer")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            history_limit: optional("HISTORY_LIMIT", "10")
                .parse()
                .context("HISTORY_LIMIT must be a positive integer")?,
        })
    }
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var manipulation races across parallel tests, so all from_env
    // scenarios live in one test function.
    #[test]
    fn from_env_defaults_and_validation() {
        for key in [
            "DATABASE_URL",
            "MQTT_BROKER_HOST",
            "MQTT_BROKER_PORT",
            "MQTT_BASE_TOPIC",
            "MQTT_KEEP_ALIVE_SECS",
            "SERVER_HOST",
            "SERVER_PORT",
            "HISTORY_LIMIT",
        ] {
            std::env::remove_var(key);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, "sqlite:sensores.db");
        assert_eq!(config.mqtt_broker_host, "broker.hivemq.com");
        assert_eq!(config.mqtt_broker_port, 1883);
        assert_eq!(config.mqtt_base_topic, "A9/Isaac/Sensores");
        assert_eq!(config.mqtt_keep_alive_secs, 60);
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.history_limit, 10);

        std::env::set_var("SERVER_PORT", "not-a-port");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
        std::env::remove_var("SERVER_PORT");

        std::env::set_var("MQTT_BROKER_PORT", "70000");
        assert!(Config::from_env().is_err());
        std::env::remove_var("MQTT_BROKER_PORT");
    }
}
