//! Layered configuration.
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. an optional `persona.toml` (or any path given to [`Config::load_from`])
//! 3. environment variables: `PERSONA_SERVER__PORT=8080`,
//!    `PERSONA_PEOPLE__KNOWN_IDS=1,2,3`

use std::net::SocketAddr;

use serde::Deserialize;

use crate::error::Error;
use crate::multipart::DEFAULT_MAX_TOTAL_SIZE;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub people: PeopleConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body read for any route; larger ones answer `413`.
    pub max_body_bytes: usize,
}

#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// An `EnvFilter` directive, e.g. `info` or `persona=debug`.
    pub level: String,
    /// Emit JSON lines instead of the human-readable format.
    pub json: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PeopleConfig {
    /// Ids the in-memory registry answers for.
    pub known_ids: Vec<i64>,
}

impl Config {
    /// Loads from `persona.toml` in the working directory, if present.
    pub fn load() -> Result<Self, Error> {
        Self::load_from("persona")
    }

    /// Loads from `path` (extension optional; the file may be missing).
    pub fn load_from(path: &str) -> Result<Self, Error> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000_i64)?
            .set_default("server.max_body_bytes", DEFAULT_MAX_TOTAL_SIZE as i64)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("people.known_ids", vec![0_i64, 1, 2, 3, 4])?
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("PERSONA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("people.known_ids"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| Error::Addr(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = Config::load_from("does-not-exist/persona").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.max_body_bytes, 50 * 1024 * 1024);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.people.known_ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("persona-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("persona.toml");
        std::fs::write(
            &file,
            "[server]\nhost = \"127.0.0.1\"\nport = 8081\nmax_body_bytes = 4096\n\n\
             [people]\nknown_ids = [7, 9]\n",
        )
        .unwrap();

        let config = Config::load_from(file.to_str().unwrap()).unwrap();
        assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:8081");
        assert_eq!(config.people.known_ids, vec![7, 9]);
        assert_eq!(config.server.max_body_bytes, 4096);
        assert!(!config.logging.json);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn bad_host_is_an_address_error() {
        let mut config = Config::load_from("does-not-exist/persona").unwrap();
        config.server.host = "not a host".to_owned();
        assert!(matches!(config.socket_addr(), Err(Error::Addr(_))));
    }
}
