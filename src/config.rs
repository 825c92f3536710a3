use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub web: Web,
    /// Persistence is disabled when this section is absent
    pub mongo: Option<Mongo>,
    pub auth: Option<Auth>,
    #[serde(default)]
    pub pokepedia: Pokepedia,
    #[serde(default)]
    pub fallback: Fallback,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Web {
    pub host: SocketAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mongo {
    pub url: String,
    #[serde(default = "default_database")]
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Auth {
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pokepedia {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Pokepedia {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fallback {
    #[serde(default = "default_fallback_path")]
    pub path: PathBuf,
}

impl Default for Fallback {
    fn default() -> Self {
        Self {
            path: default_fallback_path(),
        }
    }
}

fn default_database() -> String {
    "wingadex".to_string()
}

fn default_api_url() -> String {
    "https://www.pokepedia.fr/api.php".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_fallback_path() -> PathBuf {
    PathBuf::from("./data/pokedex-regional-ids.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str("[web]\nhost = \"127.0.0.1:3000\"\n").unwrap();

        assert_eq!(config.web.host, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert!(config.mongo.is_none());
        assert!(config.auth.is_none());
        assert_eq!(config.pokepedia.api_url, "https://www.pokepedia.fr/api.php");
        assert_eq!(config.pokepedia.timeout_secs, 10);
        assert_eq!(config.fallback.path, PathBuf::from("./data/pokedex-regional-ids.json"));
    }

    #[test]
    fn full_config() {
        let config: Config = toml::from_str(
            r#"
            [web]
            host = "0.0.0.0:8080"

            [mongo]
            url = "mongodb://localhost:27017"

            [auth]
            secret = "hunter2"

            [pokepedia]
            timeout_secs = 3

            [fallback]
            path = "/srv/wingadex/regional.json"
            "#,
        )
        .unwrap();

        let mongo = config.mongo.unwrap();
        assert_eq!(mongo.url, "mongodb://localhost:27017");
        assert_eq!(mongo.database, "wingadex");
        assert_eq!(config.auth.unwrap().secret, "hunter2");
        assert_eq!(config.pokepedia.timeout_secs, 3);
        assert_eq!(config.pokepedia.api_url, "https://www.pokepedia.fr/api.php");
        assert_eq!(config.fallback.path, PathBuf::from("/srv/wingadex/regional.json"));
    }
}
