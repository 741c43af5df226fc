use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const VOYAGENT_DIR: &str = ".voyagent";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_iterations: usize,
    pub temperature: f64,
    pub serpapi_key: Option<String>,
    pub amadeus_api_key: Option<String>,
    pub amadeus_api_secret: Option<String>,
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o".to_string(),
            max_iterations: 10,
            temperature: 0.7,
            serpapi_key: None,
            amadeus_api_key: None,
            amadeus_api_secret: None,
            data_dir: get_voyagent_dir().join("data"),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn resolve_serpapi_key(&self) -> Option<String> {
        env_or_config("SERPAPI_KEY", self.serpapi_key.as_deref())
    }

    pub fn resolve_amadeus_credentials(&self) -> Option<(String, String)> {
        let key = env_or_config("AMADEUS_API_KEY", self.amadeus_api_key.as_deref())?;
        let secret = env_or_config("AMADEUS_API_SECRET", self.amadeus_api_secret.as_deref())?;
        Some((key, secret))
    }
}

fn env_or_config(var_name: &str, config_value: Option<&str>) -> Option<String> {
    if let Ok(value) = std::env::var(var_name)
        && !value.is_empty()
    {
        return Some(value);
    }

    config_value
        .filter(|value| !value.is_empty())
        .map(|value| value.to_string())
}

pub fn get_voyagent_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(VOYAGENT_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_voyagent_dir().join("config.toml")
}

pub fn ensure_voyagent_dir() -> Result<PathBuf> {
    let voyagent_dir = get_voyagent_dir();

    if !voyagent_dir.exists() {
        std::fs::create_dir_all(&voyagent_dir).with_context(|| {
            format!(
                "Failed to create voyagent directory at {}",
                voyagent_dir.display()
            )
        })?;
    }

    Ok(voyagent_dir)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'voyagent onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.data_dir = get_voyagent_dir().join("data");

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_voyagent_dir()?;

    let config_path = get_config_path();
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();

        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.temperature, 0.7);
        assert!(config.provider.is_none());
        assert!(config.serpapi_key.is_none());
        assert!(config.data_dir.ends_with(".voyagent/data"));
    }

    #[test]
    fn toml_round_trip_preserves_fields() {
        let config = Config {
            provider: Some("openai".to_string()),
            api_key: "sk-test".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_iterations: 6,
            serpapi_key: Some("serp-test".to_string()),
            ..Default::default()
        };

        let toml_text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_text).unwrap();

        assert_eq!(parsed.provider.as_deref(), Some("openai"));
        assert_eq!(parsed.api_key, "sk-test");
        assert_eq!(parsed.model, "gpt-4o-mini");
        assert_eq!(parsed.max_iterations, 6);
        assert_eq!(parsed.serpapi_key.as_deref(), Some("serp-test"));
        assert!(parsed.amadeus_api_key.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let parsed: Config = toml::from_str(r#"api_key = "sk-partial""#).unwrap();

        assert_eq!(parsed.api_key, "sk-partial");
        assert_eq!(parsed.model, "gpt-4o");
        assert_eq!(parsed.max_iterations, 10);
    }

    #[test]
    fn config_value_is_used_when_env_is_unset() {
        assert_eq!(
            env_or_config("VOYAGENT_TEST_VAR_THAT_IS_NEVER_SET", Some("from-config")),
            Some("from-config".to_string())
        );
        assert_eq!(
            env_or_config("VOYAGENT_TEST_VAR_THAT_IS_NEVER_SET", Some("")),
            None
        );
        assert_eq!(env_or_config("VOYAGENT_TEST_VAR_THAT_IS_NEVER_SET", None), None);
    }

    #[test]
    fn amadeus_credentials_require_both_halves() {
        let config = Config {
            amadeus_api_key: Some("key-only".to_string()),
            ..Default::default()
        };
        assert!(config.resolve_amadeus_credentials().is_none());

        let config = Config {
            amadeus_api_key: Some("key".to_string()),
            amadeus_api_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.resolve_amadeus_credentials(),
            Some(("key".to_string(), "secret".to_string()))
        );
    }
}
