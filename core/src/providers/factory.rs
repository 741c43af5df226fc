use crate::config::Config;
use crate::providers::OpenAiModel;
use crate::traits::ChatModel;
use anyhow::{Result, anyhow};
use std::sync::Arc;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Build the configured reasoning model. Environment variables win over the
/// key stored in the config file.
pub fn create_model(config: &Config) -> Result<Arc<dyn ChatModel>> {
    let provider_name = config.provider.as_deref().unwrap_or("openai");

    match provider_name.to_lowercase().as_str() {
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "VOYAGENT_OPENAI_API_KEY"],
                &config.api_key,
            )?;

            let mut model = OpenAiModel::new(api_key)
                .with_model(config.model.clone())
                .with_temperature(config.temperature);
            if let Some(base_url) = &config.base_url {
                model = model.with_base_url(base_url.clone());
            }

            Ok(Arc::new(model))
        }
        "openrouter" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENROUTER_API_KEY", "VOYAGENT_OPENROUTER_API_KEY"],
                &config.api_key,
            )?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| OPENROUTER_BASE_URL.to_string());

            Ok(Arc::new(
                OpenAiModel::new(api_key)
                    .with_model(config.model.clone())
                    .with_temperature(config.temperature)
                    .with_base_url(base_url),
            ))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available providers: openai, openrouter",
            provider_name
        )),
    }
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.is_empty()
        {
            return Ok(key);
        }
    }

    if !config_key.is_empty() {
        return Ok(config_key.to_string());
    }

    Err(anyhow!(
        "No API key found. Set {} or run 'voyagent onboard'",
        env_vars.first().unwrap_or(&"an API key")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_is_rejected() {
        let config = Config {
            provider: Some("palantir".to_string()),
            ..Default::default()
        };

        let err = create_model(&config)
            .err()
            .expect("unknown provider should be rejected");
        assert!(err.to_string().contains("Unknown provider: palantir"));
    }

    #[test]
    fn config_key_is_used_when_env_is_unset() {
        let key = resolve_api_key_with_fallback(
            &["VOYAGENT_TEST_KEY_THAT_IS_NEVER_SET"],
            "sk-from-config",
        )
        .unwrap();
        assert_eq!(key, "sk-from-config");
    }

    #[test]
    fn missing_key_everywhere_is_an_error() {
        let err =
            resolve_api_key_with_fallback(&["VOYAGENT_TEST_KEY_THAT_IS_NEVER_SET"], "").unwrap_err();
        assert!(err.to_string().contains("No API key found"));
    }
}
