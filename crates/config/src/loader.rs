use std::{fmt::Write, path::Path, str::FromStr};

use anyhow::{Context, bail};
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;
use url::Url;

use crate::Config;

pub(crate) fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file {}", path.display()))?;

    let mut raw_config: Value = toml::from_str(&content)?;
    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate(&config)?;

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> anyhow::Result<()> {
    if let Err(e) = Url::parse(&config.llm.base_url) {
        bail!("Invalid llm.base_url '{}': {e}", config.llm.base_url);
    }

    if !config.gateway.path.starts_with('/') {
        bail!("gateway.path must start with '/', got '{}'", config.gateway.path);
    }

    for warning in warnings(config) {
        log::warn!("{warning}");
    }

    Ok(())
}

pub(crate) fn warnings(config: &Config) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.llm.has_api_key() {
        warnings.push("No llm.api_key configured, provider requests will be sent without authorization");
    }

    if config.gateway.builtin_prompt.trim().is_empty() {
        warnings.push("gateway.builtin_prompt is blank, the built-in streaming endpoint will return empty streams");
    }

    warnings
}

/// Expands `{{ env.VAR }}` templates in every string of the document.
fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut location = String::new();

                for (i, segment) in path.iter().enumerate() {
                    match segment {
                        Ok(key) if i == 0 => location.push_str(key),
                        Ok(key) => write!(location, ".{key}")?,
                        Err(index) => write!(location, "[{index}]")?,
                    }
                }

                bail!("Failed to expand dynamic string at path '{location}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
