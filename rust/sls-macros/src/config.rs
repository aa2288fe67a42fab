use crate::{
    error::{MacroError, Result},
    time::parse_time_range,
};
use clap::ValueEnum;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Range preset applied when a request carries neither bounds nor a range.
    pub default_range: String,
    pub output: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_range: default_range(),
            output: OutputFormat::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_range")]
    sls_macros_default_range: String,
    #[serde(default)]
    sls_macros_output: OutputFormat,
}

fn default_range() -> String {
    "last_1h".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_raw(envy::from_env())
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::from_raw(envy::from_iter(vars))
    }

    fn from_raw(raw: std::result::Result<RawConfig, envy::Error>) -> Result<Self> {
        let raw = raw.map_err(|err| {
            MacroError::Config(format!(
                "failed to parse SLS_MACROS_* environment variables: {err}"
            ))
        })?;

        let default_range = raw.sls_macros_default_range.trim().to_string();
        parse_time_range(&default_range).map_err(|err| {
            MacroError::Config(format!("SLS_MACROS_DEFAULT_RANGE is not usable: {err}"))
        })?;

        Ok(Self {
            default_range,
            output: raw.sls_macros_output,
        })
    }
}
