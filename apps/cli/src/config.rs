use std::env;
use std::path::PathBuf;
use std::time::Duration;

use opj_capture_core::{AppError, AppResult};
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_SESSION_PATH: &str = ".opj-capture/session.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Runtime settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub api_base_url: String,
    pub session_path: PathBuf,
    pub http_timeout: Duration,
}

impl CliConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = non_empty(lookup("OPJ_API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let parsed = Url::parse(api_base_url.as_str()).map_err(|error| {
            AppError::Validation(format!(
                "invalid OPJ_API_BASE_URL value '{api_base_url}': {error}"
            ))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "OPJ_API_BASE_URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let session_path = non_empty(lookup("OPJ_SESSION_PATH"))
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH), PathBuf::from);

        let http_timeout_secs = parse_u64(
            "OPJ_HTTP_TIMEOUT_SECS",
            lookup("OPJ_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "OPJ_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            session_path,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_u64(name: &str, value: Option<String>, default: u64) -> AppResult<u64> {
    match non_empty(value) {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    use opj_capture_core::AppError;

    use super::CliConfig;

    fn load(values: &[(&str, &str)]) -> Result<CliConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        CliConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap_or_else(|_| unreachable!());
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.session_path, PathBuf::from(".opj-capture/session.json"));
        assert_eq!(config.http_timeout, Duration::from_secs(15));
    }

    #[test]
    fn base_url_is_trimmed() {
        let config = load(&[("OPJ_API_BASE_URL", "https://opj.example.org/ ")])
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.api_base_url, "https://opj.example.org");
    }

    #[test]
    fn invalid_values_are_validation_errors() {
        assert!(matches!(
            load(&[("OPJ_API_BASE_URL", "not a url")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("OPJ_API_BASE_URL", "ftp://files.example.org")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("OPJ_HTTP_TIMEOUT_SECS", "soon")]),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            load(&[("OPJ_HTTP_TIMEOUT_SECS", "0")]),
            Err(AppError::Validation(_))
        ));
    }
}
