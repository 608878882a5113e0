use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Characters of user text forwarded to the model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct SimplifierConfig {
    pub common: core_config::Config,
    pub provider: ProviderKind,
    pub gemini: GeminiSettings,
    pub simplify: SimplifySettings,
    pub cors: CorsSettings,
}

/// Which text provider backs the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown SIMPLIFIER_PROVIDER '{}', expected 'gemini' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    /// Empty when `GEMINI_API_KEY` is unset; calls then fail and are masked.
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct SimplifySettings {
    pub max_input_chars: usize,
}

#[derive(Debug, Clone)]
pub struct CorsSettings {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl SimplifierConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let api_key = get_env("GEMINI_API_KEY", Some(""), is_prod)?;
        if api_key.is_empty() {
            tracing::warn!("GEMINI_API_KEY is not set; simplify requests will report the AI service as unavailable");
        }

        Ok(SimplifierConfig {
            common: common_config,
            provider: get_env("SIMPLIFIER_PROVIDER", Some("gemini"), false)?.parse()?,
            gemini: GeminiSettings {
                api_key: Secret::new(api_key),
                model: get_env("GEMINI_MODEL", Some(DEFAULT_GEMINI_MODEL), false)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE), false)?,
                timeout_secs: positive_env("GEMINI_TIMEOUT_SECS", DEFAULT_GEMINI_TIMEOUT_SECS)?,
                temperature: optional_env("GEMINI_TEMPERATURE")?,
                max_output_tokens: optional_env("GEMINI_MAX_OUTPUT_TOKENS")?,
            },
            simplify: SimplifySettings {
                max_input_chars: positive_env("SIMPLIFY_MAX_INPUT_CHARS", DEFAULT_MAX_INPUT_CHARS)?,
            },
            cors: CorsSettings {
                allowed_origins: parse_origins(&get_env("CORS_ALLOWED_ORIGINS", Some("*"), false)?),
            },
        })
    }
}

/// Split a comma-separated origin list. `*` anywhere means any origin.
pub fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.iter().any(|o| o == "*") {
        Vec::new()
    } else {
        origins
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn optional_env<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => parse_setting(key, &val).map(Some),
        _ => Ok(None),
    }
}

fn positive_env<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
{
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => parse_positive(key, &val),
        _ => Ok(default),
    }
}

fn parse_setting<T: FromStr>(key: &str, raw: &str) -> Result<T, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}'", key, raw))
    })
}

/// Parse a setting that must be greater than zero.
fn parse_positive<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + Default,
{
    let value: T = parse_setting(key, raw)?;
    if value <= T::default() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be greater than zero, got '{}'",
            key,
            raw
        )));
    }
    Ok(value)
}
