//! Runtime settings sourced from the process environment.
//!
//! Every field has a compiled-in default except the Gemini credential, which
//! must be supplied externally. Each variable is looked up by its exact
//! lower-case name first (`google_api_key`) and then by its upper-case alias
//! (`GOOGLE_API_KEY`). Values are validated once at load; a [`Settings`]
//! value is immutable afterwards.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::json;
use thiserror::Error;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default bind port.
pub const DEFAULT_PORT: u16 = 8000;
/// Default comma-separated CORS origin list.
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
/// Default Gemini model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
/// Default generation temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default maximum output tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;
/// Default upload limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
/// Default Gemini REST endpoint.
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default Tavily REST endpoint.
pub const DEFAULT_TAVILY_API_BASE: &str = "https://api.tavily.com";

/// Inclusive temperature bounds.
pub const TEMPERATURE_RANGE: (f32, f32) = (0.0, 2.0);
/// Inclusive max-token bounds.
pub const MAX_TOKENS_RANGE: (u32, u32) = (100, 8192);

/// Errors raised while loading [`Settings`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A required credential is absent or blank.
    #[error("{0} is not set. Export it or add it to .env")]
    MissingCredential(&'static str),

    /// A numeric field is outside its declared bounds.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Supplied value, as text.
        value: String,
        /// Lower bound.
        min: String,
        /// Upper bound.
        max: String,
    },

    /// A field could not be parsed into its type.
    #[error("invalid value for {field}: {value:?} ({reason})")]
    InvalidValue {
        /// Field name.
        field: &'static str,
        /// Raw value.
        value: String,
        /// Parser message.
        reason: String,
    },
}

/// Validated runtime configuration.
#[derive(Clone, PartialEq)]
pub struct Settings {
    /// Gemini API credential.
    pub google_api_key: String,
    /// Tavily search credential; research is disabled without it.
    pub tavily_api_key: Option<String>,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Raw comma-separated CORS origins.
    pub cors_origins: String,
    /// Gemini model identifier.
    pub gemini_model: String,
    /// Generation temperature for the chat client.
    pub temperature: f32,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Maximum upload size in bytes.
    pub max_file_size: usize,
    /// Gemini REST base URL.
    pub gemini_api_base: String,
    /// Tavily REST base URL.
    pub tavily_api_base: String,
}

impl Settings {
    /// Loads settings from the process environment.
    ///
    /// Does not read `.env` itself; the binary calls `dotenvy::dotenv()`
    /// before this.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings from a key/value map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| map.get(key).cloned())
    }

    /// Loads settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| -> Option<String> {
            let present = |key: &str| {
                lookup(key)
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
            };
            present(name).or_else(|| present(&name.to_ascii_uppercase()))
        };

        let google_api_key =
            get("google_api_key").ok_or(ConfigError::MissingCredential("google_api_key"))?;

        // Bounds are checked at f64 precision; an f32 parse rounds 2.00000001 down to 2.0.
        let raw_temperature = get("temperature");
        let wide: f64 = parse_or(
            "temperature",
            raw_temperature.clone(),
            f64::from(DEFAULT_TEMPERATURE),
        )?;
        check_range(
            "temperature",
            wide,
            (f64::from(TEMPERATURE_RANGE.0), f64::from(TEMPERATURE_RANGE.1)),
        )?;
        let temperature: f32 = parse_or("temperature", raw_temperature, DEFAULT_TEMPERATURE)?;

        let max_tokens = parse_or("max_tokens", get("max_tokens"), DEFAULT_MAX_TOKENS)?;
        check_range("max_tokens", max_tokens, MAX_TOKENS_RANGE)?;

        Ok(Self {
            google_api_key,
            tavily_api_key: get("tavily_api_key"),
            host: get("host").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("port", get("port"), DEFAULT_PORT)?,
            cors_origins: get("cors_origins").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
            gemini_model: get("gemini_model").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            temperature,
            max_tokens,
            max_file_size: parse_or("max_file_size", get("max_file_size"), DEFAULT_MAX_FILE_SIZE)?,
            gemini_api_base: get("gemini_api_base")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            tavily_api_base: get("tavily_api_base")
                .unwrap_or_else(|| DEFAULT_TAVILY_API_BASE.to_string()),
        })
    }

    /// Returns the CORS origins split on `,` with surrounding whitespace
    /// trimmed. Order is preserved and empty segments are kept.
    pub fn cors_origins_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .collect()
    }

    /// Returns `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a Tavily credential is configured.
    pub fn research_enabled(&self) -> bool {
        self.tavily_api_key.is_some()
    }

    /// Returns a JSON view with credentials replaced by presence markers.
    pub fn redacted(&self) -> serde_json::Value {
        json!({
            "google_api_key": redact(Some(&self.google_api_key)),
            "tavily_api_key": redact(self.tavily_api_key.as_deref()),
            "host": self.host,
            "port": self.port,
            "cors_origins": self.cors_origins_list(),
            "gemini_model": self.gemini_model,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
            "max_file_size": self.max_file_size,
            "gemini_api_base": self.gemini_api_base,
            "tavily_api_base": self.tavily_api_base,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("google_api_key", &redact(Some(&self.google_api_key)))
            .field("tavily_api_key", &redact(self.tavily_api_key.as_deref()))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("cors_origins", &self.cors_origins)
            .field("gemini_model", &self.gemini_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_file_size", &self.max_file_size)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("tavily_api_base", &self.tavily_api_base)
            .finish()
    }
}

fn redact(secret: Option<&str>) -> &'static str {
    match secret {
        Some(_) => "<set>",
        None => "<unset>",
    }
}

fn parse_or<T>(field: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue {
                field,
                reason: e.to_string(),
                value,
            }),
    }
}

fn check_range<T>(field: &'static str, value: T, (min, max): (T, T)) -> Result<(), ConfigError>
where
    T: PartialOrd + fmt::Display,
{
    // NaN fails both comparisons and is rejected here.
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        map.entry("google_api_key".to_string())
            .or_insert_with(|| "test-key".to_string());
        map
    }

    #[test]
    fn defaults_apply_when_only_credential_is_set() {
        let settings = Settings::from_map(&env(&[])).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.cors_origins, "http://localhost:3000");
        assert_eq!(settings.gemini_model, "gemini-2.0-flash-exp");
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.max_tokens, 2048);
        assert_eq!(settings.max_file_size, 10 * 1024 * 1024);
        assert!(settings.tavily_api_key.is_none());
        assert!(!settings.research_enabled());
    }

    #[test]
    fn missing_credential_fails_load() {
        let err = Settings::from_map(&HashMap::new()).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential("google_api_key"));
    }

    #[test]
    fn blank_credential_is_treated_as_missing() {
        let err = Settings::from_map(&env(&[("google_api_key", "   ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingCredential("google_api_key"));
    }

    #[test]
    fn upper_case_alias_is_accepted() {
        let mut map = HashMap::new();
        map.insert("GOOGLE_API_KEY".to_string(), "upper".to_string());
        map.insert("PORT".to_string(), "9000".to_string());
        let settings = Settings::from_map(&map).unwrap();
        assert_eq!(settings.google_api_key, "upper");
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn exact_name_wins_over_alias() {
        let settings = Settings::from_map(&env(&[
            ("gemini_model", "exact"),
            ("GEMINI_MODEL", "alias"),
        ]))
        .unwrap();
        assert_eq!(settings.gemini_model, "exact");
    }

    #[test]
    fn blank_exact_name_falls_back_to_alias() {
        let settings = Settings::from_map(&env(&[
            ("gemini_model", ""),
            ("GEMINI_MODEL", "alias"),
        ]))
        .unwrap();
        assert_eq!(settings.gemini_model, "alias");
    }

    #[test]
    fn blank_exact_credential_falls_back_to_alias() {
        let mut map = HashMap::new();
        map.insert("google_api_key".to_string(), "  ".to_string());
        map.insert("GOOGLE_API_KEY".to_string(), "from-env".to_string());
        let settings = Settings::from_map(&map).unwrap();
        assert_eq!(settings.google_api_key, "from-env");
    }

    #[test]
    fn temperature_above_bound_fails() {
        let err = Settings::from_map(&env(&[("temperature", "2.1")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "temperature",
                ..
            }
        ));
    }

    #[test]
    fn temperature_just_above_bound_fails() {
        let err = Settings::from_map(&env(&[("temperature", "2.00000001")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange {
                field: "temperature",
                ..
            }
        ));
    }

    #[test]
    fn tiny_negative_temperature_fails() {
        let err = Settings::from_map(&env(&[("temperature", "-1e-46")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn temperature_at_upper_bound_loads() {
        let settings = Settings::from_map(&env(&[("temperature", "2.0")])).unwrap();
        assert_eq!(settings.temperature, 2.0);
    }

    #[test]
    fn negative_temperature_fails() {
        let err = Settings::from_map(&env(&[("temperature", "-0.1")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn nan_temperature_fails() {
        let err = Settings::from_map(&env(&[("temperature", "NaN")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn max_tokens_below_bound_fails() {
        let err = Settings::from_map(&env(&[("max_tokens", "99")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::OutOfRange {
                field: "max_tokens",
                value: "99".to_string(),
                min: "100".to_string(),
                max: "8192".to_string(),
            }
        );
    }

    #[test]
    fn max_tokens_above_bound_fails() {
        let err = Settings::from_map(&env(&[("max_tokens", "8193")])).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    #[test]
    fn unparseable_port_fails() {
        let err = Settings::from_map(&env(&[("port", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "port", .. }));
    }

    #[test]
    fn cors_origins_are_trimmed_in_order() {
        let settings =
            Settings::from_map(&env(&[("cors_origins", "http://a.com, http://b.com")])).unwrap();
        assert_eq!(
            settings.cors_origins_list(),
            vec!["http://a.com".to_string(), "http://b.com".to_string()]
        );
    }

    #[test]
    fn cors_empty_segments_are_kept() {
        let settings =
            Settings::from_map(&env(&[("cors_origins", "http://a.com,,http://b.com,")])).unwrap();
        assert_eq!(
            settings.cors_origins_list(),
            vec!["http://a.com", "", "http://b.com", ""]
        );
    }

    #[test]
    fn debug_output_hides_credentials() {
        let settings = Settings::from_map(&env(&[
            ("google_api_key", "AIza-secret"),
            ("tavily_api_key", "tvly-secret"),
        ]))
        .unwrap();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("AIza-secret"));
        assert!(!debug.contains("tvly-secret"));
        assert!(debug.contains("<set>"));

        let redacted = settings.redacted().to_string();
        assert!(!redacted.contains("AIza-secret"));
        assert!(!redacted.contains("tvly-secret"));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let settings =
            Settings::from_map(&env(&[("host", "127.0.0.1"), ("port", "8080")])).unwrap();
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");
    }

    proptest! {
        #[test]
        fn valid_temperature_is_stored_exactly(t in 0.0f32..=2.0f32) {
            let settings = Settings::from_map(&env(&[("temperature", &t.to_string())])).unwrap();
            prop_assert_eq!(settings.temperature, t);
        }

        #[test]
        fn valid_max_tokens_is_stored_exactly(n in 100u32..=8192u32) {
            let settings = Settings::from_map(&env(&[("max_tokens", &n.to_string())])).unwrap();
            prop_assert_eq!(settings.max_tokens, n);
        }
    }
}
