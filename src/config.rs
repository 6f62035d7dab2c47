//! Configuration types for astc-dl

use crate::error::{Error, Result};
use crate::range::DEFAULT_MAX_SPAN;
use crate::types::ServerVariant;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Remote store locations for each server variant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL for the live server; the item path is appended verbatim
    #[serde(default = "default_live_base_url")]
    pub live_base_url: String,

    /// Base URL for the advance server
    #[serde(default = "default_advance_base_url")]
    pub advance_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            live_base_url: default_live_base_url(),
            advance_base_url: default_advance_base_url(),
        }
    }
}

impl ServerConfig {
    /// Base URL for a server variant
    pub fn base_url(&self, variant: ServerVariant) -> &str {
        match variant {
            ServerVariant::Live => &self.live_base_url,
            ServerVariant::Advance => &self.advance_base_url,
        }
    }
}

/// Encoder search effort passed to the conversion tool
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityMode {
    /// `-fastest`
    Fastest,
    /// `-fast`
    #[default]
    Fast,
    /// `-medium`
    Medium,
    /// `-thorough`
    Thorough,
    /// `-exhaustive`
    Exhaustive,
}

impl QualityMode {
    /// Command-line token understood by the tool
    pub fn as_arg(&self) -> &'static str {
        match self {
            QualityMode::Fastest => "-fastest",
            QualityMode::Fast => "-fast",
            QualityMode::Medium => "-medium",
            QualityMode::Thorough => "-thorough",
            QualityMode::Exhaustive => "-exhaustive",
        }
    }
}

impl std::str::FromStr for QualityMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim_start_matches('-').to_ascii_lowercase().as_str() {
            "fastest" => Ok(QualityMode::Fastest),
            "fast" => Ok(QualityMode::Fast),
            "medium" => Ok(QualityMode::Medium),
            "thorough" => Ok(QualityMode::Thorough),
            "exhaustive" => Ok(QualityMode::Exhaustive),
            other => Err(format!("unknown quality mode: {other}")),
        }
    }
}

/// External conversion tool settings
///
/// The tool is invoked as `<binary> <decode_flag> <input> <output> <tile_size> <quality>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Path to the tool executable (auto-detected if None)
    #[serde(default)]
    pub binary_path: Option<PathBuf>,

    /// Whether to search PATH for the tool if `binary_path` is not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Binary name looked up in PATH (default: "astcenc")
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// Decode-mode flag (default: "-d")
    #[serde(default = "default_decode_flag")]
    pub decode_flag: String,

    /// Block footprint of the source textures (default: "8x8")
    #[serde(default = "default_tile_size")]
    pub tile_size: String,

    /// Search effort (default: fast)
    #[serde(default)]
    pub quality: QualityMode,

    /// Wall-clock limit per invocation (default: 8 seconds)
    #[serde(default = "default_convert_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Extension of the produced images (default: "png")
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// Parent directory for per-call scratch directories (system temp dir if None)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary_path: None,
            search_path: true,
            binary_name: default_binary_name(),
            decode_flag: default_decode_flag(),
            tile_size: default_tile_size(),
            quality: QualityMode::default(),
            timeout: default_convert_timeout(),
            output_extension: default_output_extension(),
            temp_dir: None,
        }
    }
}

impl ConverterConfig {
    /// Slower, higher quality preset: `-thorough` with a 20 second timeout
    pub fn thorough() -> Self {
        Self {
            quality: QualityMode::Thorough,
            timeout: Duration::from_secs(20),
            ..Self::default()
        }
    }
}

/// Batch behaviour
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum `end - start` of a range token (default: 100)
    #[serde(default = "default_max_range_span")]
    pub max_range_span: u64,

    /// Items fetched and converted at the same time (default: 4)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Timeout for one blob download (default: 8 seconds)
    #[serde(default = "default_fetch_timeout", with = "duration_serde")]
    pub fetch_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_range_span: DEFAULT_MAX_SPAN,
            concurrency: default_concurrency(),
            fetch_timeout: default_fetch_timeout(),
        }
    }
}

impl BatchConfig {
    /// Upper bound on identifiers processed per request
    pub fn max_items(&self) -> usize {
        usize::try_from(self.max_range_span)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
    }
}

/// Front-end credentials and access restriction
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Credential for the outbound chat transport
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Only origin allowed to issue commands (None = unrestricted)
    #[serde(default)]
    pub allowed_origin: Option<i64>,
}

impl AccessConfig {
    /// Whether a request from `origin` may reach the pipeline
    pub fn is_allowed(&self, origin: i64) -> bool {
        self.allowed_origin.is_none_or(|allowed| allowed == origin)
    }
}

impl std::fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("allowed_origin", &self.allowed_origin)
            .finish()
    }
}

/// Main configuration
///
/// Built in code, deserialized from JSON/TOML, or read from the environment with
/// [`Config::from_env`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Remote store locations
    #[serde(default)]
    pub servers: ServerConfig,

    /// Conversion tool settings
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Batch behaviour
    #[serde(default)]
    pub batch: BatchConfig,

    /// Credentials and access restriction
    #[serde(default)]
    pub access: AccessConfig,
}

impl Config {
    /// Read configuration from process environment variables
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `BOT_TOKEN` | `access.bot_token` |
    /// | `ALLOWED_GROUP_ID` | `access.allowed_origin` |
    /// | `ASTCENC_PATH` | `converter.binary_path` |
    /// | `LIVE_BASE_URL` / `ADVANCE_BASE_URL` | `servers` |
    /// | `CONVERT_TIMEOUT_SECS` | `converter.timeout` |
    /// | `CONVERT_QUALITY` | `converter.quality` |
    /// | `BATCH_CONCURRENCY` | `batch.concurrency` |
    /// | `FETCH_TIMEOUT_SECS` | `batch.fetch_timeout` |
    ///
    /// Unset variables keep their defaults. The result is validated.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::from_env`] but reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Config::default();

        config.access.bot_token = get("BOT_TOKEN");
        if let Some(v) = get("ALLOWED_GROUP_ID") {
            config.access.allowed_origin = Some(parse_value("ALLOWED_GROUP_ID", &v)?);
        }
        if let Some(v) = get("ASTCENC_PATH") {
            config.converter.binary_path = Some(PathBuf::from(v));
        }
        if let Some(v) = get("LIVE_BASE_URL") {
            config.servers.live_base_url = v;
        }
        if let Some(v) = get("ADVANCE_BASE_URL") {
            config.servers.advance_base_url = v;
        }
        if let Some(v) = get("CONVERT_TIMEOUT_SECS") {
            config.converter.timeout =
                Duration::from_secs(parse_value("CONVERT_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = get("CONVERT_QUALITY") {
            config.converter.quality = parse_value("CONVERT_QUALITY", &v)?;
        }
        if let Some(v) = get("BATCH_CONCURRENCY") {
            config.batch.concurrency = parse_value("BATCH_CONCURRENCY", &v)?;
        }
        if let Some(v) = get("FETCH_TIMEOUT_SECS") {
            config.batch.fetch_timeout =
                Duration::from_secs(parse_value("FETCH_TIMEOUT_SECS", &v)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        validate_base_url("live_base_url", &self.servers.live_base_url)?;
        validate_base_url("advance_base_url", &self.servers.advance_base_url)?;

        if self.batch.concurrency == 0 {
            return Err(Error::config("concurrency", "must be at least 1"));
        }
        if self.batch.max_range_span == 0 {
            return Err(Error::config("max_range_span", "must be at least 1"));
        }
        if self.batch.fetch_timeout.is_zero() {
            return Err(Error::config("fetch_timeout", "must be non-zero"));
        }
        if self.converter.timeout.is_zero() {
            return Err(Error::config("timeout", "must be non-zero"));
        }
        if self.converter.output_extension.is_empty() {
            return Err(Error::config("output_extension", "must not be empty"));
        }
        Ok(())
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::config(key, format!("invalid value {value:?}: {e}")))
}

fn validate_base_url(key: &str, value: &str) -> Result<()> {
    let url = url::Url::parse(value).map_err(|e| Error::config(key, format!("{e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(Error::config(key, format!("unsupported scheme {scheme}"))),
    }
}

fn default_live_base_url() -> String {
    "https://dl.dir.freefiremobile.com/live/ABHotUpdates/IconCDN/android/".to_string()
}

fn default_advance_base_url() -> String {
    "https://dl.dir.freefiremobile.com/advance/ABHotUpdates/IconCDN/android/".to_string()
}

fn default_true() -> bool {
    true
}

fn default_binary_name() -> String {
    "astcenc".to_string()
}

fn default_decode_flag() -> String {
    "-d".to_string()
}

fn default_tile_size() -> String {
    "8x8".to_string()
}

fn default_output_extension() -> String {
    "png".to_string()
}

fn default_convert_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(8)
}

fn default_max_range_span() -> u64 {
    DEFAULT_MAX_SPAN
}

fn default_concurrency() -> usize {
    4
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_fast_variant() {
        let config = Config::default();
        assert_eq!(config.converter.timeout, Duration::from_secs(8));
        assert_eq!(config.converter.quality, QualityMode::Fast);
        assert_eq!(config.converter.tile_size, "8x8");
        assert_eq!(config.converter.decode_flag, "-d");
        assert_eq!(config.batch.max_range_span, 100);
        assert_eq!(config.batch.max_items(), 101);
        assert!(config.access.allowed_origin.is_none());
        config.validate().unwrap();
    }

    #[test]
    fn test_thorough_preset_raises_timeout_and_quality() {
        let converter = ConverterConfig::thorough();
        assert_eq!(converter.timeout, Duration::from_secs(20));
        assert_eq!(converter.quality.as_arg(), "-thorough");
        assert_eq!(converter.tile_size, "8x8");
    }

    #[test]
    fn test_base_url_selects_variant() {
        let servers = ServerConfig::default();
        assert!(servers.base_url(ServerVariant::Live).contains("/live/"));
        assert!(servers.base_url(ServerVariant::Advance).contains("/advance/"));
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let config = Config::from_lookup(lookup(&[
            ("BOT_TOKEN", "123:abc"),
            ("ALLOWED_GROUP_ID", "-1002699301861"),
            ("ASTCENC_PATH", "/opt/astcenc"),
            ("LIVE_BASE_URL", "http://localhost:1/live/"),
            ("ADVANCE_BASE_URL", "http://localhost:1/adv/"),
            ("CONVERT_TIMEOUT_SECS", "15"),
            ("CONVERT_QUALITY", "thorough"),
            ("BATCH_CONCURRENCY", "8"),
            ("FETCH_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();

        assert_eq!(config.access.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.access.allowed_origin, Some(-1002699301861));
        assert_eq!(
            config.converter.binary_path,
            Some(PathBuf::from("/opt/astcenc"))
        );
        assert_eq!(config.servers.live_base_url, "http://localhost:1/live/");
        assert_eq!(config.servers.advance_base_url, "http://localhost:1/adv/");
        assert_eq!(config.converter.timeout, Duration::from_secs(15));
        assert_eq!(config.converter.quality, QualityMode::Thorough);
        assert_eq!(config.batch.concurrency, 8);
        assert_eq!(config.batch.fetch_timeout, Duration::from_secs(12));
    }

    #[test]
    fn test_from_lookup_with_nothing_set_uses_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_from_lookup_treats_blank_values_as_unset() {
        let config = Config::from_lookup(lookup(&[("ALLOWED_GROUP_ID", "  ")])).unwrap();
        assert!(config.access.allowed_origin.is_none());
    }

    #[test]
    fn test_from_lookup_reports_offending_key() {
        let err = Config::from_lookup(lookup(&[("ALLOWED_GROUP_ID", "group")])).unwrap_err();
        match err {
            Error::Config { key, .. } => assert_eq!(key.as_deref(), Some("ALLOWED_GROUP_ID")),
            other => panic!("expected Config error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_urls_and_zero_values() {
        let mut config = Config::default();
        config.servers.live_base_url = "ftp://example.com/".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.servers.advance_base_url = "not a url".into();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.batch.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.converter.timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_access_check_without_restriction_allows_everyone() {
        let open = AccessConfig::default();
        assert!(open.is_allowed(1));
        assert!(open.is_allowed(-42));

        let closed = AccessConfig {
            bot_token: None,
            allowed_origin: Some(-42),
        };
        assert!(closed.is_allowed(-42));
        assert!(!closed.is_allowed(1));
    }

    #[test]
    fn test_access_debug_redacts_token() {
        let access = AccessConfig {
            bot_token: Some("secret-token".into()),
            allowed_origin: None,
        };
        let debug = format!("{access:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_survives_json_round_trip() {
        let mut config = Config::default();
        config.converter = ConverterConfig::thorough();
        config.access.allowed_origin = Some(7);

        let json = serde_json::to_string(&config).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"converter": {"quality": "medium", "timeout": 12}}"#)
                .unwrap();
        assert_eq!(config.converter.quality, QualityMode::Medium);
        assert_eq!(config.converter.timeout, Duration::from_secs(12));
        assert_eq!(config.converter.binary_name, "astcenc");
        assert_eq!(config.batch.concurrency, 4);
    }
}
