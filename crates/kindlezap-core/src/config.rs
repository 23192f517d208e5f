//! Configuration module
//!
//! Configuration is read once from the process environment (after loading an optional
//! `.env` file) and then handed to every component as an immutable value.

use std::env;
use std::fmt;
use std::path::PathBuf;

const SERVER_PORT: u16 = 8000;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const MAX_CONCURRENT_CONVERSIONS: usize = 2;
const CONVERSION_TIMEOUT_SECS: u64 = 300;
const SUMMARY_MAX_CHARS: usize = 1000;
const SUMMARY_TIMEOUT_SECS: u64 = 60;
const SMTP_PORT: u16 = 587;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub max_upload_size_bytes: usize,
    pub environment: String,
}

/// External converter settings
#[derive(Clone, Debug)]
pub struct ConverterConfig {
    pub ebook_convert_path: String,
    pub output_profile: String,
    pub max_concurrent_conversions: usize,
    pub timeout_secs: u64,
    pub temp_dir: PathBuf,
}

/// Which extraction strategy the preview renderer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewStrategy {
    /// Walk the converted EPUB's document and image items.
    Epub,
    /// Extract per-page HTML from the source PDF.
    Pages,
}

impl PreviewStrategy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "epub" => Some(PreviewStrategy::Epub),
            "pages" | "page" => Some(PreviewStrategy::Pages),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PreviewConfig {
    pub strategy: PreviewStrategy,
    pub mutool_path: String,
    pub cover_image_names: Vec<String>,
    pub image_max_width: String,
}

#[derive(Clone, Debug)]
pub struct SummaryConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_chars: usize,
    pub timeout_secs: u64,
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub sender: String,
    pub password: String,
    pub subject: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("subject", &self.subject)
            .finish()
    }
}

/// Optional behaviors that earlier revisions of the service toggled by code path.
#[derive(Clone, Copy, Debug)]
pub struct FeatureFlags {
    pub metadata_injection: bool,
    pub batch: bool,
    pub preview: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            metadata_injection: true,
            batch: true,
            preview: true,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub converter: ConverterConfig,
    pub preview: PreviewConfig,
    pub summary: SummaryConfig,
    pub smtp: SmtpConfig,
    pub features: FeatureFlags,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let flag = |key: &str, default: bool| {
            var(key)
                .map(|s| s.trim().to_lowercase().parse().unwrap_or(default))
                .unwrap_or(default)
        };
        let list = |key: &str, default: &str| -> Vec<String> {
            var(key)
                .unwrap_or_else(|| default.to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let server = ServerConfig {
            port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins: list("CORS_ORIGINS", "http://localhost,http://localhost:3000"),
            max_upload_size_bytes: var("MAX_UPLOAD_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            environment,
        };

        let converter = ConverterConfig {
            ebook_convert_path: var("EBOOK_CONVERT_PATH")
                .unwrap_or_else(|| "ebook-convert".to_string()),
            output_profile: var("OUTPUT_PROFILE").unwrap_or_else(|| "kindle".to_string()),
            max_concurrent_conversions: var("MAX_CONCURRENT_CONVERSIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONCURRENT_CONVERSIONS),
            timeout_secs: var("CONVERSION_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONVERSION_TIMEOUT_SECS),
            temp_dir: var("TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        };

        let strategy_raw = var("PREVIEW_STRATEGY").unwrap_or_else(|| "epub".to_string());
        let preview = PreviewConfig {
            strategy: PreviewStrategy::parse(&strategy_raw).ok_or_else(|| {
                anyhow::anyhow!(
                    "PREVIEW_STRATEGY must be 'epub' or 'pages', got '{}'",
                    strategy_raw
                )
            })?,
            mutool_path: var("MUTOOL_PATH").unwrap_or_else(|| "mutool".to_string()),
            cover_image_names: list("COVER_IMAGE_NAMES", "cover_image.jpg,cover_image.png"),
            image_max_width: var("PREVIEW_IMAGE_MAX_WIDTH").unwrap_or_else(|| "100%".to_string()),
        };

        let summary = SummaryConfig {
            api_key: var("OPENAI_API_KEY"),
            base_url: var("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: var("SUMMARY_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            max_chars: var("SUMMARY_MAX_CHARS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SUMMARY_MAX_CHARS),
            timeout_secs: var("SUMMARY_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(SUMMARY_TIMEOUT_SECS),
        };

        let smtp = SmtpConfig {
            host: var("SMTP_HOST").unwrap_or_else(|| "smtp.gmail.com".to_string()),
            port: var("SMTP_PORT")
                .and_then(|s| s.parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or(SMTP_PORT),
            sender: var("EMAIL_ADDRESS").unwrap_or_default(),
            password: var("EMAIL_PASSWORD").unwrap_or_default(),
            subject: var("EMAIL_SUBJECT").unwrap_or_else(|| "Your book for Kindle".to_string()),
        };

        let features = FeatureFlags {
            metadata_injection: flag("ENABLE_METADATA", true),
            batch: flag("ENABLE_BATCH", true),
            preview: flag("ENABLE_PREVIEW", true),
        };

        let config = Config {
            server,
            converter,
            preview,
            summary,
            smtp,
            features,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.smtp.sender.is_empty() || self.smtp.password.is_empty() {
            return Err(anyhow::anyhow!(
                "EMAIL_ADDRESS and EMAIL_PASSWORD must be set to deliver books"
            ));
        }

        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.converter.max_concurrent_conversions == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_CONVERSIONS must be at least 1"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
