use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use thiserror::Error;

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// 日付と曜日を決めるタイムゾーン (IANA 名)
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    #[serde(default)]
    pub fields: FieldMapping,
    #[serde(default)]
    pub cover: CoverConfig,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            fields: FieldMapping::default(),
            cover: CoverConfig::default(),
            quote: QuoteConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Sofia
}

/// データベースのプロパティ名の対応表。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldMapping {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub checkboxes: Vec<String>,
    /// 未設定ならメモ欄を作らない
    #[serde(default)]
    pub notes: Option<String>,
    /// 未設定なら名言はページ本文に quote ブロックとして追加する
    #[serde(default)]
    pub quote: Option<String>,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            title: "Name".to_string(),
            date: "Date".to_string(),
            checkboxes: vec![
                "WORKOUT DONE".to_string(),
                "Programming 2h".to_string(),
                "10k STEPS DONE".to_string(),
                "CALORIE GOAL HIT".to_string(),
            ],
            notes: Some("Extra notes".to_string()),
            quote: Some("Quote".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CoverConfig {
    pub topic: String,
}

impl Default for CoverConfig {
    fn default() -> Self {
        Self {
            topic: "motivation".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuoteConfig {
    #[serde(default)]
    pub provider: QuoteProviderKind,
}

/// 名言 API の種類。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProviderKind {
    #[default]
    Quotable,
    ZenQuotes,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set (pass --{1} or export {0})")]
    MissingCredential(&'static str, &'static str),
}

/// Notion API の認証情報。
#[derive(Clone)]
pub struct NotionCredentials {
    pub token: String,
    pub database_id: String,
}

impl NotionCredentials {
    /// 起動時に認証情報を検証する。空文字列は未設定として扱う。
    pub fn new(
        token: Option<String>,
        database_id: Option<String>,
    ) -> std::result::Result<Self, ConfigError> {
        let token = non_blank(token)
            .ok_or(ConfigError::MissingCredential("NOTION_TOKEN", "notion-token"))?;
        let database_id = non_blank(database_id)
            .ok_or(ConfigError::MissingCredential("NOTION_DATABASE_ID", "database-id"))?;
        Ok(Self { token, database_id })
    }
}

impl std::fmt::Debug for NotionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionCredentials")
            .field("token", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn open_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let config: Config = toml::from_str(&content).context("Failed to parse configuration file")?;
    Ok(config)
}

pub fn write_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize configuration")?;
    fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
    Ok(())
}
