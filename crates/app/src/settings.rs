//! Handles settings for the application.
//!
//! Values come from an optional TOML file (`settings.toml`, or the path given
//! with `--config`) overridden by `SALDO_*` environment variables, for
//! example `SALDO_TELEGRAM__TOKEN`.

use std::path::PathBuf;

use chrono_tz::Tz;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Parser)]
#[command(name = "saldo", about = "Personal finance tracker bot")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long)]
    level: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Storage {
    Memory,
    Json { path: PathBuf },
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Json {
            path: PathBuf::from("data/ledger.json"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Telegram {
    pub token: String,
    #[serde(default)]
    pub allowed_users: Vec<u64>,
    /// Where conversation sessions are kept between restarts.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_true")]
    pub reminders: bool,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("data/sessions.json")
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Conversation {
    /// Minutes of silence after which an unfinished topic is dropped; 0 keeps
    /// topics forever.
    pub session_ttl_minutes: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self {
            session_ttl_minutes: 30,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Reminders {
    /// IANA name of the timezone used for reminder times and local dates.
    pub timezone: String,
}

impl Default for Reminders {
    fn default() -> Self {
        Self {
            timezone: "America/Havana".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub storage: Storage,
    pub telegram: Option<Telegram>,
    #[serde(default)]
    pub conversation: Conversation,
    #[serde(default)]
    pub reminders: Reminders,
}

impl Settings {
    pub fn new() -> Result<Self, AppError> {
        let args = Args::parse();

        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let settings = Config::builder()
            .add_source(File::with_name(config_path).required(false))
            .add_source(
                Environment::with_prefix("SALDO")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("telegram.allowed_users"),
            )
            .build()?;

        let mut settings: Settings = settings.try_deserialize()?;
        if let Some(level) = args.level {
            settings.app.level = level;
        }
        Ok(settings)
    }

    pub fn timezone(&self) -> Result<Tz, AppError> {
        self.reminders
            .timezone
            .parse()
            .map_err(|_| AppError::Timezone(self.reminders.timezone.clone()))
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn from_toml(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_file_uses_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.storage, Storage::default());
        assert!(settings.telegram.is_none());
        assert_eq!(settings.conversation.session_ttl_minutes, 30);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::America::Havana);
    }

    #[test]
    fn full_file() {
        let settings = from_toml(
            r#"
            [app]
            level = "debug"

            [storage]
            type = "memory"

            [telegram]
            token = "123:abc"
            allowed_users = [1, 2]

            [conversation]
            session_ttl_minutes = 0

            [reminders]
            timezone = "Europe/Rome"
            "#,
        );
        assert_eq!(settings.storage, Storage::Memory);
        let telegram = settings.telegram.as_ref().unwrap();
        assert_eq!(telegram.allowed_users, vec![1, 2]);
        assert_eq!(telegram.state_path, PathBuf::from("data/sessions.json"));
        assert!(telegram.reminders);
        assert_eq!(settings.conversation.session_ttl_minutes, 0);
        assert_eq!(settings.timezone().unwrap(), chrono_tz::Europe::Rome);
    }

    #[test]
    fn unknown_timezone_is_an_error() {
        let settings = from_toml("[reminders]\ntimezone = \"Mars/Olympus\"");
        assert!(matches!(settings.timezone(), Err(AppError::Timezone(_))));
    }
}
