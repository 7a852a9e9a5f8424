use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("unknown timezone: {0}")]
    Timezone(String),
    #[error("storage error: {0}")]
    Storage(#[from] engine::EngineError),
    #[error("telegram bot error: {0}")]
    Bot(String),
}
