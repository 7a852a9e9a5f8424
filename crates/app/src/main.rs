use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use conversation::FlowController;
use engine::{AccountStore, JsonFileStore, Ledger, MemoryStore};

use crate::{
    error::AppError,
    settings::{Settings, Storage},
};

mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "saldo={level},telegram_bot={level},conversation={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let timezone = settings.timezone()?;
    match &settings.storage {
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, nothing survives a restart");
            run(&settings, MemoryStore::default(), timezone).await
        }
        Storage::Json { path } => {
            tracing::info!(path = %path.display(), "Using JSON file storage");
            run(&settings, JsonFileStore::new(path), timezone).await
        }
    }
}

async fn run<S: AccountStore>(settings: &Settings, store: S, timezone: Tz) -> Result<(), AppError> {
    let Some(telegram) = &settings.telegram else {
        tracing::warn!("No telegram settings found, nothing to run");
        return Ok(());
    };

    let ledger = Arc::new(Ledger::new(store));
    let controller = Arc::new(
        FlowController::builder(ledger)
            .session_ttl(Duration::from_secs(
                settings.conversation.session_ttl_minutes.saturating_mul(60),
            ))
            .timezone(timezone)
            .build(),
    );

    start(&controller, settings).await;

    tracing::info!("Found telegram settings...");
    let bot = telegram_bot::Bot::builder(controller.clone())
        .token(&telegram.token)
        .allowed_users(&telegram.allowed_users)
        .reminders(telegram.reminders)
        .build()
        .map_err(AppError::Bot)?;
    bot.run().await;

    shutdown(&controller, settings).await
}

/// Restores the conversations saved by the last [`shutdown`].
async fn start<S: AccountStore>(controller: &FlowController<S>, settings: &Settings) {
    if let Some(telegram) = &settings.telegram {
        controller.load_sessions(&telegram.state_path).await;
    }
}

/// Saves unfinished conversations so users resume where they left off.
async fn shutdown<S: AccountStore>(controller: &FlowController<S>, settings: &Settings) -> Result<(), AppError> {
    if let Some(telegram) = &settings.telegram {
        controller.save_sessions(&telegram.state_path).await?;
    }
    tracing::info!("Shutdown complete");
    Ok(())
}
