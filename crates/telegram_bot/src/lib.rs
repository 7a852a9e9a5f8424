//! Telegram bot.
//!
//! A transport for the conversation flow controller: updates become typed
//! events, replies become keyboards. A background task sends the daily
//! balance reminders.

use std::sync::Arc;

use conversation::FlowController;
use engine::AccountStore;
use teloxide::prelude::*;

mod commands;
mod handlers;
mod reminders;
mod state;
mod ui;

pub use commands::Command;

pub struct ConfigParameters<S> {
    allowed_users: Option<Vec<UserId>>,
    controller: Arc<FlowController<S>>,
    buttons: state::ChatButtons,
}

impl<S> Clone for ConfigParameters<S> {
    fn clone(&self) -> Self {
        Self {
            allowed_users: self.allowed_users.clone(),
            controller: self.controller.clone(),
            buttons: self.buttons.clone(),
        }
    }
}

pub struct Bot<S> {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    controller: Arc<FlowController<S>>,
    reminders: bool,
}

impl<S: AccountStore> Bot<S> {
    pub fn builder(controller: Arc<FlowController<S>>) -> BotBuilder<S> {
        BotBuilder {
            token: String::new(),
            allowed_users: None,
            controller,
            reminders: true,
        }
    }

    /// Runs until the process receives Ctrl-C.
    pub async fn run(&self) {
        tracing::info!("Starting telegram bot...");

        let bot = teloxide::Bot::new(&self.token);

        let scheduler = self.reminders.then(|| {
            tokio::spawn(reminders::run(
                bot.clone(),
                self.controller.ledger().clone(),
                self.controller.timezone(),
            ))
        });

        let parameters = ConfigParameters {
            allowed_users: self.allowed_users.clone(),
            controller: self.controller.clone(),
            buttons: state::ChatButtons::default(),
        };

        let handler = dptree::entry()
            .branch(handlers::command_schema::<S>())
            .branch(Update::filter_message().endpoint(handlers::handle_message::<S>))
            .branch(Update::filter_callback_query().endpoint(handlers::handle_callback::<S>));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![parameters])
            .default_handler(|upd| async move {
                tracing::warn!("Unhandled update: {:?}", upd);
            })
            .error_handler(LoggingErrorHandler::with_custom_text(
                "An error has occurred in the dispatcher",
            ))
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        if let Some(scheduler) = scheduler {
            scheduler.abort();
        }
        tracing::info!("Telegram bot stopped");
    }
}

pub struct BotBuilder<S> {
    token: String,
    allowed_users: Option<Vec<UserId>>,
    controller: Arc<FlowController<S>>,
    reminders: bool,
}

impl<S: AccountStore> BotBuilder<S> {
    pub fn token(mut self, token: &str) -> BotBuilder<S> {
        self.token = token.to_string();
        self
    }

    /// Telegram user ids allowed to talk to the bot. Empty allows everyone.
    pub fn allowed_users(mut self, allowed_users: &[u64]) -> BotBuilder<S> {
        if !allowed_users.is_empty() {
            self.allowed_users = Some(allowed_users.iter().copied().map(UserId).collect());
        }
        self
    }

    pub fn reminders(mut self, enabled: bool) -> BotBuilder<S> {
        self.reminders = enabled;
        self
    }

    pub fn build(self) -> Result<Bot<S>, String> {
        tracing::info!("Initializing telegram bot...");
        if self.token.trim().is_empty() {
            return Err("the telegram token is empty".to_string());
        }
        Ok(Bot {
            token: self.token,
            allowed_users: self.allowed_users,
            controller: self.controller,
            reminders: self.reminders,
        })
    }
}
