//! Handler for slash commands

use conversation::{Button, Event, Reply, Topic, parsing::parse_reminder_setting};
use engine::AccountStore;
use teloxide::{
    RequestError,
    dispatching::{HandlerExt, UpdateHandler},
    prelude::*,
    utils::command::BotCommands,
};

use crate::{ConfigParameters, commands::Command};

use super::{allowed_user, exports, send_reply};

const WELCOME: &str = "Welcome! Record income and expenses, keep a catalog of \
the products you buy and set spending limits. Use the menu below to start, or /help \
for the list of commands.";

/// Build the schema for [`Command`]
pub(crate) fn schema<S: AccountStore>() -> UpdateHandler<RequestError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(handle_command::<S>)
}

async fn handle_command<S: AccountStore>(
    bot: Bot,
    msg: Message,
    cmd: Command,
    cfg: ConfigParameters<S>,
) -> ResponseResult<()> {
    let Some(user_id) = allowed_user(&cfg, msg.from.as_ref()) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;
    tracing::debug!(user_id = %user_id, ?cmd, "command received");

    let button = match cmd {
        Command::Start => {
            let mut reply = cfg
                .controller
                .handle(Event::button(user_id, Button::MainMenu))
                .await;
            reply.text = WELCOME.to_string();
            return send_reply(&bot, &cfg, chat_id, reply).await;
        }
        Command::Help => {
            let help = Reply::text(Command::descriptions().to_string());
            return send_reply(&bot, &cfg, chat_id, help).await;
        }
        Command::Export => return exports::send_export(&bot, chat_id, &cfg, &user_id).await,
        Command::Balance => Button::Balance,
        Command::Reminder(arg) if arg.trim().is_empty() => Button::Start(Topic::Reminder),
        Command::Reminder(arg) => match parse_reminder_setting(&arg) {
            Ok(setting) => Button::Reminder(setting),
            Err(err) => {
                return send_reply(&bot, &cfg, chat_id, Reply::text(format!("⚠️ {err}"))).await;
            }
        },
    };

    let reply = cfg.controller.handle(Event::button(user_id, button)).await;
    send_reply(&bot, &cfg, chat_id, reply).await
}
