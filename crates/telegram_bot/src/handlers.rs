use conversation::{Button, Event, Input, Options, Reply};
use engine::AccountStore;
use teloxide::{
    prelude::*,
    types::{CallbackQuery, ChatId, User},
};

use crate::{ConfigParameters, commands::parse_callback_data, ui};

mod commands;
mod exports;

pub(crate) use commands::schema as command_schema;

pub(crate) async fn handle_message<S: AccountStore>(
    bot: Bot,
    msg: Message,
    cfg: ConfigParameters<S>,
) -> ResponseResult<()> {
    let Some(user_id) = allowed_user(&cfg, msg.from.as_ref()) else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let Some(text) = msg.text() else {
        let notice = Reply::text("Only text messages are supported.");
        return send_reply(&bot, &cfg, chat_id, notice).await;
    };

    // Main menu captions come back as text.
    let input = match Button::from_menu_label(text) {
        Some(button) => Input::Button(button),
        None => Input::Text(text.to_string()),
    };

    let reply = cfg.controller.handle(Event { user_id, input }).await;
    send_reply(&bot, &cfg, chat_id, reply).await
}

pub(crate) async fn handle_callback<S: AccountStore>(
    bot: Bot,
    q: CallbackQuery,
    cfg: ConfigParameters<S>,
) -> ResponseResult<()> {
    let Some(user_id) = allowed_user(&cfg, Some(&q.from)) else {
        return Ok(());
    };
    let Some(message) = q.message.as_ref() else {
        return Ok(());
    };
    let chat_id = message.chat().id;

    let _ = bot.answer_callback_query(q.id.clone()).await;

    let button = match q.data.as_deref().and_then(parse_callback_data) {
        Some((generation, index)) => cfg.buttons.resolve(chat_id, generation, index).await,
        None => None,
    };
    let Some(button) = button else {
        tracing::debug!(user_id = %user_id, data = ?q.data, "stale or unknown callback");
        let notice = Reply::text("This button is no longer active.");
        return send_reply(&bot, &cfg, chat_id, notice).await;
    };

    let reply = cfg.controller.handle(Event::button(user_id, button)).await;
    send_reply(&bot, &cfg, chat_id, reply).await
}

/// Sends `reply`. A reply with options becomes the chat's active keyboard;
/// a plain notice leaves the current one usable.
pub(crate) async fn send_reply<S: AccountStore>(
    bot: &Bot,
    cfg: &ConfigParameters<S>,
    chat_id: ChatId,
    reply: Reply,
) -> ResponseResult<()> {
    let generation = match reply.options {
        Options::None => 0,
        _ => {
            let buttons = reply.buttons().iter().map(|(_, button)| button.clone()).collect();
            cfg.buttons.remember(chat_id, buttons).await
        }
    };
    let markup = ui::render(&reply, generation);

    let request = bot.send_message(chat_id, reply.text);
    match markup {
        Some(markup) => request.reply_markup(markup).await?,
        None => request.await?,
    };
    Ok(())
}

/// The id of `from` as a ledger user id, or `None` when the user is not on
/// the allow-list.
fn allowed_user<S>(cfg: &ConfigParameters<S>, from: Option<&User>) -> Option<String> {
    let from = from?;
    if let Some(ids) = &cfg.allowed_users
        && !ids.contains(&from.id)
    {
        tracing::debug!(user = from.id.0, "ignoring update from a user not in the allow-list");
        return None;
    }
    Some(from.id.0.to_string())
}
