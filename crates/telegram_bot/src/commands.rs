//! Bot commands and callback payloads

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu.")]
    Start,
    #[command(description = "show this message.")]
    Help,
    #[command(description = "show your current balance.")]
    Balance,
    #[command(description = "download all your entries as a CSV file.")]
    Export,
    #[command(description = "daily balance reminder: on, off or a time such as 20:00.")]
    Reminder(String),
}

const CALLBACK_PREFIX: &str = "btn:";

/// Callback data of the inline button at `index` of the keyboard `generation`.
pub(crate) fn callback_data(generation: u64, index: usize) -> String {
    format!("{CALLBACK_PREFIX}{generation}:{index}")
}

/// `(generation, index)` of a callback sent by one of our keyboards.
pub(crate) fn parse_callback_data(data: &str) -> Option<(u64, usize)> {
    let (generation, index) = data.strip_prefix(CALLBACK_PREFIX)?.split_once(':')?;
    Some((generation.parse().ok()?, index.parse().ok()?))
}
