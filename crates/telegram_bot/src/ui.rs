use conversation::{Options, Reply};
use teloxide::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup, ReplyMarkup,
};

use crate::commands::callback_data;

const KEYBOARD_COLUMNS: usize = 2;

/// Telegram markup for `reply`. Inline buttons point at their index in
/// `reply.buttons()` within keyboard `generation`.
pub(crate) fn render(reply: &Reply, generation: u64) -> Option<ReplyMarkup> {
    match &reply.options {
        Options::None => None,
        Options::Keyboard(labels) => {
            let rows: Vec<Vec<KeyboardButton>> = labels
                .chunks(KEYBOARD_COLUMNS)
                .map(|row| row.iter().map(KeyboardButton::new).collect())
                .collect();
            Some(ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard()))
        }
        Options::Buttons(buttons) => {
            let rows: Vec<Vec<InlineKeyboardButton>> = buttons
                .iter()
                .enumerate()
                .map(|(index, (label, _))| {
                    vec![InlineKeyboardButton::callback(
                        label.clone(),
                        callback_data(generation, index),
                    )]
                })
                .collect();
            Some(ReplyMarkup::InlineKeyboard(InlineKeyboardMarkup::new(rows)))
        }
    }
}

#[cfg(test)]
mod tests {
    use conversation::{Button, Topic};
    use teloxide::types::InlineKeyboardButtonKind;

    use super::*;

    #[test]
    fn inline_buttons_carry_generation_and_index() {
        let reply = Reply::with_buttons(
            "pick",
            vec![("Income".to_string(), Button::Start(Topic::Income))],
        );

        let Some(ReplyMarkup::InlineKeyboard(markup)) = render(&reply, 9) else {
            panic!("expected an inline keyboard");
        };
        assert_eq!(markup.inline_keyboard.len(), 2);
        let InlineKeyboardButtonKind::CallbackData(data) = &markup.inline_keyboard[1][0].kind else {
            panic!("expected callback data");
        };
        assert_eq!(data, "btn:9:1");
        assert_eq!(reply.buttons()[1].1, Button::MainMenu);
    }

    #[test]
    fn main_menu_is_a_reply_keyboard() {
        assert!(matches!(
            render(&Reply::main_menu("hi"), 0),
            Some(ReplyMarkup::Keyboard(_))
        ));
    }

    #[test]
    fn plain_text_has_no_markup() {
        assert!(render(&Reply::text("hi"), 0).is_none());
    }
}
