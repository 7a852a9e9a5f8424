use crate::event::{Button, MAIN_MENU};

/// How the transport should present the choices of a reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Options {
    #[default]
    None,
    /// Labels the user sends back as plain text.
    Keyboard(Vec<String>),
    /// Labelled typed buttons.
    Buttons(Vec<(String, Button)>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub options: Options,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Options::None,
        }
    }

    /// `text` with the main menu keyboard.
    pub fn main_menu(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            options: Options::Keyboard(MAIN_MENU.iter().map(|item| item.caption()).collect()),
        }
    }

    /// `text` with `buttons` followed by a way back to the main menu.
    pub fn with_buttons(text: impl Into<String>, mut buttons: Vec<(String, Button)>) -> Self {
        buttons.push(("🏠 Main menu".to_string(), Button::MainMenu));
        Self {
            text: text.into(),
            options: Options::Buttons(buttons),
        }
    }

    /// Prepends `line` to the text, keeping the options.
    pub(crate) fn prefixed(mut self, line: &str) -> Self {
        self.text = format!("{line}\n\n{}", self.text);
        self
    }

    pub fn buttons(&self) -> &[(String, Button)] {
        match &self.options {
            Options::Buttons(buttons) => buttons,
            _ => &[],
        }
    }
}
