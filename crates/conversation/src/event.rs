//! Inbound events, already validated by the transport.

use chrono::NaiveTime;
use engine::{EntryKind, Window};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topic {
    Income,
    Expense,
    Products,
    Budget,
    Reminder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReminderSetting {
    On,
    Off,
    At(NaiveTime),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductsAction {
    Add,
    Remove,
    Update,
    List,
}

/// Every button a reply can offer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Button {
    MainMenu,
    Start(Topic),
    Balance,
    Summary(Window),
    /// Itemized incomes or expenses of a summary window.
    Entries(EntryKind, Window),
    Habits,
    Reminder(ReminderSetting),
    Category(String),
    Product(String),
    NewProduct,
    Products(ProductsAction),
    CatalogEntry { category: String, name: String },
    Confirm,
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Button(Button),
}

impl Input {
    /// Short tag used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Input::Text(_) => "text",
            Input::Button(button) => match button {
                Button::MainMenu => "main_menu",
                Button::Start(_) => "start",
                Button::Balance => "balance",
                Button::Summary(_) => "summary",
                Button::Entries(..) => "entries",
                Button::Habits => "habits",
                Button::Reminder(_) => "reminder",
                Button::Category(_) => "category",
                Button::Product(_) => "product",
                Button::NewProduct => "new_product",
                Button::Products(_) => "products_action",
                Button::CatalogEntry { .. } => "catalog_entry",
                Button::Confirm => "confirm",
                Button::Cancel => "cancel",
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub user_id: String,
    pub input: Input,
}

impl Event {
    pub fn text(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            input: Input::Text(text.into()),
        }
    }

    pub fn button(user_id: impl Into<String>, button: Button) -> Self {
        Self {
            user_id: user_id.into(),
            input: Input::Button(button),
        }
    }
}

/// An entry of the persistent main menu.
#[derive(Clone, Copy, Debug)]
pub struct MenuItem {
    pub icon: &'static str,
    pub label: &'static str,
    pub button: fn() -> Button,
}

impl MenuItem {
    /// The text shown on the keyboard, which is also what comes back.
    pub fn caption(&self) -> String {
        format!("{} {}", self.icon, self.label)
    }
}

pub const MAIN_MENU: [MenuItem; 9] = [
    MenuItem {
        icon: "➕",
        label: "Income",
        button: || Button::Start(Topic::Income),
    },
    MenuItem {
        icon: "➖",
        label: "Expense",
        button: || Button::Start(Topic::Expense),
    },
    MenuItem {
        icon: "💰",
        label: "Balance",
        button: || Button::Balance,
    },
    MenuItem {
        icon: "📊",
        label: "Summary",
        button: || Button::Summary(Window::Month),
    },
    MenuItem {
        icon: "🔍",
        label: "Habits",
        button: || Button::Habits,
    },
    MenuItem {
        icon: "📦",
        label: "Products",
        button: || Button::Start(Topic::Products),
    },
    MenuItem {
        icon: "🎯",
        label: "Budgets",
        button: || Button::Start(Topic::Budget),
    },
    MenuItem {
        icon: "⏰",
        label: "Reminder",
        button: || Button::Start(Topic::Reminder),
    },
    MenuItem {
        icon: "🏠",
        label: "Main menu",
        button: || Button::MainMenu,
    },
];

impl Button {
    /// Maps a main-menu caption back to its button. The icon is optional and
    /// the comparison ignores ASCII case.
    pub fn from_menu_label(text: &str) -> Option<Button> {
        let text = text.trim_start_matches(|c: char| !c.is_alphanumeric()).trim();
        MAIN_MENU
            .iter()
            .find(|item| item.label.eq_ignore_ascii_case(text))
            .map(|item| (item.button)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_labels_match_with_or_without_icon() {
        assert_eq!(
            Button::from_menu_label("➖ Expense"),
            Some(Button::Start(Topic::Expense))
        );
        assert_eq!(Button::from_menu_label(" balance "), Some(Button::Balance));
        assert_eq!(Button::from_menu_label("Rice, 20"), None);
    }

    #[test]
    fn every_caption_round_trips() {
        for item in MAIN_MENU {
            assert_eq!(Button::from_menu_label(&item.caption()), Some((item.button)()));
        }
    }
}
