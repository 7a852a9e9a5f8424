use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use conversation::Button;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

/// The typed buttons behind the inline keyboard of the last reply sent to
/// each chat. Callback data carries the keyboard's generation and an index
/// into this list; a tap on any older keyboard carries another generation and
/// resolves to nothing.
#[derive(Clone)]
pub(crate) struct ChatButtons {
    inner: Arc<Mutex<Keyboards>>,
}

struct Keyboards {
    last_generation: u64,
    chats: HashMap<ChatId, (u64, Vec<Button>)>,
}

impl Default for ChatButtons {
    /// Generations start from the current time, so keyboards sent before a
    /// restart never match a new one.
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Keyboards {
                last_generation: Utc::now().timestamp_millis().unsigned_abs(),
                chats: HashMap::new(),
            })),
        }
    }
}

impl ChatButtons {
    /// Makes `buttons` the only active keyboard of `chat_id` and returns the
    /// generation to write into their callback data.
    pub(crate) async fn remember(&self, chat_id: ChatId, buttons: Vec<Button>) -> u64 {
        let mut guard = self.inner.lock().await;
        guard.last_generation = guard.last_generation.wrapping_add(1);
        let generation = guard.last_generation;
        if buttons.is_empty() {
            guard.chats.remove(&chat_id);
        } else {
            guard.chats.insert(chat_id, (generation, buttons));
        }
        generation
    }

    pub(crate) async fn resolve(&self, chat_id: ChatId, generation: u64, index: usize) -> Option<Button> {
        let guard = self.inner.lock().await;
        let (active, buttons) = guard.chats.get(&chat_id)?;
        if *active != generation {
            return None;
        }
        buttons.get(index).cloned()
    }
}

#[cfg(test)]
mod tests {
    use conversation::Topic;

    use super::*;

    #[tokio::test]
    async fn buttons_are_replaced_per_chat() {
        let buttons = ChatButtons::default();
        let chat = ChatId(1);

        let generation = buttons
            .remember(chat, vec![Button::Balance, Button::Start(Topic::Income)])
            .await;
        assert_eq!(
            buttons.resolve(chat, generation, 1).await,
            Some(Button::Start(Topic::Income))
        );
        assert_eq!(buttons.resolve(ChatId(2), generation, 0).await, None);

        buttons.remember(chat, Vec::new()).await;
        assert_eq!(buttons.resolve(chat, generation, 0).await, None);
    }

    #[tokio::test]
    async fn older_keyboards_resolve_to_nothing() {
        let buttons = ChatButtons::default();
        let chat = ChatId(1);

        let categories = buttons
            .remember(chat, vec![Button::Category("Food".into()), Button::MainMenu])
            .await;
        let products = buttons
            .remember(
                chat,
                vec![Button::Product("Rice".into()), Button::NewProduct, Button::MainMenu],
            )
            .await;

        assert_ne!(categories, products);
        assert_eq!(buttons.resolve(chat, categories, 0).await, None);
        assert_eq!(
            buttons.resolve(chat, products, 0).await,
            Some(Button::Product("Rice".into()))
        );
    }

    #[tokio::test]
    async fn generations_differ_across_restarts() {
        let before = ChatButtons::default().remember(ChatId(1), vec![Button::Balance]).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let after = ChatButtons::default();
        assert_eq!(after.resolve(ChatId(1), before, 0).await, None);
        assert!(after.remember(ChatId(1), vec![Button::Balance]).await > before);
    }
}
