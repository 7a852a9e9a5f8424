//! Conversation flow controller.
//!
//! Turns a stream of per-user [`Event`]s into [`Reply`]s. Every user has a
//! single-slot session holding the active topic and its step; each event is
//! routed by that step, may touch the [`Ledger`], and leaves the session in
//! its next step or idle.

use std::{path::Path, sync::Arc, time::Duration};

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use engine::{AccountStore, EngineError, Ledger};

pub use event::{Button, Event, Input, MAIN_MENU, MenuItem, ProductsAction, ReminderSetting, Topic};
pub use parsing::ParseError;
pub use reply::{Options, Reply};
pub use state::{BudgetStep, ExpenseStep, Flow, IncomeStep, ProductsStep, Session};

mod event;
mod handlers;
pub mod parsing;
mod reply;
mod state;

use handlers::{Context, Transition};
use state::SessionStore;

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

pub struct FlowController<S> {
    ledger: Arc<Ledger<S>>,
    sessions: SessionStore,
    session_ttl: Option<TimeDelta>,
    timezone: Tz,
}

impl<S: AccountStore> FlowController<S> {
    pub fn builder(ledger: Arc<Ledger<S>>) -> FlowControllerBuilder<S> {
        FlowControllerBuilder {
            ledger,
            session_ttl: DEFAULT_SESSION_TTL,
            timezone: Tz::UTC,
        }
    }

    pub fn ledger(&self) -> &Arc<Ledger<S>> {
        &self.ledger
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub async fn handle(&self, event: Event) -> Reply {
        self.handle_at(event, Utc::now()).await
    }

    /// Handles `event` as if it arrived at `now`.
    ///
    /// The user's session stays locked until the reply is ready, so events of
    /// one user never interleave.
    pub async fn handle_at(&self, event: Event, now: DateTime<Utc>) -> Reply {
        let user_id = event.user_id.as_str();
        let input = event.input;
        let mut session = self.sessions.lock(user_id).await;

        if session.is_expired(now, self.session_ttl) {
            tracing::info!(
                user_id,
                state = session.flow.as_ref().map_or("idle", Flow::name),
                "session expired, dropping the active topic"
            );
            session.flow = None;
        }
        session.last_activity = Some(now);

        let ctx = Context {
            ledger: &self.ledger,
            user_id,
            now,
            timezone: self.timezone,
        };
        let input_kind = input.kind();
        let outcome = handlers::dispatch(&ctx, session.flow.clone(), input).await;

        match outcome.transition {
            Transition::Next(flow) => {
                tracing::debug!(user_id, state = flow.name(), "transition");
                session.flow = Some(flow);
            }
            Transition::Idle => {
                tracing::debug!(user_id, "back to idle");
                session.flow = None;
            }
            Transition::Rejected => {
                tracing::warn!(
                    user_id,
                    state = session.flow.as_ref().map_or("idle", Flow::name),
                    input = input_kind,
                    "transition rejected"
                );
            }
        }

        outcome.reply
    }

    /// The user's session as it is now.
    pub async fn session(&self, user_id: &str) -> Session {
        self.sessions.get(user_id).await
    }

    /// Writes the active sessions to `path` and returns how many were saved.
    pub async fn save_sessions(&self, path: &Path) -> Result<usize, EngineError> {
        let saved = self.sessions.save(path).await?;
        tracing::info!(path = %path.display(), saved, "sessions saved");
        Ok(saved)
    }

    /// Replaces the in-memory sessions with the ones saved at `path`.
    pub async fn load_sessions(&self, path: &Path) -> usize {
        let loaded = self.sessions.load(path).await;
        tracing::info!(path = %path.display(), loaded, "sessions restored");
        loaded
    }
}

pub struct FlowControllerBuilder<S> {
    ledger: Arc<Ledger<S>>,
    session_ttl: Duration,
    timezone: Tz,
}

impl<S: AccountStore> FlowControllerBuilder<S> {
    /// How long an untouched topic survives. Zero keeps topics forever.
    pub fn session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Timezone used for local dates in reports.
    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn build(self) -> FlowController<S> {
        let session_ttl = TimeDelta::from_std(self.session_ttl)
            .ok()
            .filter(|ttl| !ttl.is_zero());
        FlowController {
            ledger: self.ledger,
            sessions: SessionStore::default(),
            session_ttl,
            timezone: self.timezone,
        }
    }
}
