//! The engine's single entry point: one inbound text in, one reply out.

use crate::actions::flow_for;
use crate::menu::{self, MenuId};
use crate::navigator;
use crate::outcome::{EngineReply, StepResult, Transition};
use crate::session::{Session, SessionStore};
use inmo_core::command::CallingUser;
use inmo_core::config::SessionConfig;
use inmo_core::traits::Clock;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The conversational session engine.
///
/// All session mutation for one inbound event happens in a single
/// synchronous pass under the store's lock; the caller (gateway) guarantees
/// events for the same user id are never processed concurrently.
pub struct Engine {
    sessions: SessionStore,
}

impl Engine {
    pub fn new(config: &SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let idle = Duration::from_secs(config.idle_timeout_mins * 60);
        Self {
            sessions: SessionStore::new(idle, clock),
        }
    }

    /// Consume one inbound text for one user, yielding the display message
    /// and, sometimes, an executable command for the dispatcher.
    pub async fn handle_inbound_text(&self, user: &CallingUser, text: &str) -> EngineReply {
        let input = text.trim().to_string();
        let id = user.id.clone();
        let user = user.clone();
        self.sessions
            .with_session(&id, move |session| process(session, &user, &input))
            .await
    }

    /// The session store, for the eviction sweep and the status surface.
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

fn process(session: &mut Session, user: &CallingUser, input: &str) -> EngineReply {
    // "menu" (and "0" outside an action) always resets to the main menu.
    if input.eq_ignore_ascii_case("menu") || (input == "0" && session.action.is_none()) {
        session.action = None;
        session.current_menu = MenuId::Main;
        session.history.clear();
        return EngineReply::text(menu::render(menu::menu(MenuId::Main), user.role, None));
    }

    if let Some(state) = session.action.as_mut() {
        // Cancellation takes precedence over whatever the step expects.
        if input.eq_ignore_ascii_case("cancelar") || input == "0" {
            debug!("user {} cancelled action {:?}", user.id, state.action);
            session.action = None;
            return EngineReply::text(menu::render(
                menu::menu(session.current_menu),
                user.role,
                Some("Acción cancelada."),
            ));
        }

        let result = flow_for(state.action).advance(state, user, input);
        return apply_step(session, result);
    }

    navigator::resolve(session, user, input)
}

/// Apply a step's transition to the session and surface its reply.
pub(crate) fn apply_step(session: &mut Session, result: StepResult) -> EngineReply {
    match result.transition {
        Transition::Stay => {}
        Transition::Advance(step) => {
            if let Some(state) = session.action.as_mut() {
                state.step = step;
            }
        }
        Transition::Finish => {
            session.action = None;
        }
    }
    EngineReply {
        text: result.text,
        execute: result.execute,
    }
}
