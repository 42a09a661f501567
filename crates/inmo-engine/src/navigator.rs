//! Resolves a numeric selection against the session's current menu.

use crate::actions::flow_for;
use crate::engine::apply_step;
use crate::menu::{self, OptionTarget};
use crate::outcome::EngineReply;
use crate::session::{ActionState, Session};
use inmo_core::command::CallingUser;
use tracing::debug;

/// Match one input against the current menu. No state changes on a miss or a
/// forbidden option; the menu is re-rendered with an error line instead.
pub(crate) fn resolve(session: &mut Session, user: &CallingUser, input: &str) -> EngineReply {
    let def = menu::menu(session.current_menu);

    let Some(option) = def.options.iter().find(|o| o.key == input) else {
        return EngineReply::text(menu::render(def, user.role, Some("Opción inválida.")));
    };

    if !option.allows(user.role) {
        debug!(
            "option {} on {:?} forbidden for role {}",
            option.key, def.id, user.role
        );
        return EngineReply::text(menu::render(
            def,
            user.role,
            Some("No tienes permiso para esa opción."),
        ));
    }

    match option.target {
        OptionTarget::Menu(next) => {
            session.history.push(session.current_menu);
            session.current_menu = next;
            EngineReply::text(menu::render(menu::menu(next), user.role, None))
        }
        OptionTarget::Action(action_id) => {
            let mut state = ActionState::new(action_id);
            let result = flow_for(action_id).start(&mut state, user);
            session.action = Some(state);
            apply_step(session, result)
        }
    }
}
