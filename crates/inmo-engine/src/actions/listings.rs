//! One-shot listing flows: start emits a read-only command and finishes,
//! there is nothing to collect.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};

pub struct ListingFlow {
    id: ActionId,
    kind: CommandKind,
    text: &'static str,
}

pub const LIST_CLIENTS: ListingFlow = ListingFlow {
    id: ActionId::ListClients,
    kind: CommandKind::ListClients,
    text: "Consultando clientes...",
};

pub const LIST_PROPERTIES: ListingFlow = ListingFlow {
    id: ActionId::ListProperties,
    kind: CommandKind::ListProperties,
    text: "Consultando propiedades...",
};

pub const LIST_USERS: ListingFlow = ListingFlow {
    id: ActionId::ListUsers,
    kind: CommandKind::ListUsers,
    text: "Consultando usuarios...",
};

impl ActionFlow for ListingFlow {
    fn id(&self) -> ActionId {
        self.id
    }

    fn start(&self, _state: &mut ActionState, _user: &CallingUser) -> StepResult {
        StepResult::finish(self.text, CommandSpec::new(self.kind))
    }

    // One-shot flows finish inside start; there is no step to advance.
    fn advance(&self, _state: &mut ActionState, _user: &CallingUser, _input: &str) -> StepResult {
        StepResult::finish_text("Consulta terminada.")
    }
}
