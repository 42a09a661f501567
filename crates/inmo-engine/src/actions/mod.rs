//! Guided data-collection flows.
//!
//! One small state machine per action type. The step functions validate one
//! input at a time and either re-prompt, advance, or terminate by emitting
//! exactly one executable command.

mod add_client;
mod add_property;
mod add_user;
mod broadcast;
mod listings;
mod modify_client;
mod modify_property;
mod property_files;
mod toggle_user;

#[cfg(test)]
mod tests;

use crate::outcome::StepResult;
use crate::session::ActionState;
use inmo_core::command::CallingUser;

/// Every guided flow a menu option can start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    AddClient,
    ModifyClient,
    ListClients,
    AddProperty,
    ModifyProperty,
    AddPropertyFiles,
    ListProperties,
    AddUser,
    ToggleUser,
    ListUsers,
    SendBroadcast,
}

/// One action type's state machine.
///
/// `start` seeds the action data from the caller context and returns the
/// first prompt (or finishes immediately for one-shot listings). `advance`
/// consumes one input at the current step. Cancellation ("cancelar"/"0") is
/// handled by the engine before either is called.
pub trait ActionFlow: Send + Sync {
    fn id(&self) -> ActionId;
    fn start(&self, state: &mut ActionState, user: &CallingUser) -> StepResult;
    fn advance(&self, state: &mut ActionState, user: &CallingUser, input: &str) -> StepResult;
}

/// Resolve the flow for an action id. The catalog is closed; the match keeps
/// it exhaustive at compile time.
pub fn flow_for(id: ActionId) -> &'static dyn ActionFlow {
    match id {
        ActionId::AddClient => &add_client::AddClientFlow,
        ActionId::ModifyClient => &modify_client::ModifyClientFlow,
        ActionId::ListClients => &listings::LIST_CLIENTS,
        ActionId::AddProperty => &add_property::AddPropertyFlow,
        ActionId::ModifyProperty => &modify_property::ModifyPropertyFlow,
        ActionId::AddPropertyFiles => &property_files::AddPropertyFilesFlow,
        ActionId::ListProperties => &listings::LIST_PROPERTIES,
        ActionId::AddUser => &add_user::AddUserFlow,
        ActionId::ToggleUser => &toggle_user::ToggleUserFlow,
        ActionId::ListUsers => &listings::LIST_USERS,
        ActionId::SendBroadcast => &broadcast::SendBroadcastFlow,
    }
}

/// Acknowledgement helpers shared by the multi-file collection steps.
pub(crate) mod files {
    use crate::outcome::StepResult;
    use crate::session::ActionState;

    pub const CONFIRM: &str = "confirmar";

    /// One round of the collection loop: a file token is appended with an
    /// incrementing acknowledgement; "confirmar" is handled by the caller.
    pub fn accept(state: &mut ActionState, token: &str) -> StepResult {
        state.files.push(token.trim().to_string());
        StepResult::stay(format!(
            "Archivo {} recibido. Envía otro, o escribe 'confirmar' para terminar.",
            state.files.len()
        ))
    }

    pub fn reject_empty() -> StepResult {
        StepResult::stay(
            "Aún no has enviado ningún archivo. Envía al menos uno antes de confirmar."
                .to_string(),
        )
    }
}
