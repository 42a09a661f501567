//! Two-phase staff-account enable/disable: show current status, then toggle.
//!
//! Known race, kept on purpose: the status shown at STEP_TOGGLE and the
//! status the handler re-reads at execution time are separate reads with no
//! lock between them. A concurrent change in that window makes the toggle
//! act on stale data; the handler's idempotent response covers the common
//! case (already in the requested state).

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};

const STEP_KNOWS_ID: u32 = 1;
const STEP_ID: u32 = 2;
const STEP_ID_FROM_LIST: u32 = 3;
const STEP_TOGGLE: u32 = 4;

pub struct ToggleUserFlow;

impl ActionFlow for ToggleUserFlow {
    fn id(&self) -> ActionId {
        ActionId::ToggleUser
    }

    fn start(&self, _state: &mut ActionState, _user: &CallingUser) -> StepResult {
        StepResult::stay("Activar / desactivar usuario.\n\n¿Conoces el ID del usuario? (si/no)")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        let trimmed = input.trim().to_lowercase();
        match state.step {
            STEP_KNOWS_ID => match trimmed.as_str() {
                "si" | "sí" => StepResult::advance(STEP_ID, "ID del usuario:"),
                "no" => StepResult::advance_with_command(
                    STEP_ID_FROM_LIST,
                    "Te muestro la lista de usuarios. Luego escribe el ID elegido:",
                    CommandSpec::new(CommandKind::ListUsers),
                ),
                _ => StepResult::stay("Responde 'si' o 'no'."),
            },
            STEP_ID | STEP_ID_FROM_LIST => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("userId".to_string(), v.clone());
                    // Display-only status read; the toggle handler reads again.
                    StepResult::advance_with_command(
                        STEP_TOGGLE,
                        "Escribe 'activar' o 'desactivar':",
                        CommandSpec::new(CommandKind::GetUser).with_param("userId", v),
                    )
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TOGGLE => {
                let id = state.data.get("userId").cloned().unwrap_or_default();
                match trimmed.as_str() {
                    "activar" => StepResult::finish(
                        format!("Activando usuario {id}..."),
                        CommandSpec::new(CommandKind::ActivateUser).with_param("userId", id),
                    ),
                    "desactivar" => StepResult::finish(
                        format!("Desactivando usuario {id}..."),
                        CommandSpec::new(CommandKind::DeactivateUser).with_param("userId", id),
                    ),
                    _ => StepResult::stay("Escribe 'activar' o 'desactivar'."),
                }
            }
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}
