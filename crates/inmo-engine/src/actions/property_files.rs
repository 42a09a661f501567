//! Attach media to an existing property: identifier, then the multi-file
//! collection loop.

use super::{files, ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use serde_json::json;

const STEP_ID: u32 = 1;
const STEP_ARCHIVOS: u32 = 2;

pub struct AddPropertyFilesFlow;

impl ActionFlow for AddPropertyFilesFlow {
    fn id(&self) -> ActionId {
        ActionId::AddPropertyFiles
    }

    fn start(&self, _state: &mut ActionState, _user: &CallingUser) -> StepResult {
        StepResult::stay("Agregar archivos.\n\nID de la propiedad:")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        match state.step {
            STEP_ID => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("propertyId".to_string(), v);
                    StepResult::advance(
                        STEP_ARCHIVOS,
                        "Envía los archivos uno por uno. \
                         Escribe 'confirmar' cuando termines, o 'cancelar' para abortar.",
                    )
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_ARCHIVOS => {
                if input.trim().eq_ignore_ascii_case(files::CONFIRM) {
                    if state.files.is_empty() {
                        return files::reject_empty();
                    }
                    let id = state.data.get("propertyId").cloned().unwrap_or_default();
                    let spec = CommandSpec::new(CommandKind::AddPropertyFiles)
                        .with_param("propertyId", id.clone())
                        .with_param("archivos", json!(state.files));
                    StepResult::finish(
                        format!(
                            "Agregando {} archivo(s) a la propiedad {id}...",
                            state.files.len()
                        ),
                        spec,
                    )
                } else {
                    files::accept(state, input)
                }
            }
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}
