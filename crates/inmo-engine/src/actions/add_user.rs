//! Guided staff-account registration: nombre → teléfono → rol.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use inmo_core::role::Role;
use serde_json::json;

const STEP_NOMBRE: u32 = 1;
const STEP_TELEFONO: u32 = 2;
const STEP_ROL: u32 = 3;

pub struct AddUserFlow;

impl ActionFlow for AddUserFlow {
    fn id(&self) -> ActionId {
        ActionId::AddUser
    }

    fn start(&self, state: &mut ActionState, user: &CallingUser) -> StepResult {
        state
            .data
            .insert("registrado_por".to_string(), user.id.clone());
        StepResult::stay("Registro de usuario.\n\nNombre completo:")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        match state.step {
            STEP_NOMBRE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("nombre".to_string(), v);
                    StepResult::advance(
                        STEP_TELEFONO,
                        "Teléfono (con código de país, ej. 59171234567):",
                    )
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TELEFONO => match validate::parse_phone(input) {
                Ok(v) => {
                    state.data.insert("telefono".to_string(), v);
                    StepResult::advance(STEP_ROL, "Rol (gerente / supervisor / agente):")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_ROL => match Role::parse(input) {
                Some(rol) => {
                    state.data.insert("rol".to_string(), rol.to_string());
                    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
                    let spec = CommandSpec::new(CommandKind::CreateUser).with_param(
                        "userData",
                        json!({
                            "nombre": get("nombre"),
                            "telefono": get("telefono"),
                            "rol": rol.as_str(),
                        }),
                    );
                    StepResult::finish(format!("Registrando usuario {}...", get("nombre")), spec)
                }
                None => {
                    StepResult::stay("Rol inválido. Escribe gerente, supervisor o agente.")
                }
            },
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}
