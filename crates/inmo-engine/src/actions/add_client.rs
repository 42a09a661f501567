//! Guided client registration: nombre → apellido → teléfono → email.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use serde_json::json;

const STEP_NOMBRE: u32 = 1;
const STEP_APELLIDO: u32 = 2;
const STEP_TELEFONO: u32 = 3;
const STEP_EMAIL: u32 = 4;

pub struct AddClientFlow;

impl ActionFlow for AddClientFlow {
    fn id(&self) -> ActionId {
        ActionId::AddClient
    }

    fn start(&self, state: &mut ActionState, user: &CallingUser) -> StepResult {
        state
            .data
            .insert("registrado_por".to_string(), user.id.clone());
        StepResult::stay("Registro de cliente.\n\nNombre del cliente:")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        match state.step {
            STEP_NOMBRE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("nombre".to_string(), v);
                    StepResult::advance(STEP_APELLIDO, "Apellido:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_APELLIDO => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("apellido".to_string(), v);
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
                    StepResult::advance(STEP_EMAIL, "Email (o 'no' si no tiene):")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_EMAIL => match validate::parse_email(input) {
                Ok(v) => {
                    state.data.insert("email".to_string(), v);
                    finish(state)
                }
                Err(e) => StepResult::stay(e),
            },
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}

fn finish(state: &ActionState) -> StepResult {
    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
    let spec = CommandSpec::new(CommandKind::CreateClient).with_param(
        "clientData",
        json!({
            "nombre": get("nombre"),
            "apellido": get("apellido"),
            "telefono": get("telefono"),
            "email": get("email"),
        }),
    );
    StepResult::finish(
        format!("Registrando cliente {} {}...", get("nombre"), get("apellido")),
        spec,
    )
}
