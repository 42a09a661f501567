//! Guided client modification.
//!
//! Branches on whether the caller knows the client id: "no" emits a
//! read-only listing and parks the flow on a dedicated selection step.
//! "todo" switches into the fixed-order everything sub-flow.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use serde_json::json;

const STEP_KNOWS_ID: u32 = 1;
const STEP_ID: u32 = 2;
/// Awaiting selection after the listing was shown.
const STEP_ID_FROM_LIST: u32 = 3;
const STEP_CAMPO: u32 = 4;
const STEP_VALOR: u32 = 5;
// "todo" sub-flow: every field, fixed order.
const STEP_TODO_NOMBRE: u32 = 10;
const STEP_TODO_APELLIDO: u32 = 11;
const STEP_TODO_TELEFONO: u32 = 12;
const STEP_TODO_EMAIL: u32 = 13;

const CAMPOS: &[&str] = &["nombre", "apellido", "telefono", "email"];

pub struct ModifyClientFlow;

impl ActionFlow for ModifyClientFlow {
    fn id(&self) -> ActionId {
        ActionId::ModifyClient
    }

    fn start(&self, _state: &mut ActionState, _user: &CallingUser) -> StepResult {
        StepResult::stay("Modificar cliente.\n\n¿Conoces el ID del cliente? (si/no)")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        let trimmed = input.trim().to_lowercase();
        match state.step {
            STEP_KNOWS_ID => match trimmed.as_str() {
                "si" | "sí" => StepResult::advance(STEP_ID, "ID del cliente:"),
                "no" => StepResult::advance_with_command(
                    STEP_ID_FROM_LIST,
                    "Te muestro la lista de clientes. Luego escribe el ID elegido:",
                    CommandSpec::new(CommandKind::ListClients),
                ),
                _ => StepResult::stay("Responde 'si' o 'no'."),
            },
            STEP_ID | STEP_ID_FROM_LIST => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("clientId".to_string(), v);
                    StepResult::advance(
                        STEP_CAMPO,
                        "¿Qué campo deseas modificar? (nombre / apellido / telefono / email / todo)",
                    )
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_CAMPO => {
                if trimmed == "todo" {
                    StepResult::advance(STEP_TODO_NOMBRE, "Nuevo nombre:")
                } else if CAMPOS.contains(&trimmed.as_str()) {
                    state.data.insert("campo".to_string(), trimmed.clone());
                    StepResult::advance(STEP_VALOR, format!("Nuevo valor para {trimmed}:"))
                } else {
                    StepResult::stay(
                        "Campo inválido. Escribe nombre, apellido, telefono, email o todo.",
                    )
                }
            }
            STEP_VALOR => {
                let campo = state.data.get("campo").cloned().unwrap_or_default();
                let value = match campo.as_str() {
                    "telefono" => validate::parse_phone(input),
                    "email" => validate::parse_email(input),
                    _ => validate::parse_text(input),
                };
                match value {
                    Ok(v) => {
                        let id = state.data.get("clientId").cloned().unwrap_or_default();
                        let mut changes = serde_json::Map::new();
                        changes.insert(campo.clone(), json!(v));
                        let spec = CommandSpec::new(CommandKind::UpdateClient)
                            .with_param("clientId", id)
                            .with_param("changes", serde_json::Value::Object(changes));
                        StepResult::finish(format!("Actualizando {campo} del cliente..."), spec)
                    }
                    Err(e) => StepResult::stay(e),
                }
            }
            STEP_TODO_NOMBRE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("nombre".to_string(), v);
                    StepResult::advance(STEP_TODO_APELLIDO, "Nuevo apellido:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_APELLIDO => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("apellido".to_string(), v);
                    StepResult::advance(STEP_TODO_TELEFONO, "Nuevo teléfono:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_TELEFONO => match validate::parse_phone(input) {
                Ok(v) => {
                    state.data.insert("telefono".to_string(), v);
                    StepResult::advance(STEP_TODO_EMAIL, "Nuevo email (o 'no' si no tiene):")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_EMAIL => match validate::parse_email(input) {
                Ok(v) => {
                    state.data.insert("email".to_string(), v);
                    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
                    let spec = CommandSpec::new(CommandKind::UpdateClient)
                        .with_param("clientId", get("clientId"))
                        .with_param(
                            "changes",
                            json!({
                                "nombre": get("nombre"),
                                "apellido": get("apellido"),
                                "telefono": get("telefono"),
                                "email": get("email"),
                            }),
                        );
                    StepResult::finish("Actualizando todos los datos del cliente...", spec)
                }
                Err(e) => StepResult::stay(e),
            },
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}
