//! Guided property modification: same shape as the client flow, property
//! fields.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use serde_json::json;

const STEP_KNOWS_ID: u32 = 1;
const STEP_ID: u32 = 2;
const STEP_ID_FROM_LIST: u32 = 3;
const STEP_CAMPO: u32 = 4;
const STEP_VALOR: u32 = 5;
const STEP_TODO_NOMBRE: u32 = 10;
const STEP_TODO_DESCRIPCION: u32 = 11;
const STEP_TODO_PRECIO: u32 = 12;
const STEP_TODO_UBICACION: u32 = 13;

const CAMPOS: &[&str] = &["nombre", "descripcion", "precio", "ubicacion"];

pub struct ModifyPropertyFlow;

impl ActionFlow for ModifyPropertyFlow {
    fn id(&self) -> ActionId {
        ActionId::ModifyProperty
    }

    fn start(&self, _state: &mut ActionState, _user: &CallingUser) -> StepResult {
        StepResult::stay("Modificar propiedad.\n\n¿Conoces el ID de la propiedad? (si/no)")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        let trimmed = input.trim().to_lowercase();
        match state.step {
            STEP_KNOWS_ID => match trimmed.as_str() {
                "si" | "sí" => StepResult::advance(STEP_ID, "ID de la propiedad:"),
                "no" => StepResult::advance_with_command(
                    STEP_ID_FROM_LIST,
                    "Te muestro la lista de propiedades. Luego escribe el ID elegido:",
                    CommandSpec::new(CommandKind::ListProperties),
                ),
                _ => StepResult::stay("Responde 'si' o 'no'."),
            },
            STEP_ID | STEP_ID_FROM_LIST => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("propertyId".to_string(), v);
                    StepResult::advance(
                        STEP_CAMPO,
                        "¿Qué campo deseas modificar? (nombre / descripcion / precio / ubicacion / todo)",
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
                        "Campo inválido. Escribe nombre, descripcion, precio, ubicacion o todo.",
                    )
                }
            }
            STEP_VALOR => {
                let campo = state.data.get("campo").cloned().unwrap_or_default();
                if campo == "precio" {
                    match validate::parse_positive_int(input) {
                        Ok(v) => finish_single(state, &campo, json!(v)),
                        Err(e) => StepResult::stay(e),
                    }
                } else {
                    match validate::parse_text(input) {
                        Ok(v) => finish_single(state, &campo, json!(v)),
                        Err(e) => StepResult::stay(e),
                    }
                }
            }
            STEP_TODO_NOMBRE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("nombre".to_string(), v);
                    StepResult::advance(STEP_TODO_DESCRIPCION, "Nueva descripción:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_DESCRIPCION => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("descripcion".to_string(), v);
                    StepResult::advance(STEP_TODO_PRECIO, "Nuevo precio (solo números):")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_PRECIO => match validate::parse_positive_int(input) {
                Ok(v) => {
                    state.data.insert("precio".to_string(), v.to_string());
                    StepResult::advance(STEP_TODO_UBICACION, "Nueva ubicación:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_TODO_UBICACION => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("ubicacion".to_string(), v);
                    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
                    let precio: u64 = get("precio").parse().unwrap_or(0);
                    let spec = CommandSpec::new(CommandKind::UpdateProperty)
                        .with_param("propertyId", get("propertyId"))
                        .with_param(
                            "changes",
                            json!({
                                "nombre": get("nombre"),
                                "descripcion": get("descripcion"),
                                "precio": precio,
                                "ubicacion": get("ubicacion"),
                            }),
                        );
                    StepResult::finish("Actualizando todos los datos de la propiedad...", spec)
                }
                Err(e) => StepResult::stay(e),
            },
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}

fn finish_single(state: &ActionState, campo: &str, value: serde_json::Value) -> StepResult {
    let id = state.data.get("propertyId").cloned().unwrap_or_default();
    let mut changes = serde_json::Map::new();
    changes.insert(campo.to_string(), value);
    let spec = CommandSpec::new(CommandKind::UpdateProperty)
        .with_param("propertyId", id)
        .with_param("changes", serde_json::Value::Object(changes));
    StepResult::finish(format!("Actualizando {campo} de la propiedad..."), spec)
}
