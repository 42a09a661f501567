//! Guided property registration: nombre → descripción → precio → ubicación →
//! fotos (multi-file collection).

use super::{files, ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};
use serde_json::json;

const STEP_NOMBRE: u32 = 1;
const STEP_DESCRIPCION: u32 = 2;
const STEP_PRECIO: u32 = 3;
const STEP_UBICACION: u32 = 4;
const STEP_ARCHIVOS: u32 = 5;

pub struct AddPropertyFlow;

impl ActionFlow for AddPropertyFlow {
    fn id(&self) -> ActionId {
        ActionId::AddProperty
    }

    fn start(&self, state: &mut ActionState, user: &CallingUser) -> StepResult {
        state
            .data
            .insert("registrado_por".to_string(), user.id.clone());
        StepResult::stay("Registro de propiedad.\n\nNombre de la propiedad:")
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        match state.step {
            STEP_NOMBRE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("nombre".to_string(), v);
                    StepResult::advance(STEP_DESCRIPCION, "Descripción:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_DESCRIPCION => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("descripcion".to_string(), v);
                    StepResult::advance(STEP_PRECIO, "Precio (en USD, solo números):")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_PRECIO => match validate::parse_positive_int(input) {
                Ok(v) => {
                    state.data.insert("precio".to_string(), v.to_string());
                    StepResult::advance(STEP_UBICACION, "Ubicación:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_UBICACION => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("ubicacion".to_string(), v);
                    StepResult::advance(
                        STEP_ARCHIVOS,
                        "Envía las fotos de la propiedad una por una. \
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
                    finish(state)
                } else {
                    files::accept(state, input)
                }
            }
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}

fn finish(state: &ActionState) -> StepResult {
    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
    let precio: u64 = get("precio").parse().unwrap_or(0);
    let spec = CommandSpec::new(CommandKind::CreateProperty).with_param(
        "propertyData",
        json!({
            "nombre": get("nombre"),
            "descripcion": get("descripcion"),
            "precio": precio,
            "ubicacion": get("ubicacion"),
            "archivos": state.files,
        }),
    );
    StepResult::finish(
        format!(
            "Registrando propiedad {} con {} archivo(s)...",
            get("nombre"),
            state.files.len()
        ),
        spec,
    )
}
