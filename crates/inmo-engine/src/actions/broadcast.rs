//! Guided bulk-send setup: audience → (criteria / phone list) → message →
//! confirmation. The terminal command drives the broadcast scheduler, not a
//! CRUD handler.

use super::{ActionFlow, ActionId};
use crate::outcome::StepResult;
use crate::session::ActionState;
use crate::validate;
use inmo_core::command::{CallingUser, CommandKind, CommandSpec};

const STEP_AUDIENCE: u32 = 1;
const STEP_FILTRO: u32 = 2;
const STEP_DESTINATARIOS: u32 = 3;
const STEP_MENSAJE: u32 = 4;
const STEP_CONFIRM: u32 = 5;

pub struct SendBroadcastFlow;

impl ActionFlow for SendBroadcastFlow {
    fn id(&self) -> ActionId {
        ActionId::SendBroadcast
    }

    fn start(&self, state: &mut ActionState, user: &CallingUser) -> StepResult {
        state
            .data
            .insert("solicitado_por".to_string(), user.id.clone());
        StepResult::stay(
            "Difusión.\n\n¿A quién va dirigida? (equipo / clientes / filtrados / personalizado)",
        )
    }

    fn advance(&self, state: &mut ActionState, _user: &CallingUser, input: &str) -> StepResult {
        let trimmed = input.trim().to_lowercase();
        match state.step {
            STEP_AUDIENCE => match trimmed.as_str() {
                "equipo" | "clientes" => {
                    state.data.insert("audience".to_string(), trimmed.clone());
                    StepResult::advance(STEP_MENSAJE, "Escribe el mensaje a enviar:")
                }
                "filtrados" => {
                    state.data.insert("audience".to_string(), trimmed.clone());
                    StepResult::advance(
                        STEP_FILTRO,
                        "Criterio de filtro (texto a buscar en los clientes):",
                    )
                }
                "personalizado" => {
                    state.data.insert("audience".to_string(), trimmed.clone());
                    StepResult::advance(
                        STEP_DESTINATARIOS,
                        "Lista de teléfonos separados por comas:",
                    )
                }
                _ => StepResult::stay(
                    "Audiencia inválida. Escribe equipo, clientes, filtrados o personalizado.",
                ),
            },
            STEP_FILTRO => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("filtro".to_string(), v);
                    StepResult::advance(STEP_MENSAJE, "Escribe el mensaje a enviar:")
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_DESTINATARIOS => {
                let mut phones = Vec::new();
                for part in input.split(',') {
                    match validate::parse_phone(part) {
                        Ok(p) => phones.push(p),
                        Err(e) => return StepResult::stay(format!("'{}': {e}", part.trim())),
                    }
                }
                if phones.is_empty() {
                    return StepResult::stay("Ingresa al menos un teléfono.");
                }
                state
                    .data
                    .insert("destinatarios".to_string(), phones.join(","));
                StepResult::advance(STEP_MENSAJE, "Escribe el mensaje a enviar:")
            }
            STEP_MENSAJE => match validate::parse_text(input) {
                Ok(v) => {
                    state.data.insert("mensaje".to_string(), v);
                    StepResult::advance(
                        STEP_CONFIRM,
                        "Escribe 'confirmar' para enviar la difusión, o 'cancelar' para abortar.",
                    )
                }
                Err(e) => StepResult::stay(e),
            },
            STEP_CONFIRM => {
                if trimmed == "confirmar" {
                    let get = |k: &str| state.data.get(k).cloned().unwrap_or_default();
                    let mut spec = CommandSpec::new(CommandKind::SendBroadcast)
                        .with_param("audience", get("audience"))
                        .with_param("mensaje", get("mensaje"));
                    if let Some(f) = state.data.get("filtro") {
                        spec = spec.with_param("filtro", f.clone());
                    }
                    if let Some(d) = state.data.get("destinatarios") {
                        let phones: Vec<String> =
                            d.split(',').map(|s| s.to_string()).collect();
                        spec = spec.with_param("destinatarios", serde_json::json!(phones));
                    }
                    StepResult::finish("Preparando la difusión...", spec)
                } else {
                    StepResult::stay("Escribe 'confirmar' para enviar, o 'cancelar' para abortar.")
                }
            }
            _ => StepResult::stay("Respuesta no esperada. Escribe 'cancelar' para salir."),
        }
    }
}
