//! End-to-end flow tests: inbound texts in, replies and command specs out.

use crate::actions::ActionId;
use crate::engine::Engine;
use crate::menu::MenuId;
use crate::outcome::EngineReply;
use crate::session::test_clock::FakeClock;
use inmo_core::command::{CallingUser, CommandKind};
use inmo_core::config::SessionConfig;
use inmo_core::role::Role;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn engine() -> (Engine, Arc<FakeClock>) {
    let clock = Arc::new(FakeClock::new());
    let engine = Engine::new(&SessionConfig::default(), clock.clone());
    (engine, clock)
}

fn agente() -> CallingUser {
    CallingUser {
        id: "59170000001".into(),
        role: Role::Agente,
        name: Some("Ana".into()),
    }
}

fn gerente() -> CallingUser {
    CallingUser {
        id: "59170000009".into(),
        role: Role::Gerente,
        name: Some("Marco".into()),
    }
}

async fn drive(engine: &Engine, user: &CallingUser, inputs: &[&str]) -> Vec<EngineReply> {
    let mut replies = Vec::new();
    for input in inputs {
        replies.push(engine.handle_inbound_text(user, input).await);
    }
    replies
}

#[tokio::test]
async fn test_add_client_emits_exactly_one_create_client() {
    let (engine, _) = engine();
    let user = agente();
    let replies = drive(
        &engine,
        &user,
        &["1", "1", "Juan", "Perez", "59171234567", "no"],
    )
    .await;

    let executes: Vec<_> = replies.iter().filter_map(|r| r.execute.clone()).collect();
    assert_eq!(executes.len(), 1, "exactly one command over the whole flow");
    let spec = &executes[0];
    assert_eq!(spec.kind, CommandKind::CreateClient);
    assert_eq!(
        spec.params["clientData"],
        json!({
            "nombre": "Juan",
            "apellido": "Perez",
            "telefono": "59171234567",
            "email": "",
        })
    );

    // Terminal step cleared the action.
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert!(snap.action.is_none());
}

#[tokio::test]
async fn test_phone_step_rejects_then_accepts() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "1", "Juan", "Perez"]).await;

    let rejected = engine.handle_inbound_text(&user, "700000").await;
    assert!(rejected.execute.is_none());
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert_eq!(snap.action.as_ref().unwrap().step, 3, "still on phone step");

    let accepted = engine.handle_inbound_text(&user, "59171234567").await;
    assert!(accepted.text.contains("Email"));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert_eq!(snap.action.as_ref().unwrap().step, 4);
}

#[tokio::test]
async fn test_cancelar_clears_action_and_redisplays_menu() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "1", "Juan"]).await;

    let reply = engine.handle_inbound_text(&user, "cancelar").await;
    assert!(reply.text.contains("Acción cancelada."));
    assert!(reply.text.contains("*Clientes*"));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert!(snap.action.is_none());
    assert_eq!(snap.current_menu, MenuId::Clientes);
}

#[tokio::test]
async fn test_zero_mid_action_cancels_too() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "1", "Juan", "Perez"]).await;

    let reply = engine.handle_inbound_text(&user, "0").await;
    assert!(reply.text.contains("Acción cancelada."));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert!(snap.action.is_none());
}

#[tokio::test]
async fn test_menu_keyword_resets_from_anywhere() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "1", "Juan"]).await;

    let reply = engine.handle_inbound_text(&user, "MENU").await;
    assert!(reply.text.contains("*Menú principal*"));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert!(snap.action.is_none());
    assert_eq!(snap.current_menu, MenuId::Main);
    assert!(snap.history.is_empty());
}

#[tokio::test]
async fn test_idle_session_resets_to_main_without_action() {
    let (engine, clock) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "1", "Juan"]).await;

    clock.advance(Duration::from_secs(31 * 60));

    // Next access lands on a reset session; the stale input misses the menu.
    let reply = engine.handle_inbound_text(&user, "Perez").await;
    assert!(reply.text.contains("Opción inválida."));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert_eq!(snap.current_menu, MenuId::Main);
    assert!(snap.action.is_none());
}

#[tokio::test]
async fn test_modify_client_listing_branch() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "2"]).await;

    let reply = engine.handle_inbound_text(&user, "no").await;
    let spec = reply.execute.expect("'no' should emit the listing");
    assert_eq!(spec.kind, CommandKind::ListClients);
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    let state = snap.action.as_ref().unwrap();
    assert_eq!(state.action, ActionId::ModifyClient);
    assert_eq!(state.step, 3, "parked on the awaiting-selection step");
    // The listing result is display-only: nothing folded into the data map.
    assert!(!state.data.contains_key("clientId"));

    drive(&engine, &user, &["C-7", "telefono"]).await;
    let done = engine.handle_inbound_text(&user, "59177777777").await;
    let spec = done.execute.expect("terminal update command");
    assert_eq!(spec.kind, CommandKind::UpdateClient);
    assert_eq!(spec.params["clientId"], "C-7");
    assert_eq!(spec.params["changes"], json!({ "telefono": "59177777777" }));
}

#[tokio::test]
async fn test_modify_client_todo_collects_every_field() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["1", "2", "si", "C-9", "todo"]).await;

    let replies = drive(
        &engine,
        &user,
        &["Maria", "Lopez", "59172222222", "maria@mail.com"],
    )
    .await;
    let spec = replies.last().unwrap().execute.clone().expect("terminal");
    assert_eq!(spec.kind, CommandKind::UpdateClient);
    assert_eq!(
        spec.params["changes"],
        json!({
            "nombre": "Maria",
            "apellido": "Lopez",
            "telefono": "59172222222",
            "email": "maria@mail.com",
        })
    );
}

#[tokio::test]
async fn test_property_files_confirm_rejected_when_empty() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["2", "3", "P-12"]).await;

    let reply = engine.handle_inbound_text(&user, "confirmar").await;
    assert!(reply.execute.is_none());
    assert!(reply.text.contains("al menos uno"));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert!(snap.action.is_some(), "flow keeps waiting for files");
}

#[tokio::test]
async fn test_property_files_acknowledges_and_confirms() {
    let (engine, _) = engine();
    let user = agente();
    drive(&engine, &user, &["2", "3", "P-12"]).await;

    let first = engine.handle_inbound_text(&user, "foto-frente.jpg").await;
    assert!(first.text.contains("Archivo 1"));
    let second = engine.handle_inbound_text(&user, "foto-patio.jpg").await;
    assert!(second.text.contains("Archivo 2"));

    let done = engine.handle_inbound_text(&user, "confirmar").await;
    let spec = done.execute.expect("terminal command");
    assert_eq!(spec.kind, CommandKind::AddPropertyFiles);
    assert_eq!(spec.params["propertyId"], "P-12");
    assert_eq!(
        spec.params["archivos"],
        json!(["foto-frente.jpg", "foto-patio.jpg"])
    );
}

#[tokio::test]
async fn test_add_property_full_flow() {
    let (engine, _) = engine();
    let user = agente();
    let replies = drive(
        &engine,
        &user,
        &[
            "2",
            "1",
            "Casa Equipetrol",
            "Casa de 3 plantas con piscina",
            "250.000",
            "Av. San Martín 456",
            "frente.jpg",
            "confirmar",
        ],
    )
    .await;

    let spec = replies.last().unwrap().execute.clone().expect("terminal");
    assert_eq!(spec.kind, CommandKind::CreateProperty);
    let data = &spec.params["propertyData"];
    assert_eq!(data["nombre"], "Casa Equipetrol");
    assert_eq!(data["precio"], 250_000);
    assert_eq!(data["archivos"], json!(["frente.jpg"]));
}

#[tokio::test]
async fn test_toggle_user_two_phase() {
    let (engine, _) = engine();
    let user = gerente();
    drive(&engine, &user, &["3", "2", "si"]).await;

    // Identifier step emits the display-only status read.
    let shown = engine.handle_inbound_text(&user, "U-3").await;
    let spec = shown.execute.expect("status read");
    assert_eq!(spec.kind, CommandKind::GetUser);
    assert_eq!(spec.params["userId"], "U-3");

    let done = engine.handle_inbound_text(&user, "activar").await;
    let spec = done.execute.expect("toggle command");
    assert_eq!(spec.kind, CommandKind::ActivateUser);
    assert_eq!(spec.params["userId"], "U-3");
}

#[tokio::test]
async fn test_broadcast_custom_list_validates_phones() {
    let (engine, _) = engine();
    let user = gerente();
    drive(&engine, &user, &["4", "1", "personalizado"]).await;

    let rejected = engine
        .handle_inbound_text(&user, "59171111111, 123")
        .await;
    assert!(rejected.execute.is_none(), "bad phone re-prompts");

    drive(
        &engine,
        &user,
        &["59171111111, 59172222222", "Nueva casa disponible en Equipetrol"],
    )
    .await;
    let done = engine.handle_inbound_text(&user, "confirmar").await;
    let spec = done.execute.expect("terminal command");
    assert_eq!(spec.kind, CommandKind::SendBroadcast);
    assert_eq!(spec.params["audience"], "personalizado");
    assert_eq!(
        spec.params["destinatarios"],
        json!(["59171111111", "59172222222"])
    );
}

#[tokio::test]
async fn test_broadcast_requires_confirmation() {
    let (engine, _) = engine();
    let user = gerente();
    drive(&engine, &user, &["4", "1", "equipo", "Reunión a las 9"]).await;

    let not_yet = engine.handle_inbound_text(&user, "dale").await;
    assert!(not_yet.execute.is_none());

    let done = engine.handle_inbound_text(&user, "confirmar").await;
    assert_eq!(
        done.execute.expect("terminal").kind,
        CommandKind::SendBroadcast
    );
}

#[tokio::test]
async fn test_agente_cannot_reach_gated_menus() {
    let (engine, _) = engine();
    let user = agente();
    let reply = engine.handle_inbound_text(&user, "3").await;
    assert!(reply.text.contains("No tienes permiso"));
    let snap = engine.sessions().snapshot(&user.id).await.unwrap();
    assert_eq!(snap.current_menu, MenuId::Main);
}

#[tokio::test]
async fn test_users_interleave_independently() {
    let (engine, _) = engine();
    let ana = agente();
    let marco = gerente();

    drive(&engine, &ana, &["1", "1", "Juan"]).await;
    drive(&engine, &marco, &["4", "1"]).await;

    let ana_snap = engine.sessions().snapshot(&ana.id).await.unwrap();
    let marco_snap = engine.sessions().snapshot(&marco.id).await.unwrap();
    assert_eq!(ana_snap.action.as_ref().unwrap().action, ActionId::AddClient);
    assert_eq!(
        marco_snap.action.as_ref().unwrap().action,
        ActionId::SendBroadcast
    );
}
