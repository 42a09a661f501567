//! Staff-account command handlers.
//!
//! The enable/disable pair is idempotent: asking for the state the account
//! is already in succeeds with an informational message instead of failing,
//! so a stale status display never turns into a user-visible error.

use super::{param_str, param_typed};
use inmo_core::command::CommandResult;
use inmo_core::error::InmoError;
use inmo_core::model::{NewStaffUser, ResourceStatus, StaffUser};
use inmo_core::traits::{StaffService, TransportConnector};
use serde_json::{json, Map, Value};
use tracing::warn;

pub(crate) async fn create(
    service: &dyn StaffService,
    transport: &dyn TransportConnector,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let data: NewStaffUser = param_typed(params, "userData")?;
    if data.nombre.trim().is_empty() || data.telefono.trim().is_empty() {
        return Err(InmoError::Validation(
            "el usuario necesita nombre y teléfono".to_string(),
        ));
    }
    let user = service.create(data).await?;

    // Welcome message is best effort; the account exists either way.
    let greeting = format!(
        "Hola {}, tu cuenta de {} fue creada. Escribe \"menu\" para empezar.",
        user.nombre, user.rol
    );
    if let Err(e) = transport.send_text(&user.telefono, &greeting).await {
        warn!("welcome message to {} failed: {e}", user.telefono);
    }

    Ok(CommandResult::ok_with_data(
        format!("Usuario {} registrado con ID {} ({}).", user.nombre, user.id, user.rol),
        json!(user),
    ))
}

pub(crate) async fn get(
    service: &dyn StaffService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let id = param_str(params, "userId")?;
    let user = service.get_any_status(id).await?;
    Ok(CommandResult::ok_with_data(render_line(&user), json!(user)))
}

pub(crate) async fn list(service: &dyn StaffService) -> Result<CommandResult, InmoError> {
    let users = service.list().await?;
    if users.is_empty() {
        return Ok(CommandResult::ok("No hay usuarios registrados."));
    }
    let mut lines = vec![format!("*Usuarios* ({})", users.len())];
    for u in &users {
        lines.push(render_line(u));
    }
    Ok(CommandResult::ok_with_data(lines.join("\n"), json!(users)))
}

pub(crate) async fn set_status(
    service: &dyn StaffService,
    params: &Map<String, Value>,
    target: ResourceStatus,
) -> Result<CommandResult, InmoError> {
    let id = param_str(params, "userId")?;
    let current = service.get_any_status(id).await?;
    if current.status == target {
        return Ok(CommandResult::ok(format!(
            "El usuario {} ya estaba {}.",
            current.id,
            target.as_str()
        )));
    }
    let user = service.set_status(id, target).await?;
    Ok(CommandResult::ok_with_data(
        format!("Usuario {} ahora está {}.", user.id, target.as_str()),
        json!(user),
    ))
}

fn render_line(u: &StaffUser) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        u.id,
        u.nombre,
        u.telefono,
        u.rol,
        u.status.as_str()
    )
}
