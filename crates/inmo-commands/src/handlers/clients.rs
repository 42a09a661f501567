//! Client command handlers.

use super::{param_str, param_typed};
use inmo_core::command::CommandResult;
use inmo_core::error::InmoError;
use inmo_core::model::{Client, ClientChanges, NewClient};
use inmo_core::traits::ClientService;
use serde_json::{json, Map, Value};

pub(crate) async fn create(
    service: &dyn ClientService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let data: NewClient = param_typed(params, "clientData")?;
    if data.nombre.trim().is_empty() || data.telefono.trim().is_empty() {
        return Err(InmoError::Validation(
            "el cliente necesita nombre y teléfono".to_string(),
        ));
    }
    let client = service.create(data).await?;
    Ok(CommandResult::ok_with_data(
        format!(
            "Cliente {} {} registrado con ID {}.",
            client.nombre, client.apellido, client.id
        ),
        json!(client),
    )
    .with_template(
        "cliente_registrado",
        json!({ "nombre": client.nombre, "apellido": client.apellido, "id": client.id }),
    ))
}

pub(crate) async fn update(
    service: &dyn ClientService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let id = param_str(params, "clientId")?;
    let changes: ClientChanges = param_typed(params, "changes")?;
    if changes.nombre.is_none()
        && changes.apellido.is_none()
        && changes.telefono.is_none()
        && changes.email.is_none()
    {
        return Err(InmoError::Validation("no hay cambios que aplicar".to_string()));
    }
    let client = service.update(id, changes).await?;
    Ok(CommandResult::ok_with_data(
        format!("Cliente {} actualizado.", client.id),
        json!(client),
    ))
}

pub(crate) async fn list(service: &dyn ClientService) -> Result<CommandResult, InmoError> {
    let clients = service.list().await?;
    if clients.is_empty() {
        return Ok(CommandResult::ok("No hay clientes registrados."));
    }
    let mut lines = vec![format!("*Clientes* ({})", clients.len())];
    for c in &clients {
        lines.push(render_line(c));
    }
    Ok(CommandResult::ok_with_data(lines.join("\n"), json!(clients)))
}

fn render_line(c: &Client) -> String {
    format!("{} | {} {} | {}", c.id, c.nombre, c.apellido, c.telefono)
}
