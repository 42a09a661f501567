//! Property command handlers.

use super::{param_str, param_typed};
use inmo_core::command::CommandResult;
use inmo_core::error::InmoError;
use inmo_core::model::{NewProperty, Property, PropertyChanges};
use inmo_core::traits::PropertyService;
use serde_json::{json, Map, Value};

pub(crate) async fn create(
    service: &dyn PropertyService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let data: NewProperty = param_typed(params, "propertyData")?;
    if data.nombre.trim().is_empty() {
        return Err(InmoError::Validation(
            "la propiedad necesita un nombre".to_string(),
        ));
    }
    let property = service.create(data).await?;
    Ok(CommandResult::ok_with_data(
        format!(
            "Propiedad {} registrada con ID {} ({} archivos).",
            property.nombre,
            property.id,
            property.archivos.len()
        ),
        json!(property),
    ))
}

pub(crate) async fn update(
    service: &dyn PropertyService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let id = param_str(params, "propertyId")?;
    let changes: PropertyChanges = param_typed(params, "changes")?;
    if changes.nombre.is_none()
        && changes.descripcion.is_none()
        && changes.precio.is_none()
        && changes.ubicacion.is_none()
    {
        return Err(InmoError::Validation("no hay cambios que aplicar".to_string()));
    }
    let property = service.update(id, changes).await?;
    Ok(CommandResult::ok_with_data(
        format!("Propiedad {} actualizada.", property.id),
        json!(property),
    ))
}

pub(crate) async fn add_files(
    service: &dyn PropertyService,
    params: &Map<String, Value>,
) -> Result<CommandResult, InmoError> {
    let id = param_str(params, "propertyId")?;
    let files: Vec<String> = param_typed(params, "archivos")?;
    if files.is_empty() {
        return Err(InmoError::Validation(
            "se necesita al menos un archivo".to_string(),
        ));
    }
    let property = service.add_files(id, &files).await?;
    Ok(CommandResult::ok_with_data(
        format!(
            "{} archivo(s) agregados a la propiedad {}. Total: {}.",
            files.len(),
            property.id,
            property.archivos.len()
        ),
        json!(property),
    ))
}

pub(crate) async fn list(service: &dyn PropertyService) -> Result<CommandResult, InmoError> {
    let properties = service.list().await?;
    if properties.is_empty() {
        return Ok(CommandResult::ok("No hay propiedades registradas."));
    }
    let mut lines = vec![format!("*Propiedades* ({})", properties.len())];
    for p in &properties {
        lines.push(render_line(p));
    }
    Ok(CommandResult::ok_with_data(
        lines.join("\n"),
        json!(properties),
    ))
}

fn render_line(p: &Property) -> String {
    format!("{} | {} | {} | {}", p.id, p.nombre, p.precio, p.ubicacion)
}
