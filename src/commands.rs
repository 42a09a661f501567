//! Free-form "/comando" parsing, the direct path beside the menus.
//!
//! Every slash form maps onto the same command specs the guided flows emit,
//! so the dispatcher treats both entry points identically.

use inmo_core::command::{CommandKind, CommandSpec};
use serde_json::json;

/// Outcome of parsing one inbound line as a slash command.
#[derive(Debug)]
pub enum SlashCommand {
    /// "/ayuda", answered locally from the registry.
    Ayuda,
    /// A well-formed command, ready for dispatch.
    Run(CommandSpec),
    /// A known verb with unusable arguments; carries the usage reply.
    Invalid(String),
    /// A verb no catalog entry answers to; counted as a failed attempt.
    Unknown(String),
}

/// Parse an inbound line. `None` means it is not a slash command at all and
/// belongs to the menu engine.
pub fn parse(text: &str) -> Option<SlashCommand> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let verb = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    let parsed = match verb.as_str() {
        "ayuda" => return Some(SlashCommand::Ayuda),
        "clientes" => Ok(CommandSpec::new(CommandKind::ListClients)),
        "propiedades" => Ok(CommandSpec::new(CommandKind::ListProperties)),
        "usuarios" => Ok(CommandSpec::new(CommandKind::ListUsers)),
        "usuario" => one_id(&args, CommandKind::GetUser, "userId", "/usuario <id>"),
        "activar_usuario" => one_id(
            &args,
            CommandKind::ActivateUser,
            "userId",
            "/activar_usuario <id>",
        ),
        "desactivar_usuario" => one_id(
            &args,
            CommandKind::DeactivateUser,
            "userId",
            "/desactivar_usuario <id>",
        ),
        "crear_cliente" => crear_cliente(&args),
        "modificar_cliente" => cambios(&args, CommandKind::UpdateClient, "clientId"),
        "crear_propiedad" => crear_propiedad(&args),
        "modificar_propiedad" => cambios(&args, CommandKind::UpdateProperty, "propertyId"),
        "archivos_propiedad" => archivos_propiedad(&args),
        "crear_usuario" => crear_usuario(&args),
        "difusion" => difusion(&args),
        _ => {
            return Some(SlashCommand::Unknown(format!(
                "Comando no reconocido: /{verb}. Escribe /ayuda para ver los disponibles."
            )))
        }
    };

    Some(match parsed {
        Ok(spec) => SlashCommand::Run(spec),
        Err(msg) => SlashCommand::Invalid(msg),
    })
}

fn one_id(
    args: &[&str],
    kind: CommandKind,
    key: &str,
    usage: &str,
) -> Result<CommandSpec, String> {
    match args {
        [id] => Ok(CommandSpec::new(kind).with_param(key, *id)),
        _ => Err(format!("Uso: {usage}")),
    }
}

fn crear_cliente(args: &[&str]) -> Result<CommandSpec, String> {
    match args {
        [nombre, apellido, telefono] | [nombre, apellido, telefono, _] => {
            let email = args.get(3).copied().unwrap_or("");
            Ok(CommandSpec::new(CommandKind::CreateClient).with_param(
                "clientData",
                json!({
                    "nombre": nombre,
                    "apellido": apellido,
                    "telefono": telefono,
                    "email": email,
                }),
            ))
        }
        _ => Err("Uso: /crear_cliente <nombre> <apellido> <telefono> [email]".to_string()),
    }
}

fn crear_propiedad(args: &[&str]) -> Result<CommandSpec, String> {
    let usage = "Uso: /crear_propiedad <nombre> <precio> <ubicacion>";
    let [nombre, precio, ubicacion @ ..] = args else {
        return Err(usage.to_string());
    };
    if ubicacion.is_empty() {
        return Err(usage.to_string());
    }
    let precio: u64 = precio
        .parse()
        .map_err(|_| "El precio debe ser un número entero.".to_string())?;
    Ok(CommandSpec::new(CommandKind::CreateProperty).with_param(
        "propertyData",
        json!({
            "nombre": nombre,
            "descripcion": "",
            "precio": precio,
            "ubicacion": ubicacion.join(" "),
            "archivos": [],
        }),
    ))
}

/// `<id> campo=valor...` update form shared by clients and properties.
fn cambios(args: &[&str], kind: CommandKind, id_key: &str) -> Result<CommandSpec, String> {
    let [id, pairs @ ..] = args else {
        return Err(format!("Uso: /{} <id> <campo>=<valor>", wire_verb(kind)));
    };
    if pairs.is_empty() {
        return Err(format!("Uso: /{} <id> <campo>=<valor>", wire_verb(kind)));
    }
    let mut changes = serde_json::Map::new();
    for pair in pairs {
        let Some((campo, valor)) = pair.split_once('=') else {
            return Err(format!("Cambio inválido: '{pair}'. Usa campo=valor."));
        };
        if campo == "precio" {
            let precio: u64 = valor
                .parse()
                .map_err(|_| "El precio debe ser un número entero.".to_string())?;
            changes.insert(campo.to_string(), json!(precio));
        } else {
            changes.insert(campo.to_string(), json!(valor));
        }
    }
    Ok(CommandSpec::new(kind)
        .with_param(id_key, *id)
        .with_param("changes", serde_json::Value::Object(changes)))
}

fn wire_verb(kind: CommandKind) -> &'static str {
    match kind {
        CommandKind::UpdateClient => "modificar_cliente",
        CommandKind::UpdateProperty => "modificar_propiedad",
        _ => "modificar",
    }
}

fn archivos_propiedad(args: &[&str]) -> Result<CommandSpec, String> {
    let [id, files @ ..] = args else {
        return Err("Uso: /archivos_propiedad <id> <archivo>...".to_string());
    };
    if files.is_empty() {
        return Err("Uso: /archivos_propiedad <id> <archivo>...".to_string());
    }
    Ok(CommandSpec::new(CommandKind::AddPropertyFiles)
        .with_param("propertyId", *id)
        .with_param("archivos", json!(files)))
}

fn crear_usuario(args: &[&str]) -> Result<CommandSpec, String> {
    match args {
        [nombre, telefono, rol] => Ok(CommandSpec::new(CommandKind::CreateUser).with_param(
            "userData",
            json!({ "nombre": nombre, "telefono": telefono, "rol": rol.to_lowercase() }),
        )),
        _ => Err("Uso: /crear_usuario <nombre> <telefono> <rol>".to_string()),
    }
}

fn difusion(args: &[&str]) -> Result<CommandSpec, String> {
    let [audience, mensaje @ ..] = args else {
        return Err("Uso: /difusion <audiencia> <mensaje>".to_string());
    };
    if mensaje.is_empty() {
        return Err("Uso: /difusion <audiencia> <mensaje>".to_string());
    }
    Ok(CommandSpec::new(CommandKind::SendBroadcast)
        .with_param("audience", audience.to_lowercase())
        .with_param("mensaje", mensaje.join(" ")))
}
