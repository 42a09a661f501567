//! Static command catalog: display name, free-form usage hint, required
//! parameters, and the roles allowed to run each command.

use inmo_core::command::CommandKind;
use inmo_core::role::Role;

/// Catalog entry for one command type.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub kind: CommandKind,
    /// Human name shown in help and status output.
    pub name: &'static str,
    /// Usage line for the free-form "/comando" form.
    pub usage: &'static str,
    /// Top-level params that must be present before dispatch.
    pub required_params: &'static [&'static str],
    /// Roles allowed to run this; `None` means everyone.
    pub roles: Option<&'static [Role]>,
}

impl CommandInfo {
    pub fn allows(&self, role: Role) -> bool {
        match self.roles {
            None => true,
            Some(roles) => roles.contains(&role),
        }
    }
}

const GERENCIA: &[Role] = &[Role::Gerente, Role::Supervisor];
const SOLO_GERENTE: &[Role] = &[Role::Gerente];

const CATALOG: &[CommandInfo] = &[
    CommandInfo {
        kind: CommandKind::CreateClient,
        name: "Registrar cliente",
        usage: "/crear_cliente <nombre> <apellido> <telefono> [email]",
        required_params: &["clientData"],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::UpdateClient,
        name: "Modificar cliente",
        usage: "/modificar_cliente <id> <campo>=<valor>",
        required_params: &["clientId", "changes"],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::ListClients,
        name: "Ver clientes",
        usage: "/clientes",
        required_params: &[],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::CreateProperty,
        name: "Registrar propiedad",
        usage: "/crear_propiedad <nombre> <precio> <ubicacion>",
        required_params: &["propertyData"],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::UpdateProperty,
        name: "Modificar propiedad",
        usage: "/modificar_propiedad <id> <campo>=<valor>",
        required_params: &["propertyId", "changes"],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::ListProperties,
        name: "Ver propiedades",
        usage: "/propiedades",
        required_params: &[],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::AddPropertyFiles,
        name: "Agregar archivos a propiedad",
        usage: "/archivos_propiedad <id> <archivo>...",
        required_params: &["propertyId", "archivos"],
        roles: None,
    },
    CommandInfo {
        kind: CommandKind::CreateUser,
        name: "Registrar usuario",
        usage: "/crear_usuario <nombre> <telefono> <rol>",
        required_params: &["userData"],
        roles: Some(SOLO_GERENTE),
    },
    CommandInfo {
        kind: CommandKind::GetUser,
        name: "Ver usuario",
        usage: "/usuario <id>",
        required_params: &["userId"],
        roles: Some(GERENCIA),
    },
    CommandInfo {
        kind: CommandKind::ListUsers,
        name: "Ver usuarios",
        usage: "/usuarios",
        required_params: &[],
        roles: Some(GERENCIA),
    },
    CommandInfo {
        kind: CommandKind::ActivateUser,
        name: "Activar usuario",
        usage: "/activar_usuario <id>",
        required_params: &["userId"],
        roles: Some(SOLO_GERENTE),
    },
    CommandInfo {
        kind: CommandKind::DeactivateUser,
        name: "Desactivar usuario",
        usage: "/desactivar_usuario <id>",
        required_params: &["userId"],
        roles: Some(SOLO_GERENTE),
    },
    CommandInfo {
        kind: CommandKind::SendBroadcast,
        name: "Enviar difusión",
        usage: "/difusion <audiencia> <mensaje>",
        required_params: &["audience", "mensaje"],
        roles: Some(GERENCIA),
    },
];

/// Look up the catalog entry for a command type. `None` means the catalog
/// does not know the command, which the dispatcher reports as malformed.
pub fn info(kind: CommandKind) -> Option<&'static CommandInfo> {
    CATALOG.iter().find(|c| c.kind == kind)
}

/// The full catalog, in display order.
pub fn catalog() -> &'static [CommandInfo] {
    CATALOG
}

/// Usage lines for the commands a role may run.
pub fn help_for(role: Role) -> String {
    let mut out = String::from("*Comandos disponibles*\n");
    for entry in CATALOG.iter().filter(|c| c.allows(role)) {
        out.push('\n');
        out.push_str(entry.usage);
        out.push_str(" — ");
        out.push_str(entry.name);
    }
    out
}
