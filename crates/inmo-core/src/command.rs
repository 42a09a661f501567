use crate::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Every business operation the back office can execute, directly or as the
/// terminal effect of a guided action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateClient,
    UpdateClient,
    ListClients,
    CreateProperty,
    UpdateProperty,
    ListProperties,
    AddPropertyFiles,
    CreateUser,
    GetUser,
    ListUsers,
    ActivateUser,
    DeactivateUser,
    SendBroadcast,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::CreateClient => "create_client",
            CommandKind::UpdateClient => "update_client",
            CommandKind::ListClients => "list_clients",
            CommandKind::CreateProperty => "create_property",
            CommandKind::UpdateProperty => "update_property",
            CommandKind::ListProperties => "list_properties",
            CommandKind::AddPropertyFiles => "add_property_files",
            CommandKind::CreateUser => "create_user",
            CommandKind::GetUser => "get_user",
            CommandKind::ListUsers => "list_users",
            CommandKind::ActivateUser => "activate_user",
            CommandKind::DeactivateUser => "deactivate_user",
            CommandKind::SendBroadcast => "send_broadcast",
        }
    }

    /// Parse a command type from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create_client" => Some(Self::CreateClient),
            "update_client" => Some(Self::UpdateClient),
            "list_clients" => Some(Self::ListClients),
            "create_property" => Some(Self::CreateProperty),
            "update_property" => Some(Self::UpdateProperty),
            "list_properties" => Some(Self::ListProperties),
            "add_property_files" => Some(Self::AddPropertyFiles),
            "create_user" => Some(Self::CreateUser),
            "get_user" => Some(Self::GetUser),
            "list_users" => Some(Self::ListUsers),
            "activate_user" => Some(Self::ActivateUser),
            "deactivate_user" => Some(Self::DeactivateUser),
            "send_broadcast" => Some(Self::SendBroadcast),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An executable command descriptor: what to run and with which parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    #[serde(rename = "type")]
    pub kind: CommandKind,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl CommandSpec {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// The staff member invoking a command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallingUser {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// A fully-formed request for the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: CommandSpec,
    pub user: CallingUser,
}

/// Normalized outcome of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
    /// Opaque template reference the caller may pass to a renderer.
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub template_data: Option<Value>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
            template_id: None,
            template_data: None,
        }
    }

    pub fn ok_with_data(message: impl Into<String>, data: Value) -> Self {
        Self {
            data: Some(data),
            ..Self::ok(message)
        }
    }

    pub fn with_template(mut self, template_id: impl Into<String>, template_data: Value) -> Self {
        self.template_id = Some(template_id.into());
        self.template_data = Some(template_data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_kind_roundtrip() {
        for kind in [
            CommandKind::CreateClient,
            CommandKind::UpdateProperty,
            CommandKind::SendBroadcast,
            CommandKind::DeactivateUser,
        ] {
            assert_eq!(CommandKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CommandKind::parse("drop_database"), None);
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new(CommandKind::CreateClient)
            .with_param("nombre", "Juan")
            .with_param("telefono", "59171234567");
        assert_eq!(spec.kind.as_str(), "create_client");
        assert_eq!(spec.params["nombre"], "Juan");
    }
}
