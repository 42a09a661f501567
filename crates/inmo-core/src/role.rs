use serde::{Deserialize, Serialize};

/// Authorization class of a staff member. Gates menu options and commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Branch manager: full access and managerial broadcast pacing.
    Gerente,
    /// Staff management minus account administration.
    Supervisor,
    /// Sales agent: client and property operations only.
    Agente,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Gerente => "gerente",
            Role::Supervisor => "supervisor",
            Role::Agente => "agente",
        }
    }

    /// Parse a role from user or API input. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gerente" => Some(Role::Gerente),
            "supervisor" => Some(Role::Supervisor),
            "agente" => Some(Role::Agente),
            _ => None,
        }
    }

    /// Managerial roles get the slower broadcast pacing profile.
    pub fn is_managerial(&self) -> bool {
        matches!(self, Role::Gerente)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roles() {
        assert_eq!(Role::parse("gerente"), Some(Role::Gerente));
        assert_eq!(Role::parse("GERENTE"), Some(Role::Gerente));
        assert_eq!(Role::parse(" agente "), Some(Role::Agente));
        assert_eq!(Role::parse("cliente"), None);
    }

    #[test]
    fn test_managerial() {
        assert!(Role::Gerente.is_managerial());
        assert!(!Role::Supervisor.is_managerial());
        assert!(!Role::Agente.is_managerial());
    }
}
